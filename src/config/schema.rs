//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the kernel.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the navigation kernel.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    /// Navigation session settings (base path, routing mode, timeouts).
    pub navigation: NavigationConfig,

    /// Initializer retry policy.
    pub initialization: InitializationConfig,

    /// Bootstrap order.
    pub bootstrap: BootstrapConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How internal paths are reflected in the display location.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Internal path lives in the pathname, under the base path.
    #[default]
    History,
    /// Internal path lives in the `#` fragment.
    Hash,
}

/// Navigation session configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Base path prefix (e.g., "/my-app"). Detected from the location's
    /// document base when unset.
    pub base_path: Option<String>,

    /// Routing mode.
    pub mode: RoutingMode,

    /// Upper bound on a single navigation in milliseconds.
    pub safety_timeout_ms: u64,

    /// Known-good path offered by failure overlays.
    pub fallback_path: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            mode: RoutingMode::History,
            safety_timeout_ms: 5_000,
            fallback_path: "/".to_string(),
        }
    }
}

/// Initializer retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InitializationConfig {
    /// Maximum attempts per initialize call chain.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for InitializationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            jitter: false,
        }
    }
}

/// Bootstrap configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Components to initialize, in order. Foundational components first.
    pub order: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.navigation.base_path, None);
        assert_eq!(config.navigation.mode, RoutingMode::History);
        assert_eq!(config.navigation.safety_timeout_ms, 5_000);
        assert_eq!(config.initialization.max_attempts, 3);
        assert_eq!(config.initialization.base_delay_ms, 100);
        assert!(config.bootstrap.order.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: KernelConfig = toml::from_str(
            r#"
            [navigation]
            base_path = "/docs"
            mode = "hash"

            [bootstrap]
            order = ["storage", "router"]
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.base_path.as_deref(), Some("/docs"));
        assert_eq!(config.navigation.mode, RoutingMode::Hash);
        assert_eq!(config.navigation.fallback_path, "/");
        assert_eq!(config.initialization, InitializationConfig::default());
        assert_eq!(config.bootstrap.order, vec!["storage", "router"]);
    }
}
