//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0)
//! - Validate path shapes (base path, fallback path)
//! - Detect duplicate bootstrap entries
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: KernelConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::KernelConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("navigation.base_path '{0}' must start with '/'")]
    BasePathNotAbsolute(String),

    #[error("navigation.base_path '{0}' must not end with '/'")]
    BasePathTrailingSlash(String),

    #[error("navigation.fallback_path '{0}' must start with '/'")]
    FallbackNotAbsolute(String),

    #[error("navigation.safety_timeout_ms must be greater than zero")]
    ZeroSafetyTimeout,

    #[error("initialization.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("initialization.max_delay_ms ({max}) is below base_delay_ms ({base})")]
    DelayBounds { base: u64, max: u64 },

    #[error("bootstrap.order lists '{0}' more than once")]
    DuplicateBootstrapEntry(String),

    #[error("bootstrap.order contains an empty component name")]
    EmptyBootstrapEntry,
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &KernelConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base) = &config.navigation.base_path {
        // An empty base path means "no prefix" and is allowed.
        if !base.is_empty() {
            if !base.starts_with('/') {
                errors.push(ValidationError::BasePathNotAbsolute(base.clone()));
            } else if base.len() > 1 && base.ends_with('/') {
                errors.push(ValidationError::BasePathTrailingSlash(base.clone()));
            }
        }
    }

    if !config.navigation.fallback_path.starts_with('/') {
        errors.push(ValidationError::FallbackNotAbsolute(
            config.navigation.fallback_path.clone(),
        ));
    }

    if config.navigation.safety_timeout_ms == 0 {
        errors.push(ValidationError::ZeroSafetyTimeout);
    }

    let init = &config.initialization;
    if init.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if init.max_delay_ms < init.base_delay_ms {
        errors.push(ValidationError::DelayBounds {
            base: init.base_delay_ms,
            max: init.max_delay_ms,
        });
    }

    let mut seen = HashSet::new();
    for name in &config.bootstrap.order {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyBootstrapEntry);
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateBootstrapEntry(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
