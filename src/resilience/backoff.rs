//! Exponential backoff with optional jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::InitializationConfig;

/// Delay schedule between initializer attempts.
///
/// The delay after the n-th failed attempt is `base_ms * 2^n`, capped at
/// `max_ms`. With the defaults (base 100ms) the first retry waits 200ms and
/// the second 400ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_ms: u64,
    pub max_ms: u64,
    pub jitter: bool,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            jitter: false,
        }
    }

    /// Enable 0-10% additive jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after `failed_attempts` consecutive failures.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        if failed_attempts == 0 {
            return Duration::from_millis(0);
        }

        let exponential = 2u64.saturating_pow(failed_attempts);
        let delay_ms = self.base_ms.saturating_mul(exponential);
        let capped_delay = delay_ms.min(self.max_ms);

        let jitter_range = capped_delay / 10;
        let jitter = if self.jitter && jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped_delay + jitter)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(100, 5_000)
    }
}

impl From<&InitializationConfig> for BackoffPolicy {
    fn from(config: &InitializationConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms).with_jitter(config.jitter)
    }
}
