//! Initialization errors.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by `InitializationRegistry::initialize`.
///
/// Cloneable so that every caller sharing one in-flight initialization
/// receives the same error.
#[derive(Debug, Clone, Error)]
pub enum InitError {
    /// No component registered under this name.
    #[error("Component '{0}' is not registered")]
    NotRegistered(String),

    /// `initialize` re-entered a component already being initialized by the
    /// same task.
    #[error("Circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// The initializer failed on every attempt.
    #[error("Component '{name}' failed after {attempts} attempt(s): {source}")]
    Failed {
        name: String,
        attempts: u32,
        source: Arc<dyn StdError + Send + Sync>,
    },
}

impl InitError {
    /// Name of the component this error is about.
    pub fn component(&self) -> &str {
        match self {
            InitError::NotRegistered(name) | InitError::Failed { name, .. } => name,
            InitError::CircularDependency { chain } => chain.last().map(String::as_str).unwrap_or(""),
        }
    }

    /// Re-entrancy can never resolve by retrying, including when it
    /// surfaces through a nested component's failure.
    pub(crate) fn is_cycle(err: &(dyn StdError + Send + Sync + 'static)) -> bool {
        match err.downcast_ref::<InitError>() {
            Some(InitError::CircularDependency { .. }) => true,
            Some(InitError::Failed { source, .. }) => Self::is_cycle(source.as_ref()),
            _ => false,
        }
    }
}
