//! Route table and lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the first route matching a path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - First match wins; there is no specificity ranking
//! - O(routes × segments) scan (route counts are in the tens)
//! - Re-registering an identical pattern replaces the handler in place
//! - Explicit None rather than silent default; callers own 404 handling

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use crate::routing::handler::{HandlerResult, RouteContext, RouteHandler};
use crate::routing::matcher::{RouteError, RoutePattern};
use crate::routing::params::RouteParams;

struct RouteEntry {
    pattern: RoutePattern,
    handler: Arc<dyn RouteHandler>,
}

/// Result of a successful lookup.
#[derive(Clone)]
pub struct RouteMatch {
    pub pattern: String,
    pub params: RouteParams,
    pub handler: Arc<dyn RouteHandler>,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Ordered set of routes.
#[derive(Default)]
pub struct RouteTable {
    entries: RwLock<Vec<RouteEntry>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async function or closure for `pattern`.
    pub fn register<F, Fut>(&self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(RouteContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_handler(pattern, Arc::new(handler))
    }

    /// Register a handler for `pattern`.
    pub fn register_handler(
        &self,
        pattern: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<(), RouteError> {
        let compiled = RoutePattern::parse(pattern)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.iter_mut().find(|e| e.pattern == compiled) {
            tracing::debug!(pattern = %pattern, "Replacing handler for existing route");
            existing.handler = handler;
        } else {
            if entries.iter().any(|e| e.pattern.is_wildcard()) {
                tracing::warn!(
                    pattern = %pattern,
                    "Route registered after a wildcard; it may be unreachable"
                );
            }
            tracing::debug!(pattern = %pattern, position = entries.len(), "Route registered");
            entries.push(RouteEntry {
                pattern: compiled,
                handler,
            });
        }
        Ok(())
    }

    /// Find the first route whose pattern matches `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().find_map(|entry| {
            entry.pattern.matches(path).map(|params| RouteMatch {
                pattern: entry.pattern.as_str().to_string(),
                params,
                handler: entry.handler.clone(),
            })
        })
    }

    /// Registered patterns, in order.
    pub fn patterns(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().map(|e| e.pattern.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("patterns", &self.patterns())
            .finish()
    }
}
