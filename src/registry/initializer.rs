//! Initialization registry.
//!
//! # Responsibilities
//! - Register named initializers with declared dependencies
//! - Coalesce concurrent `initialize(name)` calls onto one execution
//! - Retry failed initializers with exponential backoff
//! - Reject re-entrant initialization instead of deadlocking
//!
//! # Design Decisions
//! - Each in-flight initialization is a `Shared` future stored in the entry
//!   and dropped once it settles; `Initialized` short-circuits later calls
//! - Re-entrancy is tracked per task with a task-local chain of names
//! - Entries live in a `DashMap`; no shard lock is held across an await

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{try_join_all, BoxFuture, FutureExt, Shared};

use crate::config::InitializationConfig;
use crate::observability::metrics;
use crate::registry::component::{init_fn, ComponentDescriptor, ComponentStatus, InitFn};
use crate::registry::error::InitError;
use crate::registry::graph::{reachable, topological_order, GraphError};
use crate::resilience::BackoffPolicy;
use crate::BoxError;

type SharedInit = Shared<BoxFuture<'static, Result<(), InitError>>>;

tokio::task_local! {
    /// Components being initialized by the current task, outermost first.
    static INIT_CHAIN: Vec<String>;
}

fn current_chain() -> Vec<String> {
    INIT_CHAIN.try_with(Clone::clone).unwrap_or_default()
}

struct RegistryEntry<C> {
    descriptor: ComponentDescriptor<C>,
    seq: usize,
    status: ComponentStatus,
    attempt: u32,
    memo: Option<SharedInit>,
}

/// Registry of named async initializers.
///
/// Cloning is cheap and shares state.
pub struct InitializationRegistry<C> {
    entries: Arc<DashMap<String, RegistryEntry<C>>>,
    next_seq: Arc<AtomicUsize>,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl<C> Clone for InitializationRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            next_seq: self.next_seq.clone(),
            max_attempts: self.max_attempts,
            backoff: self.backoff,
        }
    }
}

impl<C: Send + Sync + 'static> Default for InitializationRegistry<C> {
    fn default() -> Self {
        Self::new(&InitializationConfig::default())
    }
}

impl<C: Send + Sync + 'static> InitializationRegistry<C> {
    pub fn new(config: &InitializationConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicUsize::new(0)),
            max_attempts: config.max_attempts.max(1),
            backoff: BackoffPolicy::from(config),
        }
    }

    /// Register an initializer. A duplicate name is ignored with a warning
    /// and returns false.
    ///
    /// `dependencies` are recorded, not initialized; callers sequence them.
    pub fn register<F, Fut>(&self, name: impl Into<String>, init: F, dependencies: &[&str]) -> bool
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.register_descriptor(ComponentDescriptor {
            name: name.into(),
            init: init_fn(init),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        })
    }

    /// Register a prepared descriptor.
    pub fn register_descriptor(&self, descriptor: ComponentDescriptor<C>) -> bool {
        match self.entries.entry(descriptor.name.clone()) {
            Entry::Occupied(_) => {
                tracing::warn!(component = %descriptor.name, "Component already registered, ignoring");
                false
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    component = %descriptor.name,
                    dependencies = ?descriptor.dependencies,
                    "Component registered"
                );
                slot.insert(RegistryEntry {
                    descriptor,
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    status: ComponentStatus::Registered,
                    attempt: 0,
                    memo: None,
                });
                true
            }
        }
    }

    /// Initialize `name`, sharing any initialization already in flight.
    pub async fn initialize(&self, name: &str, ctx: Arc<C>) -> Result<(), InitError> {
        let chain = current_chain();

        let shared = {
            let Some(mut entry) = self.entries.get_mut(name) else {
                tracing::error!(component = %name, "Initialize called for unregistered component");
                return Err(InitError::NotRegistered(name.to_string()));
            };

            if entry.status == ComponentStatus::Initialized {
                return Ok(());
            }

            if chain.iter().any(|n| n == name) {
                let mut cycle = chain;
                cycle.push(name.to_string());
                tracing::error!(chain = ?cycle, "Re-entrant initialization detected");
                return Err(InitError::CircularDependency { chain: cycle });
            }

            if let Some(memo) = entry.memo.clone() {
                tracing::debug!(component = %name, "Joining in-flight initialization");
                memo
            } else {
                entry.status = ComponentStatus::InProgress;
                entry.attempt = 0;

                let mut nested = chain;
                nested.push(name.to_string());
                let run = self
                    .clone()
                    .run_with_retry(name.to_string(), entry.descriptor.init.clone(), ctx);
                let shared = INIT_CHAIN.scope(nested, run).boxed().shared();
                entry.memo = Some(shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Initialize every registered component concurrently and return the
    /// first error. Initializations still in flight at that point stay
    /// memoized and resume when next awaited.
    pub async fn initialize_all(&self, ctx: Arc<C>) -> Result<(), InitError> {
        let names = self.names();
        try_join_all(names.iter().map(|name| self.initialize(name, ctx.clone()))).await?;
        Ok(())
    }

    async fn run_with_retry(self, name: String, init: InitFn<C>, ctx: Arc<C>) -> Result<(), InitError> {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.update(&name, |entry| entry.attempt = attempt);
            tracing::debug!(component = %name, attempt, "Running initializer");

            match init(ctx.clone()).await {
                Ok(()) => {
                    metrics::record_init_attempt(&name, true);
                    metrics::record_init_duration(&name, start);
                    self.update(&name, |entry| {
                        entry.status = ComponentStatus::Initialized;
                        entry.memo = None;
                    });
                    tracing::info!(
                        component = %name,
                        attempts = attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Component initialized"
                    );
                    return Ok(());
                }
                Err(e) => {
                    metrics::record_init_attempt(&name, false);
                    let fatal = InitError::is_cycle(e.as_ref());

                    if attempt < self.max_attempts && !fatal {
                        let delay = self.backoff.delay(attempt);
                        tracing::warn!(
                            component = %name,
                            attempt,
                            delay = ?delay,
                            error = %e,
                            "Initializer failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    metrics::record_init_duration(&name, start);
                    self.update(&name, |entry| {
                        entry.status = ComponentStatus::Registered;
                        entry.memo = None;
                    });
                    tracing::error!(component = %name, attempts = attempt, error = %e, "Component failed to initialize");
                    return Err(InitError::Failed {
                        name,
                        attempts: attempt,
                        source: Arc::from(e),
                    });
                }
            }
        }
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut RegistryEntry<C>)) {
        if let Some(mut entry) = self.entries.get_mut(name) {
            f(&mut entry);
        }
    }

    pub fn status(&self, name: &str) -> Option<ComponentStatus> {
        self.entries.get(name).map(|e| e.status)
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.status(name) == Some(ComponentStatus::Initialized)
    }

    /// Attempts made by the latest call chain for `name`.
    pub fn attempts(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|e| e.attempt)
    }

    pub fn dependencies(&self, name: &str) -> Option<Vec<String>> {
        self.entries.get(name).map(|e| e.descriptor.dependencies.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.dependency_graph().into_iter().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, declared dependencies)` in registration order.
    pub fn dependency_graph(&self) -> Vec<(String, Vec<String>)> {
        let mut nodes: Vec<(usize, String, Vec<String>)> = self
            .entries
            .iter()
            .map(|e| (e.seq, e.key().clone(), e.descriptor.dependencies.clone()))
            .collect();
        nodes.sort_by_key(|(seq, _, _)| *seq);
        nodes.into_iter().map(|(_, name, deps)| (name, deps)).collect()
    }

    /// Check the declared dependencies for cycles and unknown names.
    pub fn check_dependency_graph(&self) -> Result<(), GraphError> {
        self.dependency_order().map(|_| ())
    }

    /// Check only `roots` and what they transitively depend on. Components
    /// outside that closure are not looked at.
    pub fn check_dependencies_of(&self, roots: &[String]) -> Result<(), GraphError> {
        topological_order(&reachable(&self.dependency_graph(), roots)).map(|_| ())
    }

    /// A valid initialization order for the declared dependencies.
    pub fn dependency_order(&self) -> Result<Vec<String>, GraphError> {
        topological_order(&self.dependency_graph())
    }
}
