//! Bootstrap sequencing.
//!
//! # Responsibilities
//! - Initialize components in the configured order, one at a time
//! - Validate that order against the declared dependency graph first
//! - Run at most once per process (successful runs are not repeated)
//!
//! # Design Decisions
//! - Fail fast: any initialization error is fatal to startup
//! - The order is hand-written configuration; the registry never reorders
//! - A failed bootstrap clears the guard so the host may retry

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::registry::{GraphError, InitError, InitializationRegistry};

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Bootstrap failed: {0}")]
    Init(#[from] InitError),

    #[error("Invalid dependency graph: {0}")]
    Graph(#[from] GraphError),

    #[error("Bootstrap order runs '{component}' before its dependency '{dependency}'")]
    OrderViolation { component: String, dependency: String },

    #[error("Bootstrap order runs '{component}' but never initializes its dependency '{dependency}'")]
    MissingDependency { component: String, dependency: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Every component in the order initialized.
    Completed,
    /// A bootstrap already ran or is running; nothing was done.
    AlreadyBootstrapped,
}

/// Ordered startup sequence.
#[derive(Debug)]
pub struct Bootstrap {
    order: Vec<String>,
    started: AtomicBool,
    completed: AtomicBool,
}

impl Bootstrap {
    pub fn new(order: Vec<String>) -> Self {
        Self {
            order,
            started: AtomicBool::new(false),
            completed: AtomicBool::new(false),
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Run the sequence.
    pub async fn run<C>(
        &self,
        registry: &InitializationRegistry<C>,
        ctx: Arc<C>,
    ) -> Result<BootstrapOutcome, BootstrapError>
    where
        C: Send + Sync + 'static,
    {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Bootstrap already ran, skipping");
            return Ok(BootstrapOutcome::AlreadyBootstrapped);
        }

        let result = self.run_sequence(registry, ctx).await;
        match &result {
            Ok(()) => self.completed.store(true, Ordering::Release),
            Err(e) => {
                tracing::error!(error = %e, "Bootstrap failed");
                self.started.store(false, Ordering::Release);
            }
        }
        result.map(|()| BootstrapOutcome::Completed)
    }

    async fn run_sequence<C>(
        &self,
        registry: &InitializationRegistry<C>,
        ctx: Arc<C>,
    ) -> Result<(), BootstrapError>
    where
        C: Send + Sync + 'static,
    {
        tracing::info!(order = ?self.order, "Bootstrap starting");
        self.validate(registry)?;

        let total = self.order.len();
        for (i, name) in self.order.iter().enumerate() {
            tracing::info!(component = %name, step = i + 1, total, "Initializing component");
            registry.initialize(name, ctx.clone()).await?;
        }

        tracing::info!(components = total, "Bootstrap complete");
        Ok(())
    }

    /// Check the order against declared dependencies.
    ///
    /// Only the listed components and what they transitively depend on are
    /// checked. A registered component the order never runs may declare
    /// anything.
    pub fn validate<C>(&self, registry: &InitializationRegistry<C>) -> Result<(), BootstrapError>
    where
        C: Send + Sync + 'static,
    {
        registry.check_dependencies_of(&self.order)?;

        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        for (i, name) in self.order.iter().enumerate() {
            // Unregistered names surface as NotRegistered when run.
            let Some(dependencies) = registry.dependencies(name) else {
                continue;
            };
            for dependency in dependencies {
                match position.get(dependency.as_str()) {
                    Some(&j) if j < i => {}
                    Some(_) => {
                        return Err(BootstrapError::OrderViolation {
                            component: name.clone(),
                            dependency,
                        })
                    }
                    None if registry.is_initialized(&dependency) => {}
                    None => {
                        return Err(BootstrapError::MissingDependency {
                            component: name.clone(),
                            dependency,
                        })
                    }
                }
            }
        }
        Ok(())
    }
}
