//! Kernel composition root.
//!
//! Everything the application shares (config, navigation session, component
//! registry) is owned by one [`Kernel`] value and handed to initializers as
//! an explicit [`KernelContext`]. There is no process-wide singleton; tests
//! build as many kernels as they like.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::config::KernelConfig;
use crate::lifecycle::bootstrap::{Bootstrap, BootstrapError, BootstrapOutcome};
use crate::lifecycle::shutdown::Shutdown;
use crate::navigation::{Location, NavigationOutcome, NavigationSession, Overlay};
use crate::registry::InitializationRegistry;
use crate::routing::RouteTable;

/// Shared state passed to every component initializer.
#[derive(Clone)]
pub struct KernelContext {
    pub config: Arc<KernelConfig>,
    pub session: Arc<NavigationSession>,
}

impl KernelContext {
    pub fn routes(&self) -> &Arc<RouteTable> {
        self.session.routes()
    }
}

pub struct Kernel {
    context: Arc<KernelContext>,
    registry: InitializationRegistry<KernelContext>,
    bootstrap: Bootstrap,
    shutdown: Shutdown,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Kernel {
    pub fn new(config: KernelConfig, location: Arc<dyn Location>, overlay: Arc<dyn Overlay>) -> Self {
        let session = Arc::new(NavigationSession::new(
            config.navigation.clone(),
            Arc::new(RouteTable::new()),
            location,
            overlay,
        ));
        let registry = InitializationRegistry::new(&config.initialization);
        let bootstrap = Bootstrap::new(config.bootstrap.order.clone());

        Self {
            context: Arc::new(KernelContext {
                config: Arc::new(config),
                session,
            }),
            registry,
            bootstrap,
            shutdown: Shutdown::new(),
            listener: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.context.config
    }

    pub fn context(&self) -> Arc<KernelContext> {
        Arc::clone(&self.context)
    }

    pub fn session(&self) -> &Arc<NavigationSession> {
        &self.context.session
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        self.context.routes()
    }

    pub fn registry(&self) -> &InitializationRegistry<KernelContext> {
        &self.registry
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// Bootstrap the registered components, route the initial location and
    /// start following location changes.
    ///
    /// Returns the initial navigation outcome, or `None` when the kernel was
    /// already started or has been shut down.
    pub async fn start(&self) -> Result<Option<NavigationOutcome>, BootstrapError> {
        if self.shutdown.is_triggered() {
            tracing::warn!("Kernel already shut down, not starting");
            return Ok(None);
        }

        match self.bootstrap.run(&self.registry, self.context()).await? {
            BootstrapOutcome::AlreadyBootstrapped => return Ok(None),
            BootstrapOutcome::Completed => {}
        }

        // Subscribe before the check so a concurrent shutdown is either seen
        // here or delivered to the listener.
        let signal = self.shutdown.subscribe();
        if self.shutdown.is_triggered() {
            tracing::warn!("Shutdown during bootstrap, not following the location");
            return Ok(None);
        }

        let (initial, listener) = self.context.session.start(signal).await;
        tracing::info!(outcome = initial.label(), "Kernel started");

        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(listener);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(Some(initial))
    }

    /// Stop the location listener and wait for it to exit.
    pub async fn shutdown(&self) {
        self.shutdown.trigger();

        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            if let Err(e) = listener.await {
                tracing::error!(error = %e, "Location listener ended abnormally");
            }
        }
        tracing::info!("Kernel stopped");
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{MemoryLocation, MemoryOverlay};

    fn kernel(order: &[&str]) -> Kernel {
        let mut config = KernelConfig::default();
        config.bootstrap.order = order.iter().map(|n| n.to_string()).collect();
        Kernel::new(
            config,
            Arc::new(MemoryLocation::new("/")),
            Arc::new(MemoryOverlay::new()),
        )
    }

    #[tokio::test]
    async fn test_components_see_the_kernel_context() {
        let kernel = kernel(&["router"]);
        kernel.registry().register(
            "router",
            |ctx: Arc<KernelContext>| async move {
                ctx.routes().register("/", |_| async { Ok(true) })?;
                Ok::<_, crate::BoxError>(())
            },
            &[],
        );

        let initial = kernel.start().await.unwrap();
        assert!(initial.unwrap().is_completed());
        assert_eq!(kernel.routes().len(), 1);
        assert_eq!(kernel.session().current_path().as_deref(), Some("/"));

        kernel.shutdown().await;
        assert!(kernel.is_shutting_down());
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let kernel = kernel(&[]);
        assert!(kernel.start().await.unwrap().is_some());
        assert!(kernel.start().await.unwrap().is_none());
        kernel.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_after_shutdown_does_nothing() {
        let kernel = kernel(&[]);
        kernel.shutdown().await;

        assert!(kernel.start().await.unwrap().is_none());
        assert!(!kernel.bootstrap().is_complete());
        assert!(kernel.listener.lock().unwrap().is_none());
    }
}
