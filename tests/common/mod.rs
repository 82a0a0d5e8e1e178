//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nav_kernel::config::{KernelConfig, NavigationConfig};
use nav_kernel::navigation::{MemoryLocation, MemoryOverlay, NavigationSession, Subscription};
use nav_kernel::routing::{RouteParams, RouteTable};
use nav_kernel::Kernel;

/// A session wired to in-memory collaborators.
pub struct Harness {
    pub session: Arc<NavigationSession>,
    pub location: Arc<MemoryLocation>,
    pub overlay: Arc<MemoryOverlay>,
}

impl Harness {
    pub fn routes(&self) -> &Arc<RouteTable> {
        self.session.routes()
    }
}

pub fn harness(config: NavigationConfig, url: &str) -> Harness {
    let location = Arc::new(MemoryLocation::new(url));
    let overlay = Arc::new(MemoryOverlay::new());
    let session = Arc::new(NavigationSession::new(
        config,
        Arc::new(RouteTable::new()),
        location.clone(),
        overlay.clone(),
    ));
    Harness {
        session,
        location,
        overlay,
    }
}

/// History-mode session with default settings, positioned at `url`.
pub fn history(url: &str) -> Harness {
    harness(NavigationConfig::default(), url)
}

/// Kernel over in-memory collaborators with the given bootstrap order.
pub fn kernel(order: &[&str], max_attempts: u32) -> (Kernel, Arc<MemoryLocation>) {
    let mut config = KernelConfig::default();
    config.bootstrap.order = order.iter().map(|n| n.to_string()).collect();
    config.initialization.max_attempts = max_attempts;

    let location = Arc::new(MemoryLocation::new("/"));
    let kernel = Kernel::new(config, location.clone(), Arc::new(MemoryOverlay::new()));
    (kernel, location)
}

/// Records every route change a session reports.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<(String, RouteParams)>>>,
}

impl Recorder {
    pub fn attach(session: &NavigationSession) -> (Self, Subscription) {
        let recorder = Self::default();
        let seen = recorder.seen.clone();
        let subscription = session.on_route_change(move |path, params| {
            seen.lock().unwrap().push((path.to_string(), params.clone()));
            Ok(())
        });
        (recorder, subscription)
    }

    pub fn paths(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn last(&self) -> Option<(String, RouteParams)> {
        self.seen.lock().unwrap().last().cloned()
    }

    /// Wait until `path` has been reported, giving background tasks time to run.
    pub async fn wait_for(&self, path: &str) {
        let deadline = tokio::time::timeout(Duration::from_secs(5), async {
            while !self.paths().iter().any(|p| p == path) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        deadline.await.expect("route change was never reported");
    }

    /// Wait until `count` route changes have been reported.
    pub async fn wait_for_len(&self, count: usize) {
        let deadline = tokio::time::timeout(Duration::from_secs(5), async {
            while self.paths().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });
        deadline.await.expect("route changes were never reported");
    }
}

/// Shared call counter.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicU32>);

impl Counter {
    pub fn bump(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}
