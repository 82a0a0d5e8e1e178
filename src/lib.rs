//! Navigation kernel for single-page applications.
//!
//! # Architecture Overview
//!
//! ```text
//!   host (browser shim, test, demo binary)
//!        │  Location trait            Overlay trait
//!        ▼                                 ▲
//!   ┌───────────────────────── Kernel ─────┼──────────────────────┐
//!   │                                      │                      │
//!   │  lifecycle ── Bootstrap ──▶ registry (InitializationRegistry)│
//!   │      │                         memoized, retried, cycle-safe │
//!   │      ▼                                                      │
//!   │  navigation (NavigationSession) ──▶ routing (RouteTable)    │
//!   │      single-flight, timeout,          first match wins,     │
//!   │      subscribers                      :params, * wildcard   │
//!   │                                                             │
//!   │  cross-cutting: config · observability · resilience         │
//!   └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod lifecycle;
pub mod navigation;
pub mod observability;
pub mod registry;
pub mod resilience;
pub mod routing;

/// Error type returned by handlers, initializers and subscribers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use config::KernelConfig;
pub use lifecycle::{Bootstrap, BootstrapError, Kernel, KernelContext, Shutdown};
pub use navigation::{NavigationOutcome, NavigationSession};
pub use registry::{InitError, InitializationRegistry};
pub use routing::{RouteContext, RouteTable};
