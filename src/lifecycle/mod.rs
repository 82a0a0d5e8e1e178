//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (kernel.rs → bootstrap.rs):
//!     Kernel::start → validate order against dependency graph
//!                   → initialize components one by one
//!                   → route the initial location → start location listener
//!
//! Shutdown (shutdown.rs):
//!     Kernel::shutdown → broadcast → location listener exits → joined
//!
//! Signals (signals.rs):
//!     SIGINT → host calls Kernel::shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the configured order is the only sequencing mechanism
//! - Bootstrap runs once; a failed run may be retried
//! - One kernel value owns all shared state; no globals

pub mod bootstrap;
pub mod kernel;
pub mod shutdown;
pub mod signals;

pub use bootstrap::{Bootstrap, BootstrapError, BootstrapOutcome};
pub use kernel::{Kernel, KernelContext};
pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
