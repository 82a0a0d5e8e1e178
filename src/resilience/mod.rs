//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Initializer attempt fails:
//!     → registry retry loop asks backoff.rs for the next delay
//!     → sleeps, then re-runs the initializer
//!     → gives up after the configured attempt count
//! ```
//!
//! # Design Decisions
//! - Delays grow exponentially so a flapping dependency is not hammered
//! - Jitter is off by default to keep startup timing deterministic
//! - Navigation does not retry; a failed handler is surfaced immediately

pub mod backoff;

pub use backoff::BackoffPolicy;
