//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! navigate(path) / location change signal
//!     → session.rs (normalize, single-flight claim)
//!     → routing (match path → handler + params)
//!     → handler runs under safety timeout
//!     → success: location.rs write, overlay.rs close menus,
//!                subscribers.rs notify, current path updated
//!     → failure: overlay.rs error notice, state unchanged
//!     → not found: overlay.rs notice, subscribers notified with no params
//! ```
//!
//! # Design Decisions
//! - The session never renders; the location and overlay are traits
//! - Navigation failures never escape as errors; they become outcomes
//! - Subscribers run synchronously, in registration order, isolated from
//!   each other's failures

pub mod error;
pub mod location;
pub mod overlay;
pub mod request;
pub mod session;
pub mod subscribers;

pub use error::NavigationError;
pub use location::{Location, LocationChange, MemoryLocation};
pub use overlay::{MemoryOverlay, NoticeKind, Overlay, OverlayEvent, OverlayNotice, TracingOverlay};
pub use request::{NavigationOrigin, NavigationOutcome, NavigationRequest, RejectReason};
pub use session::NavigationSession;
pub use subscribers::{Subscribers, Subscription};
