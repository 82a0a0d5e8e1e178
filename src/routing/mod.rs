//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at setup):
//!     pattern string ("/users/:id")
//!     → matcher.rs (compile into literal / param / wildcard segments)
//!     → router.rs (append to ordered table)
//!
//! Lookup (per navigation):
//!     internal path
//!     → router.rs (scan in registration order)
//!     → matcher.rs (segment comparison, param capture)
//!     → Return: handler + decoded params, or None
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, immutable afterwards
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod handler;
pub mod matcher;
pub mod params;
pub mod router;

pub use handler::{HandlerResult, RouteContext, RouteHandler};
pub use matcher::{RouteError, RoutePattern};
pub use params::RouteParams;
pub use router::{RouteMatch, RouteTable};
