//! Component initialization subsystem.
//!
//! # Data Flow
//! ```text
//! register(name, init, deps)
//!     → component.rs (descriptor, status = Registered)
//!
//! initialize(name, ctx)
//!     → initializer.rs
//!         Initialized?          → Ok
//!         re-entrant?           → CircularDependency
//!         in flight?            → await the shared future
//!         otherwise             → run with retry, memoize
//!     → on final failure: status back to Registered, memo cleared
//!
//! Bootstrap validation:
//!     declared deps → graph.rs (DFS cycle check, topological order)
//! ```
//!
//! # Design Decisions
//! - Declared dependencies are metadata; the bootstrap order enforces them
//! - One execution per component no matter how many callers are waiting
//! - A failed component can be retried from scratch by a later call

pub mod component;
pub mod error;
pub mod graph;
pub mod initializer;

pub use component::{init_fn, ComponentDescriptor, ComponentStatus, InitFn};
pub use error::InitError;
pub use graph::{reachable, topological_order, GraphError};
pub use initializer::InitializationRegistry;
