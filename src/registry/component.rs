//! Component descriptors and their lifecycle status.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use futures_util::future::BoxFuture;

use crate::BoxError;

/// Type-erased initializer.
pub type InitFn<C> = Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Box an async closure into an [`InitFn`].
pub fn init_fn<C, F, Fut>(f: F) -> InitFn<C>
where
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Lifecycle status of a registered component.
///
/// ```text
/// Registered → InProgress → Initialized
///                  │  ▲
///                  └──┘ retry after backoff
/// InProgress → Registered   (attempts exhausted; a later call retries)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Registered,
    InProgress,
    Initialized,
}

/// A named initializer plus its declared dependencies.
pub struct ComponentDescriptor<C> {
    pub name: String,
    pub init: InitFn<C>,
    /// Metadata only: never initialized automatically.
    pub dependencies: Vec<String>,
}

impl<C> Clone for ComponentDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            init: self.init.clone(),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<C> fmt::Debug for ComponentDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
