//! Route handler contract.

use std::future::Future;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::routing::params::RouteParams;
use crate::BoxError;

/// Everything a handler receives for one navigation.
#[derive(Debug, Clone)]
pub struct RouteContext {
    /// Internal path being navigated to.
    pub path: String,
    /// Captured parameters.
    pub params: RouteParams,
    /// Cancelled when the navigation is abandoned. Handlers that spawn
    /// their own work should stop it when this fires.
    pub cancellation: CancellationToken,
}

/// Result of a handler: `Ok(true)` means a view was produced.
/// `Ok(false)` and `Err(_)` are both failures.
pub type HandlerResult = Result<bool, BoxError>;

/// An async route handler.
pub trait RouteHandler: Send + Sync {
    fn call(&self, ctx: RouteContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(RouteContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RouteContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx))
    }
}
