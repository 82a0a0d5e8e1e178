//! Navigation session.
//!
//! # Responsibilities
//! - Translate between internal paths and display paths under the base path
//! - Serialize navigations: at most one in flight
//! - Run the matched handler under a safety timeout with cancellation
//! - Notify subscribers once per distinct settled path
//!
//! # Design Decisions
//! - The single-flight guard is a ticket (request id + cancellation token)
//!   released by an RAII guard, so every exit path clears it
//! - A timed-out handler future is dropped and its token cancelled; it can
//!   never commit state after its navigation was abandoned
//! - Failures are recovered locally and surfaced through the overlay

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::{NavigationConfig, RoutingMode};
use crate::navigation::error::NavigationError;
use crate::navigation::location::Location;
use crate::navigation::overlay::Overlay;
use crate::navigation::request::{NavigationOrigin, NavigationOutcome, NavigationRequest, RejectReason};
use crate::navigation::subscribers::{Subscribers, Subscription};
use crate::observability::metrics;
use crate::routing::{RouteContext, RouteMatch, RouteParams, RouteTable};
use crate::BoxError;

struct InFlight {
    id: Uuid,
    token: CancellationToken,
}

#[derive(Default)]
struct SessionState {
    /// Last path subscribers were notified about.
    current_path: Option<String>,
    in_flight: Option<InFlight>,
}

/// Owns the current path and drives route handlers.
pub struct NavigationSession {
    config: NavigationConfig,
    base_path: String,
    routes: Arc<RouteTable>,
    location: Arc<dyn Location>,
    overlay: Arc<dyn Overlay>,
    subscribers: Subscribers,
    state: Mutex<SessionState>,
}

impl NavigationSession {
    /// Create a session. The base path is fixed here for the session's lifetime.
    pub fn new(
        config: NavigationConfig,
        routes: Arc<RouteTable>,
        location: Arc<dyn Location>,
        overlay: Arc<dyn Overlay>,
    ) -> Self {
        let base_path = detect_base_path(&config, location.as_ref());
        tracing::info!(base_path = %base_path, mode = ?config.mode, "Navigation session created");

        Self {
            config,
            base_path,
            routes,
            location,
            overlay,
            subscribers: Subscribers::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn mode(&self) -> RoutingMode {
        self.config.mode
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn current_path(&self) -> Option<String> {
        self.state().current_path.clone()
    }

    pub fn is_navigating(&self) -> bool {
        self.state().in_flight.is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the display location and return the internal path.
    pub fn parse_path(&self) -> String {
        match self.config.mode {
            RoutingMode::Hash => {
                let hash = self.location.hash();
                normalize_path(hash.trim_start_matches('#'))
            }
            RoutingMode::History => {
                let display = self.location.pathname();
                if self.base_path.is_empty() {
                    return normalize_path(&display);
                }
                match display.strip_prefix(self.base_path.as_str()) {
                    Some(rest) if rest.is_empty() || rest.starts_with('/') => normalize_path(rest),
                    _ => {
                        let err = NavigationError::BasePathMismatch {
                            location: display.clone(),
                            base_path: self.base_path.clone(),
                        };
                        tracing::warn!(error = %err, "Using location verbatim");
                        normalize_path(&display)
                    }
                }
            }
        }
    }

    /// Translate an internal path into the form written to the location.
    ///
    /// The root collapses to `/` only when there is no base path. Under a
    /// base path it becomes `{base}/` (`/app` + `/` is `/app/`), matching how
    /// a document served at the base URL is addressed. [`Self::parse_path`]
    /// maps both `/app` and `/app/` back to `/`.
    pub fn to_display_path(&self, path: &str) -> String {
        let path = normalize_path(path);
        match self.config.mode {
            RoutingMode::Hash => format!("#{}", path),
            RoutingMode::History => format!("{}{}", self.base_path, path),
        }
    }

    /// Register a route change subscriber.
    pub fn on_route_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &RouteParams) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.subscribers.add(callback)
    }

    /// Dismiss an error overlay without navigating.
    pub fn dismiss_overlay(&self) {
        self.overlay.dismiss();
    }

    /// Navigate to `path`.
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        let request = NavigationRequest::new(normalize_path(path), NavigationOrigin::Programmatic);
        self.run(request).await
    }

    /// React to a back/forward or hash change by routing the current location.
    pub async fn handle_route_change(&self) -> NavigationOutcome {
        let request = NavigationRequest::new(self.parse_path(), NavigationOrigin::LocationChange);
        self.run(request).await
    }

    /// Route the initial location, then follow location changes until
    /// `shutdown` fires.
    pub async fn start(
        self: &Arc<Self>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> (NavigationOutcome, JoinHandle<()>) {
        // Subscribe first so a change during the initial route is not lost.
        let mut changes = self.location.subscribe();
        let initial = self.handle_route_change().await;

        let session = Arc::clone(self);
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    change = changes.recv() => match change {
                        Ok(kind) => {
                            tracing::debug!(change = ?kind, "Location changed");
                            session.handle_route_change().await;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Location listener lagged, routing latest location");
                            session.handle_route_change().await;
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = shutdown.recv() => {
                        tracing::info!("Location listener received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        });

        (initial, listener)
    }

    async fn run(&self, request: NavigationRequest) -> NavigationOutcome {
        let span = tracing::info_span!(
            "navigation",
            id = %request.id,
            path = %request.path,
            origin = ?request.origin
        );

        async {
            let token = match self.claim(&request) {
                Ok(token) => token,
                Err(reason) => {
                    tracing::debug!(reason = ?reason, "Navigation ignored");
                    let outcome = NavigationOutcome::Rejected(reason);
                    metrics::record_navigation(outcome.label());
                    return outcome;
                }
            };
            let mut ticket = TicketGuard {
                session: self,
                id: request.id,
                settled: false,
            };
            self.overlay.show_loading();

            let outcome = match self.routes.match_path(&request.path) {
                Some(matched) => self.run_handler(&request, matched, token).await,
                None => self.not_found(&request),
            };
            ticket.settled = true;

            metrics::record_navigation(outcome.label());
            outcome
        }
        .instrument(span)
        .await
    }

    fn claim(&self, request: &NavigationRequest) -> Result<CancellationToken, RejectReason> {
        let mut state = self.state();
        if state.in_flight.is_some() {
            return Err(RejectReason::InFlight);
        }
        if state.current_path.as_deref() == Some(request.path.as_str()) {
            return Err(RejectReason::Duplicate);
        }
        let token = CancellationToken::new();
        state.in_flight = Some(InFlight {
            id: request.id,
            token: token.clone(),
        });
        Ok(token)
    }

    fn release(&self, id: Uuid) -> Option<CancellationToken> {
        let mut state = self.state();
        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight.take().map(|f| f.token)
        } else {
            None
        }
    }

    async fn run_handler(
        &self,
        request: &NavigationRequest,
        matched: RouteMatch,
        token: CancellationToken,
    ) -> NavigationOutcome {
        tracing::debug!(pattern = %matched.pattern, "Route matched");

        let ctx = RouteContext {
            path: request.path.clone(),
            params: matched.params.clone(),
            cancellation: token.clone(),
        };
        let timeout_ms = self.config.safety_timeout_ms;
        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), matched.handler.call(ctx)).await;

        match result {
            Ok(Ok(true)) => self.commit(request, matched.params),
            Ok(Ok(false)) => self.fail(NavigationError::HandlerFailure {
                path: request.path.clone(),
                reason: "handler reported failure".to_string(),
            }),
            Ok(Err(e)) => self.fail(NavigationError::HandlerFailure {
                path: request.path.clone(),
                reason: e.to_string(),
            }),
            Err(_) => {
                token.cancel();
                self.fail(NavigationError::Timeout {
                    path: request.path.clone(),
                    timeout_ms,
                })
            }
        }
    }

    fn commit(&self, request: &NavigationRequest, params: RouteParams) -> NavigationOutcome {
        if request.origin == NavigationOrigin::Programmatic {
            let display = self.to_display_path(&request.path);
            match self.config.mode {
                RoutingMode::History => self.location.push_path(&display),
                RoutingMode::Hash => self.location.set_hash(&display),
            }
        }
        self.overlay.close_menus();

        if self.set_current(&request.path) {
            self.subscribers.notify(&request.path, &params);
        }
        tracing::info!("Navigation completed");

        NavigationOutcome::Completed {
            path: request.path.clone(),
            params,
        }
    }

    fn not_found(&self, request: &NavigationRequest) -> NavigationOutcome {
        let err = NavigationError::NoRouteMatched(request.path.clone());
        tracing::warn!(error = %err, "Route not found");
        self.overlay.show_error(&err.notice(&self.return_path()));

        // Route-aware UI still hears about unknown paths.
        if self.set_current(&request.path) {
            self.subscribers.notify(&request.path, &RouteParams::new());
        }

        NavigationOutcome::NotFound {
            path: request.path.clone(),
        }
    }

    fn fail(&self, err: NavigationError) -> NavigationOutcome {
        tracing::warn!(error = %err, "Navigation failed");
        self.overlay.show_error(&err.notice(&self.return_path()));
        NavigationOutcome::Failed(err)
    }

    /// Returns true if the current path changed.
    fn set_current(&self, path: &str) -> bool {
        let mut state = self.state();
        if state.current_path.as_deref() == Some(path) {
            return false;
        }
        state.current_path = Some(path.to_string());
        true
    }

    fn return_path(&self) -> String {
        self.current_path()
            .unwrap_or_else(|| self.config.fallback_path.clone())
    }
}

/// Releases the single-flight ticket on every exit. If the navigation future
/// is dropped before it settles, the handler's token is cancelled too.
struct TicketGuard<'a> {
    session: &'a NavigationSession,
    id: Uuid,
    settled: bool,
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.session.release(self.id) {
            if !self.settled {
                token.cancel();
            }
        }
        self.session.overlay.hide_loading();
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn detect_base_path(config: &NavigationConfig, location: &dyn Location) -> String {
    let raw = match &config.base_path {
        Some(base) => base.clone(),
        None => location
            .base_href()
            .and_then(|href| match Url::parse(&href) {
                Ok(url) => Some(url.path().to_string()),
                Err(_) if href.starts_with('/') => Some(href),
                Err(e) => {
                    tracing::warn!(href = %href, error = %e, "Ignoring unparseable document base");
                    None
                }
            })
            .unwrap_or_default(),
    };
    raw.trim_end_matches('/').to_string()
}
