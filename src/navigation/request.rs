//! Navigation requests and their outcomes.

use uuid::Uuid;

use crate::navigation::error::NavigationError;
use crate::routing::RouteParams;

/// Where a navigation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOrigin {
    /// `NavigationSession::navigate`; the session writes the location.
    Programmatic,
    /// Back/forward or hash change; the location is already up to date.
    LocationChange,
}

/// One navigation attempt. The id correlates log lines.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub id: Uuid,
    pub path: String,
    pub origin: NavigationOrigin,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>, origin: NavigationOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            origin,
        }
    }
}

/// Why a navigation was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another navigation holds the single-flight guard.
    InFlight,
    /// The path is already the current path.
    Duplicate,
}

/// How a navigation settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The handler succeeded; location written and subscribers notified.
    Completed { path: String, params: RouteParams },
    /// No route matched; overlay shown, subscribers notified with no params.
    NotFound { path: String },
    /// Handler failure or timeout; state unchanged.
    Failed(NavigationError),
    /// Not attempted.
    Rejected(RejectReason),
}

impl NavigationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, NavigationOutcome::Completed { .. })
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            NavigationOutcome::Completed { .. } => "completed",
            NavigationOutcome::NotFound { .. } => "not_found",
            NavigationOutcome::Failed(NavigationError::Timeout { .. }) => "timeout",
            NavigationOutcome::Failed(_) => "failed",
            NavigationOutcome::Rejected(RejectReason::InFlight) => "rejected_in_flight",
            NavigationOutcome::Rejected(RejectReason::Duplicate) => "rejected_duplicate",
        }
    }
}
