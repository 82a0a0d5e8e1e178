//! Navigation failures.
//!
//! None of these escape the session as an `Err`: they are logged, shown
//! through the overlay, and reported in the returned outcome.

use thiserror::Error;

use crate::navigation::overlay::{NoticeKind, OverlayNotice};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The handler returned `false` or an error.
    #[error("Handler for '{path}' failed: {reason}")]
    HandlerFailure { path: String, reason: String },

    /// No registered pattern matched.
    #[error("No route matched '{0}'")]
    NoRouteMatched(String),

    /// The handler did not settle within the safety timeout.
    #[error("Navigation to '{path}' timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    /// The display location is outside the base path. Logged only.
    #[error("Location '{location}' is outside base path '{base_path}'")]
    BasePathMismatch { location: String, base_path: String },
}

impl NavigationError {
    /// Build the overlay content for this failure.
    pub fn notice(&self, return_path: &str) -> OverlayNotice {
        let (kind, title) = match self {
            NavigationError::NoRouteMatched(_) => (NoticeKind::NotFound, "Page not found"),
            NavigationError::Timeout { .. } => (NoticeKind::TimedOut, "Navigation timed out"),
            NavigationError::HandlerFailure { .. } | NavigationError::BasePathMismatch { .. } => {
                (NoticeKind::HandlerFailed, "Navigation failed")
            }
        };
        OverlayNotice {
            kind,
            title: title.to_string(),
            message: self.to_string(),
            return_path: return_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kinds() {
        let notice = NavigationError::NoRouteMatched("/nope".into()).notice("/");
        assert_eq!(notice.kind, NoticeKind::NotFound);
        assert_eq!(notice.title, "Page not found");
        assert_eq!(notice.message, "No route matched '/nope'");
        assert_eq!(notice.return_path, "/");

        let notice = NavigationError::Timeout {
            path: "/slow".into(),
            timeout_ms: 50,
        }
        .notice("/home");
        assert_eq!(notice.kind, NoticeKind::TimedOut);
        assert_eq!(notice.return_path, "/home");
    }
}
