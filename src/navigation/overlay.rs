//! Overlay collaborator: error surfaces, loading indicator, menus.

use std::sync::{Mutex, PoisonError};
use serde::Serialize;

/// Why an overlay is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    NotFound,
    HandlerFailed,
    TimedOut,
}

/// Content of a dismissible error overlay.
///
/// The overlay offers two affordances: dismiss, and return to
/// `return_path` (the last path known to render).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayNotice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub return_path: String,
}

/// User-visible surfaces the session drives but does not render.
pub trait Overlay: Send + Sync {
    fn show_error(&self, notice: &OverlayNotice);
    fn dismiss(&self);
    fn show_loading(&self);
    fn hide_loading(&self);
    /// Close open menus and transient overlays after a successful navigation.
    fn close_menus(&self);
}

/// Overlay that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOverlay;

impl Overlay for TracingOverlay {
    fn show_error(&self, notice: &OverlayNotice) {
        tracing::warn!(
            kind = ?notice.kind,
            title = %notice.title,
            return_path = %notice.return_path,
            "{}",
            notice.message
        );
    }

    fn dismiss(&self) {
        tracing::debug!("Overlay dismissed");
    }

    fn show_loading(&self) {
        tracing::trace!("Loading indicator shown");
    }

    fn hide_loading(&self) {
        tracing::trace!("Loading indicator hidden");
    }

    fn close_menus(&self) {
        tracing::trace!("Menus closed");
    }
}

/// Recorded overlay call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Error(OverlayNotice),
    Dismissed,
    LoadingShown,
    LoadingHidden,
    MenusClosed,
}

#[derive(Debug, Default)]
struct OverlayState {
    events: Vec<OverlayEvent>,
    error_visible: bool,
    loading: bool,
}

/// Overlay that records every call, for tests and headless hosts.
#[derive(Debug, Default)]
pub struct MemoryOverlay {
    state: Mutex<OverlayState>,
}

impl MemoryOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<OverlayEvent> {
        self.state().events.clone()
    }

    /// Error notices shown so far.
    pub fn notices(&self) -> Vec<OverlayNotice> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                OverlayEvent::Error(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_error_visible(&self) -> bool {
        self.state().error_visible
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn clear(&self) {
        self.state().events.clear();
    }
}

impl Overlay for MemoryOverlay {
    fn show_error(&self, notice: &OverlayNotice) {
        let mut state = self.state();
        state.error_visible = true;
        state.events.push(OverlayEvent::Error(notice.clone()));
    }

    fn dismiss(&self) {
        let mut state = self.state();
        state.error_visible = false;
        state.events.push(OverlayEvent::Dismissed);
    }

    fn show_loading(&self) {
        let mut state = self.state();
        state.loading = true;
        state.events.push(OverlayEvent::LoadingShown);
    }

    fn hide_loading(&self) {
        let mut state = self.state();
        state.loading = false;
        state.events.push(OverlayEvent::LoadingHidden);
    }

    fn close_menus(&self) {
        let mut state = self.state();
        state.error_visible = false;
        state.events.push(OverlayEvent::MenusClosed);
    }
}
