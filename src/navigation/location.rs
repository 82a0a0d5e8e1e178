//! Location collaborator.
//!
//! # Responsibilities
//! - Read the current display path and hash
//! - Write a new display path or hash without a reload
//! - Signal back/forward and hash changes made outside the session
//!
//! # Design Decisions
//! - The session only talks to the `Location` trait; a browser binding lives
//!   outside this crate
//! - `MemoryLocation` keeps a history stack so back/forward can be driven
//!   from tests and the demo binary

use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

/// A change to the location that the session did not initiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationChange {
    /// Back/forward traversal.
    PopState,
    /// The `#` fragment changed.
    HashChange,
}

/// Read/write access to the display location.
pub trait Location: Send + Sync {
    /// Current pathname, e.g. `/app/users/42`.
    fn pathname(&self) -> String;

    /// Current fragment including the leading `#`, or empty.
    fn hash(&self) -> String;

    /// Push a new pathname onto the history without emitting a change.
    fn push_path(&self, display_path: &str);

    /// Push a history entry with a new fragment without emitting a change.
    fn set_hash(&self, hash: &str);

    /// The document base URL, if the host declares one.
    fn base_href(&self) -> Option<String> {
        None
    }

    /// Subscribe to externally triggered changes.
    fn subscribe(&self) -> broadcast::Receiver<LocationChange>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    pathname: String,
    hash: String,
}

#[derive(Debug)]
struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl History {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }
}

/// In-process location with a history stack.
#[derive(Debug)]
pub struct MemoryLocation {
    history: Mutex<History>,
    base_href: Option<String>,
    tx: broadcast::Sender<LocationChange>,
}

impl MemoryLocation {
    /// Create a location positioned at `url`, which may carry a `#fragment`.
    pub fn new(url: &str) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            history: Mutex::new(History {
                entries: vec![split_fragment(url)],
                index: 0,
            }),
            base_href: None,
            tx,
        }
    }

    /// Declare a document base URL, e.g. `https://example.org/app/`.
    pub fn with_base_href(mut self, href: impl Into<String>) -> Self {
        self.base_href = Some(href.into());
        self
    }

    fn history(&self) -> std::sync::MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Go back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let moved = {
            let mut history = self.history();
            if history.index == 0 {
                false
            } else {
                history.index -= 1;
                true
            }
        };
        if moved {
            let _ = self.tx.send(LocationChange::PopState);
        }
        moved
    }

    /// Go forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let moved = {
            let mut history = self.history();
            if history.index + 1 >= history.entries.len() {
                false
            } else {
                history.index += 1;
                true
            }
        };
        if moved {
            let _ = self.tx.send(LocationChange::PopState);
        }
        moved
    }

    /// Simulate the user editing the fragment (e.g. clicking an anchor).
    pub fn change_hash(&self, hash: &str) {
        self.set_hash(hash);
        let _ = self.tx.send(LocationChange::HashChange);
    }

    /// Full display URLs in history order, e.g. `/app/users#top`.
    pub fn entries(&self) -> Vec<String> {
        self.history()
            .entries
            .iter()
            .map(|e| format!("{}{}", e.pathname, e.hash))
            .collect()
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> String {
        self.history().current().pathname.clone()
    }

    fn hash(&self) -> String {
        self.history().current().hash.clone()
    }

    fn push_path(&self, display_path: &str) {
        self.history().push(split_fragment(display_path));
    }

    fn set_hash(&self, hash: &str) {
        let mut history = self.history();
        let pathname = history.current().pathname.clone();
        history.push(HistoryEntry {
            pathname,
            hash: normalize_hash(hash),
        });
    }

    fn base_href(&self) -> Option<String> {
        self.base_href.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<LocationChange> {
        self.tx.subscribe()
    }
}

fn split_fragment(url: &str) -> HistoryEntry {
    match url.split_once('#') {
        Some((pathname, hash)) => HistoryEntry {
            pathname: pathname.to_string(),
            hash: normalize_hash(hash),
        },
        None => HistoryEntry {
            pathname: url.to_string(),
            hash: String::new(),
        },
    }
}

fn normalize_hash(hash: &str) -> String {
    let bare = hash.trim_start_matches('#');
    if bare.is_empty() {
        String::new()
    } else {
        format!("#{}", bare)
    }
}
