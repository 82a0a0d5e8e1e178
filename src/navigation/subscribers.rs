//! Route change subscribers.
//!
//! Subscribers live in a copy-on-write list so notification iterates a
//! snapshot: a callback may subscribe or unsubscribe without deadlocking,
//! and the change takes effect from the next notification.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::routing::RouteParams;
use crate::BoxError;

/// Callback invoked with `(path, params)` after a settled navigation.
pub type RouteListener = dyn Fn(&str, &RouteParams) -> Result<(), BoxError> + Send + Sync;

struct Entry {
    id: u64,
    callback: Arc<RouteListener>,
}

type EntryList = ArcSwap<Vec<Arc<Entry>>>;

/// Ordered subscriber registry.
pub struct Subscribers {
    next_id: AtomicU64,
    list: Arc<EntryList>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            list: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// Append a subscriber; it runs after all earlier ones.
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str, &RouteParams) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(Entry {
            id,
            callback: Arc::new(callback),
        });
        self.list.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(entry.clone());
            next
        });
        Subscription {
            id,
            list: Arc::downgrade(&self.list),
        }
    }

    /// Call every subscriber in registration order.
    ///
    /// Returns the number of subscribers that failed. A failing subscriber
    /// never prevents later ones from running.
    pub fn notify(&self, path: &str, params: &RouteParams) -> usize {
        let snapshot = self.list.load_full();
        let mut failures = 0;

        for entry in snapshot.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| (entry.callback)(path, params)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    metrics::record_subscriber_error();
                    tracing::warn!(subscriber = entry.id, path = %path, error = %e, "Route subscriber failed");
                }
                Err(_) => {
                    failures += 1;
                    metrics::record_subscriber_error();
                    tracing::error!(subscriber = entry.id, path = %path, "Route subscriber panicked");
                }
            }
        }

        failures
    }

    pub fn len(&self) -> usize {
        self.list.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Subscribers {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by a subscription; call [`Subscription::unsubscribe`] to
/// stop receiving notifications. Dropping the handle keeps the subscriber.
#[derive(Debug)]
#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    list: Weak<EntryList>,
}

impl Subscription {
    /// Remove the subscriber. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(list) = self.list.upgrade() else {
            return false;
        };
        let mut removed = false;
        list.rcu(|current| {
            let next: Vec<Arc<Entry>> = current.iter().filter(|e| e.id != self.id).cloned().collect();
            removed = next.len() != current.len();
            next
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_notifies_in_registration_order() {
        let subscribers = Subscribers::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = log.clone();
            let _ = subscribers.add(move |path, _| {
                log.lock().unwrap().push(format!("{}:{}", tag, path));
                Ok(())
            });
        }

        assert_eq!(subscribers.notify("/x", &RouteParams::new()), 0);
        assert_eq!(*log.lock().unwrap(), vec!["first:/x", "second:/x", "third:/x"]);
    }

    #[test]
    fn test_failing_subscribers_are_isolated() {
        let subscribers = Subscribers::new();
        let reached = Arc::new(AtomicU64::new(0));

        let _ = subscribers.add(|_, _| Err("boom".into()));
        let _ = subscribers.add(|_, _| panic!("subscriber panic"));
        let r = reached.clone();
        let _ = subscribers.add(move |_, _| {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(subscribers.notify("/", &RouteParams::new()), 2);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let subscribers = Subscribers::new();
        let a = subscribers.add(|_, _| Ok(()));
        let _b = subscribers.add(|_, _| Ok(()));
        assert_eq!(subscribers.len(), 2);

        assert!(a.unsubscribe());
        assert_eq!(subscribers.len(), 1);
    }
}
