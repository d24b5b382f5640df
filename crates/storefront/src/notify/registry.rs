//! Listener bookkeeping shared by every notifier.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::{NotifyError, Subscription, Unsubscribe};

/// Callback invoked with each event.
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered set of listeners for one event type.
pub(crate) struct ListenerRegistry<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Callback<E>)>>,
}

impl<E> ListenerRegistry<E> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Call every listener in registration order.
    ///
    /// The listener list is copied before the first call, so listeners may
    /// subscribe, unsubscribe or trigger new events without deadlocking.
    /// A panicking listener does not stop the others.
    pub(crate) fn notify(&self, event: &E) -> Result<(), NotifyError> {
        let snapshot: Vec<Callback<E>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        let panicked = snapshot
            .iter()
            .filter(|callback| catch_unwind(AssertUnwindSafe(|| callback(event))).is_err())
            .count();

        if panicked == 0 {
            Ok(())
        } else {
            Err(NotifyError::ListenerPanicked { count: panicked })
        }
    }
}

impl<E: 'static> ListenerRegistry<E> {
    /// Register a listener. Dropping the returned guard removes it.
    pub(crate) fn subscribe(self: &Arc<Self>, callback: Callback<E>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, callback));

        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(self) as Weak<dyn Unsubscribe>;
        Subscription::new(weak, id)
    }
}

impl<E> Unsubscribe for ListenerRegistry<E> {
    fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(listener_id, _)| *listener_id != id);
    }
}
