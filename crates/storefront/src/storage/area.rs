//! Storage shared between execution contexts.
//!
//! A [`StorageArea`] plays the role of one origin's `localStorage` seen from
//! several tabs. Each tab holds a [`ContextStorage`] handle. When a handle
//! changes a key, every *other* handle's storage listeners receive a
//! [`StorageEvent`]; the writing handle does not, and writes that leave the
//! value unchanged raise nothing.
//!
//! Events are queued by the write and delivered by
//! [`KeyValueStorage::flush_events`], never from inside `set_item` or
//! `remove_item`. A writer can therefore hold its own lock across the write
//! without other contexts' listeners running under it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::warn;
use uuid::Uuid;

use super::{KeyValueStorage, StorageError};
use crate::notify::Subscription;
use crate::notify::registry::{Callback, ListenerRegistry};

/// Identifier of one execution context within a [`StorageArea`].
pub type ContextId = Uuid;

/// A change to a shared key, as seen by the contexts that did not make it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// Value before the change, `None` if the key was absent.
    pub old_value: Option<String>,
    /// Value after the change, `None` if the key was removed.
    pub new_value: Option<String>,
    /// Context that made the change.
    pub source: ContextId,
}

struct ContextEntry {
    id: ContextId,
    listeners: Weak<ListenerRegistry<StorageEvent>>,
}

struct AreaInner {
    backend: Arc<dyn KeyValueStorage>,
    contexts: Mutex<Vec<ContextEntry>>,
    outbox: Mutex<VecDeque<StorageEvent>>,
}

impl AreaInner {
    fn enqueue(&self, event: StorageEvent) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }

    /// Deliver queued events in write order. Listeners may write and queue more.
    fn flush(&self) {
        loop {
            let next = self
                .outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(event) = next else { break };
            self.dispatch(&event);
        }
    }

    /// Deliver an event to every live context except its source.
    fn dispatch(&self, event: &StorageEvent) {
        let targets: Vec<Arc<ListenerRegistry<StorageEvent>>> = {
            let mut contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
            contexts.retain(|entry| entry.listeners.strong_count() > 0);
            contexts
                .iter()
                .filter(|entry| entry.id != event.source)
                .filter_map(|entry| entry.listeners.upgrade())
                .collect()
        };

        for listeners in targets {
            if let Err(e) = listeners.notify(event) {
                warn!(key = %event.key, error = %e, "Storage event listener failed");
            }
        }
    }
}

/// Storage shared by several execution contexts.
#[derive(Clone)]
pub struct StorageArea {
    inner: Arc<AreaInner>,
}

impl StorageArea {
    /// Create an area over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            inner: Arc::new(AreaInner {
                backend,
                contexts: Mutex::new(Vec::new()),
                outbox: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Open a new execution context on this area.
    #[must_use]
    pub fn context(&self) -> ContextStorage {
        let listeners = Arc::new(ListenerRegistry::new());
        let id = Uuid::new_v4();

        self.inner
            .contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ContextEntry {
                id,
                listeners: Arc::downgrade(&listeners),
            });

        ContextStorage {
            id,
            area: Arc::clone(&self.inner),
            listeners,
        }
    }

    /// Number of events written but not yet delivered.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.inner
            .outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of contexts still open.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.inner
            .contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.listeners.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageArea")
            .field("contexts", &self.context_count())
            .finish_non_exhaustive()
    }
}

/// One execution context's view of a [`StorageArea`].
pub struct ContextStorage {
    id: ContextId,
    area: Arc<AreaInner>,
    listeners: Arc<ListenerRegistry<StorageEvent>>,
}

impl ContextStorage {
    /// This context's identifier.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Listen for changes made by other contexts.
    pub fn on_change(&self, listener: Callback<StorageEvent>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn announce(&self, key: &str, old_value: Option<String>, new_value: Option<String>) {
        if old_value == new_value {
            return;
        }
        self.area.enqueue(StorageEvent {
            key: key.to_owned(),
            old_value,
            new_value,
            source: self.id,
        });
    }
}

impl KeyValueStorage for ContextStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.area.backend.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_value = self.area.backend.get_item(key)?;
        self.area.backend.set_item(key, value)?;
        self.announce(key, old_value, Some(value.to_owned()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let old_value = self.area.backend.get_item(key)?;
        self.area.backend.remove_item(key)?;
        self.announce(key, old_value, None);
        Ok(())
    }

    fn flush_events(&self) {
        self.area.flush();
    }
}

impl std::fmt::Debug for ContextStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStorage")
            .field("id", &self.id)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
