//! Cross-context notification through storage events.

use std::sync::Arc;

use khoojlo_core::Cart;
use tracing::{debug, warn};

use super::registry::{Callback, ListenerRegistry};
use super::{ChangeNotifier, NotifyError, Subscription};
use crate::storage::{ContextStorage, StorageEvent};

/// Notifier fed by storage events from other contexts.
///
/// Watches one key of a [`ContextStorage`]. When another context rewrites
/// that key, subscribers receive the new blob decoded with the cart's
/// normalization; a removed key or an unreadable blob reads as an empty cart.
///
/// `publish` does nothing: the storage area raises the cross-context signal
/// itself when the store writes.
pub struct StorageChangeListener {
    key: String,
    registry: Arc<ListenerRegistry<Cart>>,
    _storage_subscription: Subscription,
}

impl StorageChangeListener {
    /// Start watching `key` on a context's storage.
    #[must_use]
    pub fn new(storage: &ContextStorage, key: impl Into<String>) -> Self {
        let key = key.into();
        let registry = Arc::new(ListenerRegistry::new());

        let watched = key.clone();
        let target = Arc::downgrade(&registry);
        let storage_subscription = storage.on_change(Arc::new(move |event: &StorageEvent| {
            if event.key != watched {
                return;
            }
            let Some(registry) = target.upgrade() else {
                return;
            };

            let cart = decode(event);
            debug!(key = %event.key, source = %event.source, lines = cart.len(), "Cart changed in another context");
            if let Err(e) = registry.notify(&cart) {
                warn!(key = %event.key, error = %e, "Cart change listener failed");
            }
        }));

        Self {
            key,
            registry,
            _storage_subscription: storage_subscription,
        }
    }

    /// Key being watched.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn decode(event: &StorageEvent) -> Cart {
    let Some(raw) = event.new_value.as_deref() else {
        return Cart::new();
    };
    Cart::from_json(raw).unwrap_or_else(|e| {
        warn!(key = %event.key, error = %e, "Ignoring unreadable cart from another context");
        Cart::new()
    })
}

impl ChangeNotifier for StorageChangeListener {
    fn publish(&self, _cart: &Cart) -> Result<(), NotifyError> {
        Ok(())
    }

    fn subscribe(&self, listener: Callback<Cart>) -> Subscription {
        self.registry.subscribe(listener)
    }
}

impl std::fmt::Debug for StorageChangeListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageChangeListener")
            .field("key", &self.key)
            .field("subscribers", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::storage::{KeyValueStorage, MemoryStorage, StorageArea};

    fn watch(listener: &StorageChangeListener) -> (Arc<Mutex<Vec<Cart>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = listener.subscribe(Arc::new(move |cart: &Cart| {
            sink.lock().unwrap().push(cart.clone());
        }));
        (seen, subscription)
    }

    #[test]
    fn test_decodes_other_context_writes() {
        let area = StorageArea::new(Arc::new(MemoryStorage::new()));
        let tab_a = area.context();
        let tab_b = area.context();
        let listener = StorageChangeListener::new(&tab_b, "react_cart");
        let (seen, _s) = watch(&listener);

        tab_a
            .set_item("react_cart", r#"[{"id": 5, "quantity": "3"}]"#)
            .unwrap();
        tab_a.flush_events();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].count(), 3);
        assert_eq!(seen[0].lines()[0].id.as_str(), "5");
    }

    #[test]
    fn test_ignores_other_keys() {
        let area = StorageArea::new(Arc::new(MemoryStorage::new()));
        let tab_a = area.context();
        let tab_b = area.context();
        let listener = StorageChangeListener::new(&tab_b, "react_cart");
        let (seen, _s) = watch(&listener);

        tab_a.set_item("access", "token").unwrap();
        tab_a.flush_events();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_removed_or_garbled_blob_reads_empty() {
        let area = StorageArea::new(Arc::new(MemoryStorage::new()));
        let tab_a = area.context();
        let tab_b = area.context();
        let listener = StorageChangeListener::new(&tab_b, "react_cart");
        let (seen, _s) = watch(&listener);

        tab_a.set_item("react_cart", "{not json").unwrap();
        tab_a.remove_item("react_cart").unwrap();
        tab_a.flush_events();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(Cart::is_empty));
    }

    #[test]
    fn test_publish_is_noop() {
        let area = StorageArea::new(Arc::new(MemoryStorage::new()));
        let tab = area.context();
        let listener = StorageChangeListener::new(&tab, "react_cart");
        let (seen, _s) = watch(&listener);

        listener.publish(&Cart::new()).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }
}
