//! In-context publish/subscribe.

use std::sync::Arc;

use khoojlo_core::Cart;

use super::registry::{Callback, ListenerRegistry};
use super::{ChangeNotifier, NotifyError, Subscription};

/// Synchronous event bus for cart snapshots within one context.
///
/// `publish` returns only after every subscriber has run, in registration
/// order, so a caller that mutates the cart and then reads it observes the
/// same state its subscribers rendered.
pub struct EventBus {
    registry: Arc<ListenerRegistry<Cart>>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ListenerRegistry::new()),
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for EventBus {
    fn publish(&self, cart: &Cart) -> Result<(), NotifyError> {
        self.registry.notify(cart)
    }

    fn subscribe(&self, listener: Callback<Cart>) -> Subscription {
        self.registry.subscribe(listener)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.registry.len())
            .finish()
    }
}
