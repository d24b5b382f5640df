//! Cart change notification.
//!
//! The cart store announces every write through one or more
//! [`ChangeNotifier`]s. Two implementations are provided:
//!
//! - [`EventBus`] - in-context publish/subscribe. Subscribers run
//!   synchronously inside the store call that changed the cart.
//! - [`StorageChangeListener`] - cross-context. Subscribers are called when
//!   another context sharing the same [`crate::storage::StorageArea`]
//!   rewrites the cart key.
//!
//! # Example
//!
//! ```rust,ignore
//! let bus = Arc::new(EventBus::new());
//! let _subscription = bus.subscribe(Arc::new(|cart: &Cart| {
//!     tracing::info!(items = cart.count(), "cart changed");
//! }));
//!
//! let store = CartStore::builder(storage, media_base)
//!     .notifier(bus.clone())
//!     .build();
//! ```

mod bus;
pub(crate) mod registry;
mod storage_listener;

use std::sync::Weak;

use khoojlo_core::Cart;
use thiserror::Error;

pub use bus::EventBus;
pub use registry::Callback;
pub use storage_listener::StorageChangeListener;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// One or more listeners panicked. The remaining listeners still ran.
    #[error("{count} listener(s) panicked while handling a change")]
    ListenerPanicked {
        /// Number of listeners that panicked.
        count: usize,
    },
}

/// A channel that carries cart snapshots to subscribers.
pub trait ChangeNotifier: Send + Sync {
    /// Announce a new cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery to a subscriber failed. Delivery to the
    /// other subscribers is still attempted.
    fn publish(&self, cart: &Cart) -> Result<(), NotifyError>;

    /// Register a subscriber. It stays registered until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&self, listener: Callback<Cart>) -> Subscription;
}

/// Something a [`Subscription`] can detach itself from.
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

/// Guard for a registered listener; dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    source: Weak<dyn Unsubscribe>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(source: Weak<dyn Unsubscribe>, id: u64) -> Self {
        Self { source, id }
    }

    /// Keep the listener registered for as long as its source lives.
    pub fn detach(mut self) {
        self.source = Weak::<registry::ListenerRegistry<Cart>>::new() as Weak<dyn Unsubscribe>;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &(self.source.strong_count() > 0))
            .finish()
    }
}
