//! The cart store.
//!
//! [`CartStore`] keeps the shopper's cart in local storage under a single key
//! and announces every change through its notifiers.
//!
//! # Guarantees
//!
//! - No operation returns an error or panics on bad input. Unreadable blobs
//!   read as an empty cart; storage failures are logged and swallowed.
//! - Every mutation persists the whole cart and then publishes exactly one
//!   snapshot per notifier, synchronously, before returning.
//! - No lock is held while listeners run, in this context or another one.
//!   Storage events for other contexts are flushed after the local publish.
//! - Reads and writes share one normalization, so `read()` right after a
//!   mutation returns exactly the snapshot that was published.
//! - Within one store, each mutation is an atomic read-modify-write. Stores
//!   in different contexts sharing the same storage are last-write-wins on
//!   the whole blob.
//!
//! # Failed writes
//!
//! When persisting fails (quota exceeded, storage unavailable) subscribers
//! are still notified with the attempted cart, so the UI shows the change
//! even though a reload would not. This is deliberate and keeps the UI
//! responsive; see `DESIGN.md` for the open question.

use std::sync::{Arc, Mutex, PoisonError};

use khoojlo_core::{Cart, MediaBase, NumberLike, Product, ProductId, Quantity};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::notify::ChangeNotifier;
use crate::storage::KeyValueStorage;

/// Storage key the cart lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "react_cart";

/// Shopping cart mirrored into local storage.
///
/// Cheap to clone; clones share storage, notifiers and the mutation lock.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStorage>,
    notifiers: Vec<Arc<dyn ChangeNotifier>>,
    key: String,
    media_base: MediaBase,
    /// Serializes read-modify-write cycles. Never held while notifying or
    /// flushing storage events.
    write_lock: Mutex<()>,
}

/// Builder for [`CartStore`].
pub struct CartStoreBuilder {
    storage: Arc<dyn KeyValueStorage>,
    media_base: MediaBase,
    key: String,
    notifiers: Vec<Arc<dyn ChangeNotifier>>,
}

impl CartStoreBuilder {
    /// Use a different storage key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Publish changes through a notifier. May be called more than once.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Build the store.
    #[must_use]
    pub fn build(self) -> CartStore {
        CartStore {
            inner: Arc::new(CartStoreInner {
                storage: self.storage,
                notifiers: self.notifiers,
                key: self.key,
                media_base: self.media_base,
                write_lock: Mutex::new(()),
            }),
        }
    }
}

impl CartStore {
    /// Start building a store over a storage backend.
    ///
    /// `media_base` qualifies relative product image paths.
    #[must_use]
    pub fn builder(storage: Arc<dyn KeyValueStorage>, media_base: MediaBase) -> CartStoreBuilder {
        CartStoreBuilder {
            storage,
            media_base,
            key: DEFAULT_CART_KEY.to_string(),
            notifiers: Vec::new(),
        }
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Media base used for product images.
    #[must_use]
    pub fn media_base(&self) -> &MediaBase {
        &self.inner.media_base
    }

    /// Read the persisted cart.
    ///
    /// An absent, unreadable or malformed blob reads as an empty cart.
    #[must_use]
    pub fn read(&self) -> Cart {
        let raw = match self.inner.storage.get_item(&self.inner.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                error!(key = %self.inner.key, error = %e, "Failed to read cart from storage");
                return Cart::new();
            }
        };

        Cart::from_json(&raw).unwrap_or_else(|e| {
            warn!(key = %self.inner.key, error = %e, "Discarding unreadable cart");
            Cart::new()
        })
    }

    /// Replace the cart with line-like values.
    ///
    /// Each value is normalized, the result is persisted and published, and
    /// the normalized cart is returned.
    pub fn write<'a>(&self, lines: impl IntoIterator<Item = &'a Value>) -> Cart {
        self.replace(Cart::from_values(lines))
    }

    /// Replace the cart with typed lines. Normalizes, persists and publishes.
    pub fn replace(&self, cart: Cart) -> Cart {
        let cart = {
            let _guard = self.lock();
            self.persist(Cart::from_lines(cart))
        };
        self.publish(&cart);
        self.inner.storage.flush_events();
        cart
    }

    /// Add units of a product.
    ///
    /// `quantity` is coerced; anything that does not read as at least one
    /// unit adds one. An existing line keeps its name, price and image and
    /// has its quantity raised, capped at 999.
    pub fn add_line(&self, product: &Product, quantity: impl NumberLike) -> Cart {
        let units = Quantity::coerce_increment(quantity);
        debug!(product_id = %product.product_id(), units = units.get(), "Adding to cart");
        self.mutate(|cart, media| cart.add_product(product, units, media))
    }

    /// Remove a product's line. Unknown ids are ignored.
    pub fn remove_line(&self, id: impl Into<ProductId>) -> Cart {
        let id = id.into();
        debug!(product_id = %id, "Removing from cart");
        self.mutate(|cart, _| {
            cart.remove(&id);
        })
    }

    /// Set a line's quantity exactly.
    ///
    /// `quantity` is coerced; invalid input reads as zero. Zero or less
    /// removes the line. No 999 ceiling applies here.
    pub fn set_quantity(&self, id: impl Into<ProductId>, quantity: impl NumberLike) -> Cart {
        let id = id.into();
        let units = Quantity::coerce(quantity);
        debug!(product_id = %id, units = units.get(), "Setting cart quantity");
        self.mutate(|cart, _| cart.set_quantity(&id, units))
    }

    /// Empty the cart.
    pub fn clear(&self) -> Cart {
        debug!("Clearing cart");
        self.mutate(|cart, _| cart.clear())
    }

    /// Total number of units in the persisted cart.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.read().count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Read, modify and persist under the lock, then publish.
    fn mutate(&self, change: impl FnOnce(&mut Cart, &MediaBase)) -> Cart {
        let cart = {
            let _guard = self.lock();
            let mut cart = self.read();
            change(&mut cart, &self.inner.media_base);
            self.persist(Cart::from_lines(cart))
        };
        self.publish(&cart);
        self.inner.storage.flush_events();
        cart
    }

    /// Write the cart to storage. Failures are logged; the cart is returned either way.
    fn persist(&self, cart: Cart) -> Cart {
        let raw = match cart.to_json() {
            Ok(raw) => raw,
            Err(e) => {
                error!(key = %self.inner.key, error = %e, "Failed to encode cart");
                return cart;
            }
        };

        if let Err(e) = self.inner.storage.set_item(&self.inner.key, &raw) {
            error!(
                key = %self.inner.key,
                error = %e,
                lines = cart.len(),
                "Failed to save cart to storage"
            );
        }
        cart
    }

    fn publish(&self, cart: &Cart) {
        for notifier in &self.inner.notifiers {
            if let Err(e) = notifier.publish(cart) {
                warn!(key = %self.inner.key, error = %e, "Cart change notification failed");
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("media_base", &self.inner.media_base)
            .field("notifiers", &self.inner.notifiers.len())
            .finish_non_exhaustive()
    }
}
