//! Integration tests for the Khoojlo cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p khoojlo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store behaviour over in-memory storage
//! - `cross_context` - Several contexts sharing one storage area
//! - `file_persistence` - File-backed storage and checkout across restarts
//!
//! This library only holds the fixtures those tests share.

use std::sync::{Arc, Mutex, PoisonError};

use khoojlo_core::{Cart, MediaBase};
use khoojlo_storefront::notify::{ChangeNotifier, Subscription};

/// Media base used by every fixture.
pub const MEDIA_BASE: &str = "https://media.example.com";

/// Parsed [`MEDIA_BASE`].
#[must_use]
pub fn media_base() -> MediaBase {
    MediaBase::parse(MEDIA_BASE).unwrap_or_else(|e| panic!("invalid test media base: {e}"))
}

/// Records every cart snapshot a notifier publishes.
pub struct Recorder {
    seen: Arc<Mutex<Vec<Cart>>>,
    _subscription: Subscription,
}

impl Recorder {
    /// Subscribe to a notifier.
    #[must_use]
    pub fn attach(notifier: &dyn ChangeNotifier) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = notifier.subscribe(Arc::new(move |cart: &Cart| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(cart.clone());
        }));
        Self {
            seen,
            _subscription: subscription,
        }
    }

    /// Snapshots received so far, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Cart> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn last(&self) -> Option<Cart> {
        self.snapshots().pop()
    }

    /// Number of snapshots received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
