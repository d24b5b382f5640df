//! Command implementations.
//!
//! Every command writes its result to the given writer (stdout in the
//! binary) and logs through `tracing` (stderr).

pub mod cart;
pub mod checkout;
pub mod product;

use std::sync::Arc;

use khoojlo_core::{Cart, Price, TotalsError};
use khoojlo_storefront::api::{ApiClient, ApiError};
use khoojlo_storefront::checkout::CheckoutError;
use khoojlo_storefront::config::{ConfigError, StorefrontConfig};
use khoojlo_storefront::notify::{ChangeNotifier, EventBus, Subscription};
use khoojlo_storefront::storage::{FileStorage, StorageError};
use khoojlo_storefront::CartStore;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Totals error: {0}")]
    Totals(#[from] TotalsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether running the same command again may succeed.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) | Self::Checkout(CheckoutError::Api(e)) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Everything a cart command needs: configuration and an opened store.
pub struct Context {
    pub config: StorefrontConfig,
    pub store: CartStore,
    _changes: Subscription,
}

impl Context {
    /// Load configuration from the environment and open the cart.
    pub fn open() -> Result<Self, CliError> {
        Self::with_config(StorefrontConfig::from_env()?)
    }

    /// Open the cart described by `config`.
    pub fn with_config(config: StorefrontConfig) -> Result<Self, CliError> {
        let storage = FileStorage::open(&config.cart_dir)?;

        let bus = Arc::new(EventBus::new());
        let changes = bus.subscribe(Arc::new(|cart: &Cart| {
            info!(lines = cart.len(), units = cart.count(), "Cart updated");
        }));

        let store = CartStore::builder(Arc::new(storage), config.media_base.clone())
            .key(config.cart_key.clone())
            .notifier(bus)
            .build();

        Ok(Self {
            config,
            store,
            _changes: changes,
        })
    }

    /// Client for the catalog and order API.
    pub fn api(&self) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(&self.config.api)?)
    }
}

/// Format an amount the way the storefront shows prices.
pub fn format_price(amount: Decimal) -> String {
    let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    format!("Rs{amount}")
}

/// Format a unit price, or a dash when it has no decimal value.
pub fn format_unit_price(price: Price) -> String {
    price.to_decimal().map_or_else(|| "-".to_string(), format_price)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    use khoojlo_core::MediaBase;
    use khoojlo_storefront::config::ApiConfig;
    use tempfile::TempDir;

    /// Configuration with its cart directory inside a fresh temp dir.
    fn temp_config() -> (TempDir, StorefrontConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            api: ApiConfig::new("http://127.0.0.1:9/api".parse().unwrap()),
            media_base: MediaBase::parse("https://media.example.com").unwrap(),
            cart_dir: dir.path().join("cart"),
            cart_key: "react_cart".to_string(),
        };
        (dir, config)
    }

    /// A context over a fresh temp dir, removed when the guard drops.
    pub(crate) fn temp_context() -> (TempDir, Context) {
        let (dir, config) = temp_config();
        (dir, Context::with_config(config).unwrap())
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(3998, 2)), "Rs39.98");
        assert_eq!(format_price(Decimal::from(99)), "Rs99.00");
        assert_eq!(format_price(Decimal::new(12345, 3)), "Rs12.35");
    }

    #[test]
    fn test_format_unit_price_out_of_range() {
        assert_eq!(format_unit_price(Price::coerce("1e29")), "-");
        assert_eq!(format_unit_price(Price::coerce("19.99")), "Rs19.99");
    }

    #[test]
    fn test_context_creates_cart_dir() {
        let (_dir, ctx) = temp_context();
        assert!(ctx.config.cart_dir.is_dir());
        assert_eq!(ctx.store.key(), "react_cart");
    }

    #[test]
    fn test_only_transient_api_failures_are_retryable() {
        assert!(CliError::Api(ApiError::Timeout).is_retryable());
        assert!(
            CliError::Checkout(CheckoutError::Api(ApiError::Status {
                status: 503,
                body: String::new(),
            }))
            .is_retryable()
        );
        assert!(
            !CliError::Checkout(CheckoutError::Api(ApiError::Status {
                status: 400,
                body: String::new(),
            }))
            .is_retryable()
        );
        assert!(!CliError::Checkout(CheckoutError::EmptyCart).is_retryable());
        assert!(!CliError::Totals(TotalsError::TotalOutOfRange).is_retryable());
    }
}
