//! Checkout: turn the persisted cart into a placed order.

use chrono::{DateTime, Utc};
use khoojlo_core::{
    CartLine, CartTotals, OrderId, OrderRequest, ShippingDetails, ShippingDetailsError,
    ShippingPolicy, TotalsError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, OrderGateway};
use crate::store::CartStore;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid shipping details: {0}")]
    Invalid(#[from] ShippingDetailsError),
    #[error("Cannot total the cart: {0}")]
    Totals(#[from] TotalsError),
    #[error("Failed to place order: {0}")]
    Api(#[from] ApiError),
}

/// Record of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    /// Lines that were ordered.
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub placed_at: DateTime<Utc>,
}

/// Place an order for everything in the cart.
///
/// The cart is cleared only once the gateway accepts the order; on any error
/// it is left as it was.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart,
/// [`CheckoutError::Invalid`] if a required shipping field is blank,
/// [`CheckoutError::Totals`] if the cart total is out of range, and
/// [`CheckoutError::Api`] if the order is rejected.
#[instrument(skip_all, fields(payment = ?details.payment_method))]
pub async fn checkout<G: OrderGateway>(
    store: &CartStore,
    gateway: &G,
    details: &ShippingDetails,
) -> Result<OrderReceipt, CheckoutError> {
    let cart = store.read();
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    details.validate()?;

    let totals = CartTotals::compute(&cart, &ShippingPolicy::checkout())?;
    let request = OrderRequest::new(details, &cart, &totals);

    let confirmation = gateway.place_order(&request).await.map_err(|e| {
        warn!(
            error = %e,
            status = ?e.status(),
            retryable = e.is_retryable(),
            lines = cart.len(),
            "Order was not placed; cart kept"
        );
        e
    })?;

    store.clear();
    info!(order_id = %confirmation.id, total = %totals.total, "Order placed");

    Ok(OrderReceipt {
        order_id: confirmation.id,
        lines: cart.into_lines(),
        totals,
        placed_at: Utc::now(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use khoojlo_core::{MediaBase, OrderConfirmation, PaymentMethod, Product};
    use rust_decimal::Decimal;

    use crate::storage::MemoryStorage;

    /// Gateway that records orders and answers with a fixed result.
    struct FakeGateway {
        accept: bool,
        received: Mutex<Vec<OrderRequest>>,
    }

    impl FakeGateway {
        fn accepting() -> Self {
            Self {
                accept: true,
                received: Mutex::new(Vec::new()),
            }
        }

        fn rejecting() -> Self {
            Self {
                accept: false,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderGateway for FakeGateway {
        fn place_order(
            &self,
            order: &OrderRequest,
        ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send {
            self.received.lock().unwrap().push(order.clone());
            let result = if self.accept {
                Ok(OrderConfirmation {
                    id: OrderId::new(42),
                })
            } else {
                Err(ApiError::Status {
                    status: 400,
                    body: "rejected".to_string(),
                })
            };
            async move { result }
        }
    }

    fn store() -> CartStore {
        CartStore::builder(
            Arc::new(MemoryStorage::new()),
            MediaBase::parse("https://media.example.com").unwrap(),
        )
        .build()
    }

    fn details() -> ShippingDetails {
        ShippingDetails {
            first_name: "Asha".to_string(),
            last_name: "Rai".to_string(),
            address: "12 Lake Road".to_string(),
            city: "Pokhara".to_string(),
            zip: "33700".to_string(),
            phone: "9800000000".to_string(),
            ..ShippingDetails::default()
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let gateway = FakeGateway::accepting();
        let err = checkout(&store(), &gateway, &details()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(gateway.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected() {
        let store = store();
        store.add_line(&Product::new(1).with_price(10), 1);
        let gateway = FakeGateway::accepting();
        let details = ShippingDetails {
            city: "  ".to_string(),
            ..details()
        };

        let err = checkout(&store, &gateway, &details).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Invalid(ShippingDetailsError::MissingField("city"))
        ));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_returns_receipt() {
        let store = store();
        store.add_line(&Product::new(7).with_name("Lamp").with_price("19.99"), 2);
        let gateway = FakeGateway::accepting();

        let receipt = checkout(&store, &gateway, &details()).await.unwrap();

        assert_eq!(receipt.order_id, OrderId::new(42));
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.totals.subtotal, Decimal::new(3998, 2));
        assert_eq!(receipt.totals.shipping, Decimal::from(99));
        assert_eq!(receipt.totals.total, Decimal::new(13898, 2));
        assert_eq!(store.count(), 0);

        let sent = gateway.received.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].total_amount, Decimal::new(13898, 2));
        assert!(sent[0].cash_on_delivery);
        assert_eq!(sent[0].items[0].product.as_str(), "7");
    }

    #[tokio::test]
    async fn test_free_shipping_over_threshold() {
        let store = store();
        store.add_line(&Product::new(1).with_price(600), 1);
        let gateway = FakeGateway::accepting();
        let details = ShippingDetails {
            payment_method: PaymentMethod::Card,
            ..details()
        };

        let receipt = checkout(&store, &gateway, &details).await.unwrap();
        assert_eq!(receipt.totals.shipping, Decimal::ZERO);
        assert!(!gateway.received.lock().unwrap()[0].cash_on_delivery);
    }

    #[tokio::test]
    async fn test_out_of_range_total_is_rejected_before_submit() {
        let store = store();
        store.add_line(&Product::new(1).with_price("1e29"), 2);
        let gateway = FakeGateway::accepting();

        let err = checkout(&store, &gateway, &details()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Totals(TotalsError::LineOutOfRange { .. })
        ));
        assert!(gateway.received.lock().unwrap().is_empty());
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_order_keeps_cart() {
        let store = store();
        store.add_line(&Product::new(1).with_price(10), 3);
        let gateway = FakeGateway::rejecting();

        let err = checkout(&store, &gateway, &details()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Api(ApiError::Status { status: 400, .. })));
        assert_eq!(store.count(), 3);
    }
}
