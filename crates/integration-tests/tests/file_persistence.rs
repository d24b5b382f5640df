//! Integration tests for file-backed carts and checkout across restarts.

#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::sync::{Arc, Mutex};

use khoojlo_core::{
    OrderConfirmation, OrderId, OrderRequest, PaymentMethod, Product, ShippingDetails,
};
use khoojlo_integration_tests::media_base;
use khoojlo_storefront::api::{ApiError, OrderGateway};
use khoojlo_storefront::checkout::{CheckoutError, checkout};
use khoojlo_storefront::storage::FileStorage;
use khoojlo_storefront::{CartStore, DEFAULT_CART_KEY};
use rust_decimal::Decimal;
use tempfile::TempDir;

fn open(dir: &TempDir) -> CartStore {
    let storage = FileStorage::open(dir.path()).unwrap();
    CartStore::builder(Arc::new(storage), media_base()).build()
}

/// Order gateway that accepts orders after a configurable number of failures.
struct FlakyGateway {
    failures_left: Mutex<u32>,
    accepted: Mutex<Vec<OrderRequest>>,
}

impl FlakyGateway {
    fn new(failures: u32) -> Self {
        Self {
            failures_left: Mutex::new(failures),
            accepted: Mutex::new(Vec::new()),
        }
    }
}

impl OrderGateway for FlakyGateway {
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send {
        let result = {
            let mut failures_left = self.failures_left.lock().unwrap();
            if *failures_left > 0 {
                *failures_left -= 1;
                Err(ApiError::Timeout)
            } else {
                let mut accepted = self.accepted.lock().unwrap();
                accepted.push(order.clone());
                Ok(OrderConfirmation {
                    id: OrderId::new(1000 + i64::try_from(accepted.len()).unwrap()),
                })
            }
        };
        async move { result }
    }
}

fn details() -> ShippingDetails {
    ShippingDetails {
        first_name: "Asha".to_string(),
        last_name: "Rai".to_string(),
        email: "asha@example.com".to_string(),
        address: "12 Lake Road".to_string(),
        city: "Pokhara".to_string(),
        zip: "33700".to_string(),
        phone: "9800000000".to_string(),
        payment_method: PaymentMethod::CashOnDelivery,
    }
}

#[test]
fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(&dir);
        store.add_line(&Product::new(7).with_name("Lamp").with_price("19.99"), 2);
    }

    let store = open(&dir);
    let cart = store.read();
    assert_eq!(cart.count(), 2);
    assert_eq!(cart.lines()[0].name, "Lamp");
}

#[test]
fn test_blob_file_uses_persisted_layout() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    store.add_line(&Product::new(7).with_price(5), 1);

    let raw = std::fs::read_to_string(dir.path().join(format!("{DEFAULT_CART_KEY}.json"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{"id": "7", "name": "", "price": 5.0, "quantity": 1, "image": ""}])
    );
}

#[test]
fn test_corrupt_file_reads_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    std::fs::write(dir.path().join(format!("{DEFAULT_CART_KEY}.json")), "{broken").unwrap();

    assert!(store.read().is_empty());

    store.add_line(&Product::new(1), 1);
    assert_eq!(open(&dir).count(), 1);
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = FlakyGateway::new(1);
    {
        let store = open(&dir);
        store.add_line(&Product::new(7).with_price("19.99"), 2);

        let err = checkout(&store, &gateway, &details()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Api(ApiError::Timeout)));
    }

    let store = open(&dir);
    assert_eq!(store.count(), 2);

    let receipt = checkout(&store, &gateway, &details()).await.unwrap();
    assert_eq!(receipt.order_id, OrderId::new(1001));
    assert_eq!(receipt.totals.total, Decimal::new(13898, 2));
    assert_eq!(open(&dir).count(), 0);

    let accepted = gateway.accepted.lock().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].items.len(), 1);
    assert_eq!(accepted[0].email, "asha@example.com");
}
