//! Checkout form and order payload types.
//!
//! Field names of [`OrderRequest`] are fixed by the remote order API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::{OrderId, ProductId};
use super::price::Price;
use super::quantity::Quantity;
use super::totals::CartTotals;

/// Errors raised when validating [`ShippingDetails`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShippingDetailsError {
    /// A required field is blank.
    #[error("please fill in the {0} field")]
    MissingField(&'static str),
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    #[default]
    CashOnDelivery,
    /// Pay by card.
    Card,
}

/// Shipping form filled in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    /// Optional contact email.
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

impl ShippingDetails {
    /// Check that the fields needed to ship are present.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingDetailsError::MissingField`] naming the first blank
    /// field among `address`, `city` and `phone`.
    pub fn validate(&self) -> Result<(), ShippingDetailsError> {
        for (name, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(ShippingDetailsError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: Quantity,
    pub price: Price,
}

/// Order payload posted to the order API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub total_amount: Decimal,
    pub cash_on_delivery: bool,
    pub items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Build the payload for a cart and its totals.
    #[must_use]
    pub fn new(details: &ShippingDetails, cart: &Cart, totals: &CartTotals) -> Self {
        Self {
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            address: details.address.clone(),
            city: details.city.clone(),
            zip_code: details.zip.clone(),
            total_amount: totals.total,
            cash_on_delivery: details.payment_method == PaymentMethod::CashOnDelivery,
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product: line.id.clone(),
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
        }
    }
}

/// Response of the order API for an accepted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: OrderId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::totals::ShippingPolicy;
    use serde_json::json;

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

    #[test]
    fn test_validate_ok() {
        assert!(details().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let mut form = details();
        form.city = "  ".to_string();
        form.phone = String::new();
        assert_eq!(
            form.validate(),
            Err(ShippingDetailsError::MissingField("city"))
        );
    }

    #[test]
    fn test_order_request_payload_shape() {
        let cart = Cart::from_values(&[json!({"id": 4, "price": 100, "quantity": 2})]);
        let totals = CartTotals::compute(&cart, &ShippingPolicy::checkout()).unwrap();
        let order = OrderRequest::new(&details(), &cart, &totals);

        let payload = serde_json::to_value(&order).unwrap();
        assert_eq!(payload["zip_code"], json!("33700"));
        assert_eq!(payload["cash_on_delivery"], json!(true));
        assert_eq!(payload["total_amount"], json!("299"));
        assert_eq!(
            payload["items"],
            json!([{"product": "4", "quantity": 2, "price": 100.0}])
        );
    }

    #[test]
    fn test_card_payment_is_not_cod() {
        let mut form = details();
        form.payment_method = PaymentMethod::Card;
        let cart = Cart::new();
        let totals = CartTotals::compute(&cart, &ShippingPolicy::checkout()).unwrap();
        let order = OrderRequest::new(&form, &cart, &totals);
        assert!(!order.cash_on_delivery);
    }
}
