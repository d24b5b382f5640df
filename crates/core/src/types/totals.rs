//! Cart totals and shipping policies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::ProductId;

/// Errors that can occur when computing cart totals.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TotalsError {
    /// A line's price or price times quantity has no decimal representation.
    #[error("line total for product {id} is out of range")]
    LineOutOfRange {
        /// Product whose line overflowed.
        id: ProductId,
    },
    /// The sum of the line totals and shipping is out of range.
    #[error("cart total is out of range")]
    TotalOutOfRange,
}

/// How shipping is charged on top of the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShippingPolicy {
    /// A fixed fee for any non-empty cart; empty carts ship free.
    Flat {
        /// Fee charged per order.
        fee: Decimal,
    },
    /// A fixed fee unless the subtotal exceeds a threshold.
    FreeOver {
        /// Subtotal above which shipping is free.
        threshold: Decimal,
        /// Fee charged at or below the threshold.
        fee: Decimal,
    },
}

impl ShippingPolicy {
    /// Policy shown on the cart page: 9.99 per order.
    #[must_use]
    pub fn cart_page() -> Self {
        Self::Flat {
            fee: Decimal::new(999, 2),
        }
    }

    /// Policy charged at checkout: free over 500, otherwise 99.
    #[must_use]
    pub fn checkout() -> Self {
        Self::FreeOver {
            threshold: Decimal::from(500),
            fee: Decimal::from(99),
        }
    }

    /// Shipping charged for a cart with the given subtotal.
    #[must_use]
    pub fn shipping_for(&self, cart: &Cart, subtotal: Decimal) -> Decimal {
        match *self {
            Self::Flat { fee } => {
                if cart.is_empty() {
                    Decimal::ZERO
                } else {
                    fee
                }
            }
            Self::FreeOver { threshold, fee } => {
                if subtotal > threshold {
                    Decimal::ZERO
                } else {
                    fee
                }
            }
        }
    }
}

/// Subtotal, shipping and total of a cart, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Shipping charge.
    pub shipping: Decimal,
    /// Subtotal plus shipping.
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals for a cart under a shipping policy.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total or the grand total is beyond the
    /// range of [`Decimal`].
    pub fn compute(cart: &Cart, policy: &ShippingPolicy) -> Result<Self, TotalsError> {
        let subtotal = cart.subtotal()?.round_dp(2);
        let shipping = policy.shipping_for(cart, subtotal).round_dp(2);
        let total = subtotal
            .checked_add(shipping)
            .ok_or(TotalsError::TotalOutOfRange)?;
        Ok(Self {
            subtotal,
            shipping,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cart(price: f64, quantity: u32) -> Cart {
        Cart::from_values(&[json!({"id": 1, "price": price, "quantity": quantity})])
    }

    #[test]
    fn test_cart_page_flat_fee() {
        let totals = CartTotals::compute(&cart(50.0, 2), &ShippingPolicy::cart_page()).unwrap();
        assert_eq!(totals.subtotal, Decimal::from(100));
        assert_eq!(totals.shipping, Decimal::new(999, 2));
        assert_eq!(totals.total, Decimal::new(10999, 2));
    }

    #[test]
    fn test_cart_page_empty_cart_ships_free() {
        let totals = CartTotals::compute(&Cart::new(), &ShippingPolicy::cart_page()).unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_checkout_free_over_threshold() {
        let totals = CartTotals::compute(&cart(250.5, 2), &ShippingPolicy::checkout()).unwrap();
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(501));
    }

    #[test]
    fn test_checkout_threshold_is_exclusive() {
        let totals = CartTotals::compute(&cart(250.0, 2), &ShippingPolicy::checkout()).unwrap();
        assert_eq!(totals.shipping, Decimal::from(99));
        assert_eq!(totals.total, Decimal::from(599));
    }

    #[test]
    fn test_huge_price_is_reported_not_panicking() {
        let cart = Cart::from_values(&[json!({"id": 1, "price": "1e29", "quantity": 2})]);
        assert_eq!(
            CartTotals::compute(&cart, &ShippingPolicy::checkout()),
            Err(TotalsError::LineOutOfRange { id: ProductId::from(1) })
        );
    }

    #[test]
    fn test_product_overflow_is_reported() {
        let cart = Cart::from_values(&[json!({"id": 9, "price": 5e28, "quantity": 2})]);
        assert_eq!(
            CartTotals::compute(&cart, &ShippingPolicy::cart_page()),
            Err(TotalsError::LineOutOfRange { id: ProductId::from(9) })
        );
    }

    #[test]
    fn test_sum_overflow_is_reported() {
        let cart = Cart::from_values(&[
            json!({"id": 1, "price": 5e28, "quantity": 1}),
            json!({"id": 2, "price": 5e28, "quantity": 1}),
        ]);
        assert_eq!(
            CartTotals::compute(&cart, &ShippingPolicy::checkout()),
            Err(TotalsError::TotalOutOfRange)
        );
    }
}
