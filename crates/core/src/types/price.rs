//! Unit price of a cart line.
//!
//! Prices are stored as plain JSON numbers in the persisted cart, so the
//! stored representation is an `f64`. Arithmetic over prices (subtotals,
//! order totals) goes through [`Price::to_decimal`] to avoid float drift.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::coerce::NumberLike;

/// A non-negative, finite unit price.
///
/// ## Examples
///
/// ```
/// use khoojlo_core::Price;
///
/// assert_eq!(Price::coerce("19.99").amount(), 19.99);
/// assert_eq!(Price::coerce("free").amount(), 0.0);
/// assert_eq!(Price::coerce(-5).amount(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0.0);

    /// Coerce any number-like input into a price.
    ///
    /// Invalid, non-finite and negative inputs become zero.
    #[must_use]
    pub fn coerce(input: impl NumberLike) -> Self {
        input
            .to_number()
            .filter(|amount| *amount > 0.0)
            .map_or(Self::ZERO, Self)
    }

    /// Returns the price as an `f64`.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }

    /// Returns the price as a decimal.
    ///
    /// Uses the shortest decimal text of the float, so `19.99` converts to
    /// exactly `19.99` rather than its binary approximation. Returns `None`
    /// for amounts beyond the range of [`Decimal`].
    #[must_use]
    pub fn to_decimal(self) -> Option<Decimal> {
        Decimal::from_str(&self.0.to_string())
            .ok()
            .or_else(|| Decimal::from_f64_retain(self.0))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::coerce(&value))
    }
}
