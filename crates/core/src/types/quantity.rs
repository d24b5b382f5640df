//! Line quantities.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::coerce::NumberLike;

/// Number of units of one product in the cart.
///
/// Quantities are whole, non-negative numbers. A zero quantity never appears
/// in a persisted cart; it marks a line for removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Zero units.
    pub const ZERO: Self = Self(0);

    /// One unit.
    pub const ONE: Self = Self(1);

    /// Ceiling applied when adding units to a line.
    pub const MAX_PER_LINE: Self = Self(999);

    /// Create a quantity.
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    /// Coerce any number-like input into a quantity.
    ///
    /// Invalid and non-positive inputs become zero, fractions truncate toward
    /// zero and values beyond `u32::MAX` saturate.
    #[must_use]
    pub fn coerce(input: impl NumberLike) -> Self {
        input.to_number().map_or(Self::ZERO, Self::from_f64)
    }

    /// Coerce an amount to add to a line.
    ///
    /// Anything that does not read as at least one unit means one unit.
    #[must_use]
    pub fn coerce_increment(input: impl NumberLike) -> Self {
        let units = Self::coerce(input);
        if units.is_zero() { Self::ONE } else { units }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // `as` saturates, negatives are filtered first
    fn from_f64(units: f64) -> Self {
        if units.is_finite() && units > 0.0 {
            Self(units.trunc() as u32)
        } else {
            Self::ZERO
        }
    }

    /// Returns the number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` for zero units.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add units, capping the result at [`Self::MAX_PER_LINE`].
    #[must_use]
    pub fn add_capped(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0)).min(Self::MAX_PER_LINE)
    }

}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::coerce(&value))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Quantity {
    fn from(units: u32) -> Self {
        Self(units)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce() {
        assert_eq!(Quantity::coerce("2"), Quantity::new(2));
        assert_eq!(Quantity::coerce(json!(3)), Quantity::new(3));
        assert_eq!(Quantity::coerce(2.9), Quantity::new(2));
    }

    #[test]
    fn test_coerce_invalid_and_negative() {
        assert_eq!(Quantity::coerce("many"), Quantity::ZERO);
        assert_eq!(Quantity::coerce(-5), Quantity::ZERO);
        assert_eq!(Quantity::coerce(json!(null)), Quantity::ZERO);
    }

    #[test]
    fn test_coerce_saturates() {
        assert_eq!(Quantity::coerce(1e20), Quantity::new(u32::MAX));
    }

    #[test]
    fn test_coerce_increment_defaults_to_one() {
        assert_eq!(Quantity::coerce_increment(0), Quantity::ONE);
        assert_eq!(Quantity::coerce_increment("x"), Quantity::ONE);
        assert_eq!(Quantity::coerce_increment(-4), Quantity::ONE);
        assert_eq!(Quantity::coerce_increment(3), Quantity::new(3));
    }

    #[test]
    fn test_deserialize_coerces() {
        let quantity: Option<Quantity> = serde_json::from_str("\"2.7\"").ok();
        assert_eq!(quantity, Some(Quantity::new(2)));
        let quantity: Option<Quantity> = serde_json::from_str("-1").ok();
        assert_eq!(quantity, Some(Quantity::ZERO));
    }

    #[test]
    fn test_add_capped() {
        assert_eq!(
            Quantity::new(998).add_capped(Quantity::new(5)),
            Quantity::MAX_PER_LINE
        );
        assert_eq!(Quantity::new(2).add_capped(Quantity::new(3)), Quantity::new(5));
        assert_eq!(
            Quantity::new(u32::MAX).add_capped(Quantity::ONE),
            Quantity::MAX_PER_LINE
        );
    }
}
