//! Numeric coercion for loosely-typed inputs.
//!
//! Prices and quantities reach the cart as JSON numbers, numeric strings,
//! booleans or `null` depending on which page or API response produced them.
//! [`NumberLike`] turns all of those into a single `f64` reading.

use serde_json::Value;

/// A value that can be read as a number.
///
/// Returns `None` when the input has no numeric reading or when the reading
/// is not finite. Callers pick their own default for `None`.
///
/// ## Rules
///
/// - JSON numbers and Rust numeric types are taken as-is
/// - Strings are trimmed and parsed as decimal floats; an empty string is `0`
/// - Booleans are `1` and `0`
/// - `null` is `0`
/// - Arrays and objects have no reading
///
/// ## Examples
///
/// ```
/// use khoojlo_core::NumberLike;
/// use serde_json::json;
///
/// assert_eq!("19.99".to_number(), Some(19.99));
/// assert_eq!(json!(" 2 ").to_number(), Some(2.0));
/// assert_eq!(json!(null).to_number(), Some(0.0));
/// assert_eq!("abc".to_number(), None);
/// assert_eq!(json!([1]).to_number(), None);
/// ```
pub trait NumberLike {
    /// Read the value as a finite number.
    fn to_number(&self) -> Option<f64>;
}

impl NumberLike for Value {
    fn to_number(&self) -> Option<f64> {
        match self {
            Self::Null => Some(0.0),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => n.as_f64().filter(|f| f.is_finite()),
            Self::String(s) => s.as_str().to_number(),
            Self::Array(_) | Self::Object(_) => None,
        }
    }
}

impl NumberLike for str {
    fn to_number(&self) -> Option<f64> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}

impl NumberLike for String {
    fn to_number(&self) -> Option<f64> {
        self.as_str().to_number()
    }
}

impl NumberLike for f64 {
    fn to_number(&self) -> Option<f64> {
        Some(*self).filter(|f| f.is_finite())
    }
}

impl NumberLike for f32 {
    fn to_number(&self) -> Option<f64> {
        f64::from(*self).to_number()
    }
}

impl NumberLike for i32 {
    fn to_number(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl NumberLike for u32 {
    fn to_number(&self) -> Option<f64> {
        Some(f64::from(*self))
    }
}

impl NumberLike for i64 {
    #[allow(clippy::cast_precision_loss)] // Quantities and prices never approach 2^53
    fn to_number(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl NumberLike for u64 {
    #[allow(clippy::cast_precision_loss)] // Quantities and prices never approach 2^53
    fn to_number(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl<T: NumberLike> NumberLike for Option<T> {
    fn to_number(&self) -> Option<f64> {
        self.as_ref().map_or(Some(0.0), NumberLike::to_number)
    }
}

impl<T: NumberLike + ?Sized> NumberLike for &T {
    fn to_number(&self) -> Option<f64> {
        (**self).to_number()
    }
}
