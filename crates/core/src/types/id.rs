//! Identifier types.
//!
//! Product ids arrive from the catalog API as numbers and from persisted
//! carts as strings. [`ProductId`] always holds the string form so that
//! `7` and `"7"` compare equal.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A product identifier, normalized to its string form.
///
/// ## Normalization
///
/// - Strings are kept as-is
/// - Integers use their decimal form
/// - Floats without a fraction drop it (`7.0` becomes `"7"`)
/// - Other floats use their shortest form
/// - Booleans become `"true"` / `"false"`
/// - `null` becomes `""`
/// - Arrays and objects use their compact JSON text
///
/// ## Examples
///
/// ```
/// use khoojlo_core::ProductId;
/// use serde_json::json;
///
/// assert_eq!(ProductId::from(7), ProductId::from("7"));
/// assert_eq!(ProductId::from(&json!(7.0)).as_str(), "7");
/// assert_eq!(ProductId::from(&json!(null)).as_str(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns `true` if the id is the empty string.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Format a JSON number the way ids are compared.
fn number_to_id(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64().map_or_else(String::new, float_to_id)
}

/// Format a float without a trailing `.0` when it is integral.
fn float_to_id(f: f64) -> String {
    if f == 0.0 {
        // Covers -0.0 as well
        return "0".to_string();
    }
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

impl From<&Value> for ProductId {
    fn from(value: &Value) -> Self {
        Self(match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_id(n),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        })
    }
}

impl From<Value> for ProductId {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self(s),
            other => Self::from(&other),
        }
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for ProductId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&Self> for ProductId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<f64> for ProductId {
    fn from(id: f64) -> Self {
        Self(float_to_id(id))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of an order accepted by the remote order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Create a new order id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_strings_compare_equal() {
        assert_eq!(ProductId::from(7), ProductId::from("7"));
        assert_eq!(ProductId::from(&json!(7)), ProductId::from(&json!("7")));
        assert_eq!(ProductId::from(7_u64), ProductId::from(7_i64));
    }

    #[test]
    fn test_integral_float_drops_fraction() {
        assert_eq!(ProductId::from(&json!(7.0)).as_str(), "7");
        assert_eq!(ProductId::from(-0.0).as_str(), "0");
    }

    #[test]
    fn test_fractional_float() {
        assert_eq!(ProductId::from(&json!(1.5)).as_str(), "1.5");
    }

    #[test]
    fn test_null_is_empty() {
        let id = ProductId::from(&Value::Null);
        assert!(id.is_empty());
    }

    #[test]
    fn test_bool_and_containers() {
        assert_eq!(ProductId::from(&json!(true)).as_str(), "true");
        assert_eq!(ProductId::from(&json!([1, 2])).as_str(), "[1,2]");
    }

    #[test]
    fn test_display() {
        let id = ProductId::from("abc-1");
        assert_eq!(format!("{id}"), "abc-1");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&ProductId::from(42)).unwrap();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn test_order_id_serde() {
        let id: OrderId = serde_json::from_str("981").unwrap();
        assert_eq!(id.as_i64(), 981);
        assert_eq!(id.to_string(), "981");
    }
}
