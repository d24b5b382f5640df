//! Cart lines and the cart snapshot.
//!
//! # Normalization
//!
//! Every cart that enters or leaves storage passes through the same
//! normalization, so a blob read straight after a write yields the values
//! that were written:
//!
//! - each line's fields are coerced (see [`CartLine::from_value`])
//! - lines with a zero quantity are dropped
//! - lines sharing an id are merged into the first occurrence, summing
//!   quantities up to [`Quantity::MAX_PER_LINE`]
//!
//! Deserializing a [`Cart`] or [`CartLine`] with serde applies the same rules.
//!
//! # Invariants
//!
//! 1. At most one line per product id.
//! 2. Every line has a quantity of at least one.
//! 3. Line order is insertion order; only removal changes it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::id::ProductId;
use super::media::MediaBase;
use super::price::Price;
use super::product::Product;
use super::quantity::Quantity;
use super::totals::TotalsError;

/// Errors that can occur when decoding a persisted cart blob.
#[derive(thiserror::Error, Debug)]
pub enum CartDecodeError {
    /// The blob is not valid JSON.
    #[error("cart blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The blob is valid JSON but not an array.
    #[error("cart blob must be a JSON array, found {found}")]
    NotAnArray {
        /// JSON type that was found instead.
        found: &'static str,
    },
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Number of units.
    pub quantity: Quantity,
    /// Absolute or relative thumbnail URL, empty if unavailable.
    pub image: String,
}

impl CartLine {
    /// Normalize a line-like JSON value.
    ///
    /// Missing or malformed fields fall back to their defaults: empty strings
    /// for `id`, `name` and `image`, zero for `price` and `quantity`. A value
    /// that is not an object yields an all-default line.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).unwrap_or(&Value::Null);

        Self {
            id: ProductId::from(field("id")),
            name: text(field("name")),
            price: Price::coerce(field("price")),
            quantity: Quantity::coerce(field("quantity")),
            image: text(field("image")),
        }
    }

    /// Build a new line from a catalog product.
    ///
    /// The image is taken from [`Product::image_path`] and qualified with the
    /// media base when it is relative.
    #[must_use]
    pub fn from_product(product: &Product, quantity: Quantity, media: &MediaBase) -> Self {
        Self {
            id: product.product_id(),
            name: product.name.clone().unwrap_or_default(),
            price: Price::coerce(&product.price),
            quantity,
            image: product
                .image_path()
                .map(|path| media.resolve(path))
                .unwrap_or_default(),
        }
    }

    /// Line total as a decimal (`price * quantity`).
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::LineOutOfRange`] if the price or the product
    /// does not fit in a [`Decimal`].
    pub fn line_total(&self) -> Result<Decimal, TotalsError> {
        self.price
            .to_decimal()
            .and_then(|price| price.checked_mul(Decimal::from(self.quantity.get())))
            .ok_or_else(|| TotalsError::LineOutOfRange {
                id: self.id.clone(),
            })
    }
}

impl<'de> Deserialize<'de> for CartLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// Read a text field. Numbers and booleans keep their text; anything else is empty.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => ProductId::from(value).into_inner(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// An ordered, normalized cart snapshot.
///
/// Serializes as a bare JSON array of lines, which is the persisted layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from typed lines, enforcing the cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut normalized: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity.is_zero() {
                continue;
            }
            match normalized.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => existing.quantity = existing.quantity.add_capped(line.quantity),
                None => normalized.push(line),
            }
        }
        Self { lines: normalized }
    }

    /// Build a cart from line-like JSON values.
    #[must_use]
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        Self::from_lines(values.into_iter().map(CartLine::from_value))
    }

    /// Decode a persisted cart blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not JSON or not a JSON array.
    pub fn from_json(raw: &str) -> Result<Self, CartDecodeError> {
        let value: Value = serde_json::from_str(raw)?;
        match &value {
            Value::Array(items) => Ok(Self::from_values(items)),
            other => Err(CartDecodeError::NotAnArray {
                found: json_type(other),
            }),
        }
    }

    /// Encode the cart as its persisted JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Returns the lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consumes the cart and returns its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Returns the line for a product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Returns the number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of all line totals.
    ///
    /// # Errors
    ///
    /// Returns an error if any line total or the sum is out of range.
    pub fn subtotal(&self) -> Result<Decimal, TotalsError> {
        self.lines.iter().try_fold(Decimal::ZERO, |sum, line| {
            sum.checked_add(line.line_total()?)
                .ok_or(TotalsError::TotalOutOfRange)
        })
    }

    /// Add units of a product.
    ///
    /// An existing line only has its quantity raised (capped at
    /// [`Quantity::MAX_PER_LINE`]); its name, price and image are kept.
    /// Otherwise a new line is appended.
    pub fn add_product(&mut self, product: &Product, quantity: Quantity, media: &MediaBase) {
        let id = product.product_id();
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => line.quantity = line.quantity.add_capped(quantity),
            None => {
                let quantity = Quantity::ZERO.add_capped(quantity);
                self.lines
                    .push(CartLine::from_product(product, quantity, media));
            }
        }
    }

    /// Remove the line for a product id. Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.id != id);
        self.lines.len() != before
    }

    /// Set the exact quantity of a line.
    ///
    /// A zero quantity removes the line. Unlike [`Self::add_product`] no
    /// ceiling is applied. Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) {
        if quantity.is_zero() {
            self.remove(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Value>::deserialize(deserializer).map(|values| Self::from_values(&values))
    }
}

impl IntoIterator for Cart {
    type Item = CartLine;
    type IntoIter = std::vec::IntoIter<CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
