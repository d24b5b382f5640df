//! Catalog product as returned by the remote API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ProductId;

/// A product as the catalog API returns it.
///
/// Only `id` is required. `price` stays a raw JSON value because the API
/// sends it as a decimal string while locally built products use numbers;
/// the cart coerces it when a line is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier (number or string).
    #[serde(default)]
    pub id: Value,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Unit price (number or numeric string).
    #[serde(default)]
    pub price: Value,
    /// Direct image path or URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Gallery images; the first one is used when `image` is absent.
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// One entry of a product's image gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image path or URL. The catalog API names this field `images`.
    #[serde(default, alias = "images")]
    pub image: Option<String>,
}

impl Product {
    /// Create a product with only an id.
    #[must_use]
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the unit price.
    #[must_use]
    pub fn with_price(mut self, price: impl Into<Value>) -> Self {
        self.price = price.into();
        self
    }

    /// Set the direct image path.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Append a gallery image path.
    #[must_use]
    pub fn with_gallery_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(ProductImage {
            image: Some(image.into()),
        });
        self
    }

    /// Returns the normalized product id.
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        ProductId::from(&self.id)
    }

    /// Returns the image path to show for this product, if any.
    ///
    /// Prefers a non-empty direct `image`, then the first gallery entry.
    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image
            .as_deref()
            .filter(|path| !path.is_empty())
            .or_else(|| {
                self.images
                    .first()
                    .and_then(|img| img.image.as_deref())
                    .filter(|path| !path.is_empty())
            })
    }
}
