//! Product URL slugs.

use crate::types::ProductId;

/// Build a URL slug from a product name.
///
/// Lowercases the name, turns spaces into `-` and drops every character
/// outside `[a-z0-9_-]`. An empty name gives `"product"`.
///
/// ```
/// use khoojlo_core::slug::create_slug;
///
/// assert_eq!(create_slug("Running Shoe (Blue)"), "running-shoe-blue");
/// assert_eq!(create_slug(""), "product");
/// ```
#[must_use]
pub fn create_slug(name: &str) -> String {
    if name.is_empty() {
        return "product".to_string();
    }
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Path of a product detail page: `/product/{slug}-{id}`.
#[must_use]
pub fn product_url(id: &ProductId, name: &str) -> String {
    format!("/product/{}-{id}", create_slug(name))
}
