//! Core types for Khoojlo.
//!
//! This module provides strongly-typed wrappers for the loosely-typed values
//! that arrive from the catalog API and from persisted cart blobs.

pub mod cart;
pub mod coerce;
pub mod id;
pub mod media;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod totals;

pub use cart::{Cart, CartDecodeError, CartLine};
pub use coerce::NumberLike;
pub use id::{OrderId, ProductId};
pub use media::MediaBase;
pub use order::{
    OrderConfirmation, OrderItem, OrderRequest, PaymentMethod, ShippingDetails,
    ShippingDetailsError,
};
pub use price::Price;
pub use product::{Product, ProductImage};
pub use quantity::Quantity;
pub use totals::{CartTotals, ShippingPolicy, TotalsError};
