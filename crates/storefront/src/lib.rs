//! Khoojlo Storefront library.
//!
//! The client-side half of the storefront: the cart store and everything
//! that surrounds it.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart snapshot. It is total: no operation
//!   returns an error, failures are logged and absorbed.
//! - [`storage`] provides the key-value backends the store persists into.
//! - [`notify`] provides the change notifiers the store broadcasts through.
//! - [`api`] and [`checkout`] talk to the remote catalog and order API; the
//!   store never calls them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod notify;
pub mod storage;
pub mod store;

pub use store::{CartStore, CartStoreBuilder, DEFAULT_CART_KEY};
