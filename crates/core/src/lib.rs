//! Khoojlo Core - Shared cart types library.
//!
//! This crate provides the types used across all Khoojlo components:
//! - `storefront` - Cart store, storage backends, API client and checkout
//! - `cli` - Command-line front end driving the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. Every coercion rule the cart relies on
//! lives here so that the read and write paths share one implementation.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, quantities, cart lines, orders, totals
//! - [`slug`] - Product URL slugs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod slug;
pub mod types;

pub use types::*;
