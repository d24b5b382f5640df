//! Client for the storefront's REST API.
//!
//! # Endpoints
//!
//! - `GET  {base}/v2/products/details/{id}/` - one product, cached for 5 minutes
//! - `GET  {base}/v2/products/search/{query}/` - product search
//! - `POST {base}/v2/order/` - place an order
//!
//! The cart store never calls the API. Product lookups feed
//! [`crate::CartStore::add_line`], and checkout goes through the
//! [`OrderGateway`] seam so it can be exercised without a server.

mod client;

pub use client::ApiClient;

use std::future::Future;

use khoojlo_core::{OrderConfirmation, OrderRequest};
use thiserror::Error;

/// Maximum number of characters of a response body kept in errors.
pub(crate) const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Something that accepts orders.
///
/// Implemented by [`ApiClient`]; tests substitute their own.
pub trait OrderGateway: Send + Sync {
    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was not accepted.
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ApiError::Status {
            status: 400,
            body: "{\"phone\":[\"required\"]}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status 400: {\"phone\":[\"required\"]}"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ApiError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ApiError::Status { status: 404, body: String::new() }.is_retryable());
        assert!(!ApiError::InvalidUrl("x".to_string()).is_retryable());
    }
}
