//! REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP and caches product details with `moka`
//! (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use khoojlo_core::{OrderConfirmation, OrderRequest, Product, ProductId};
use moka::future::Cache;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use super::{ApiError, ERROR_BODY_LIMIT, OrderGateway};
use crate::config::ApiConfig;

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and the product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                token: config
                    .token
                    .clone()
                    .filter(|token| !token.expose_secret().is_empty()),
                products,
            }),
        })
    }

    /// API root every relative path is joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build an absolute URL for an API path.
    ///
    /// Absolute `http(s)://` URLs pass through; other paths are joined to the
    /// base with exactly one `/`.
    fn url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
        let raw = if lower.starts_with("http://") || lower.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.inner.base_url)
        } else {
            format!("{}/{path}", self.inner.base_url)
        };
        reqwest::Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and decode its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await.map_err(map_send_error)?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&body, 500),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product's details.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let path = format!("/v2/products/details/{}/", urlencoding::encode(id.as_str()));
        let url = self.url(&path)?;
        let product: Product = self.send(self.inner.client.get(url)).await?;

        self.inner
            .products
            .insert(id.clone(), product.clone())
            .await;

        Ok(product)
    }

    /// Search products by free text.
    ///
    /// A blank query returns no results without calling the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!("/v2/products/search/{}/", urlencoding::encode(query));
        let url = self.url(&path)?;
        let products: Option<Vec<Product>> = self.send(self.inner.client.get(url)).await?;
        let products = products.unwrap_or_default();

        debug!(results = products.len(), "Product search finished");
        Ok(products)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_amount))]
    pub async fn place_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, ApiError> {
        let url = self.url("/v2/order/")?;
        let confirmation: OrderConfirmation =
            self.send(self.inner.client.post(url).json(order)).await?;
        debug!(order_id = %confirmation.id, "Order accepted");
        Ok(confirmation)
    }
}

impl OrderGateway for ApiClient {
    fn place_order(
        &self,
        order: &OrderRequest,
    ) -> impl std::future::Future<Output = Result<OrderConfirmation, ApiError>> + Send {
        Self::place_order(self, order)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

fn map_send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
