//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KHOOJLO_API_BASE_URL` - REST API root (e.g., `https://host/api`)
//! - `KHOOJLO_MEDIA_BASE_URL` - Origin that relative image paths resolve against
//!
//! ## Optional
//! - `KHOOJLO_API_TOKEN` - Bearer token sent with API requests
//! - `KHOOJLO_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `KHOOJLO_CART_DIR` - Directory holding the persisted cart (default: .khoojlo)
//! - `KHOOJLO_CART_KEY` - Storage key of the cart (default: `react_cart`)

use std::path::PathBuf;
use std::time::Duration;

use khoojlo_core::MediaBase;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::store::DEFAULT_CART_KEY;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CART_DIR: &str = ".khoojlo";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API configuration
    pub api: ApiConfig,
    /// Base for relative product image paths
    pub media_base: MediaBase,
    /// Directory for the file-backed cart storage
    pub cart_dir: PathBuf,
    /// Storage key of the cart
    pub cart_key: String,
}

/// Remote API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// API root, e.g. `https://host/api`
    pub base_url: Url,
    /// Bearer token, if requests should be authenticated
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for an API root with no token and the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Whether a non-empty token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_url("KHOOJLO_API_BASE_URL", &get_required_env("KHOOJLO_API_BASE_URL")?)?;
        let token = get_optional_env("KHOOJLO_API_TOKEN")
            .filter(|token| !token.is_empty())
            .map(SecretString::from);
        let timeout = parse_timeout(
            "KHOOJLO_API_TIMEOUT_SECS",
            &get_env_or_default("KHOOJLO_API_TIMEOUT_SECS", "10"),
        )?;

        Ok(Self {
            base_url,
            token,
            timeout,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let media_base = parse_media_base(
            "KHOOJLO_MEDIA_BASE_URL",
            &get_required_env("KHOOJLO_MEDIA_BASE_URL")?,
        )?;
        let cart_dir = PathBuf::from(get_env_or_default("KHOOJLO_CART_DIR", DEFAULT_CART_DIR));
        let cart_key = get_env_or_default("KHOOJLO_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "KHOOJLO_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api,
            media_base,
            cart_dir,
            cart_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_media_base(var_name: &str, value: &str) -> Result<MediaBase, ConfigError> {
    parse_url(var_name, value).map(MediaBase::from)
}

/// Parse a positive number of seconds.
fn parse_timeout(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
