//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WOOLLY_STORE_API_URL` - Base URL of the store REST gateway proxy
//! - `RAZORPAY_KEY_ID` - Publishable payment key for the hosted widget
//!
//! ## Optional
//! - `WOOLLY_PINCODE_API_URL` - Postal PIN lookup base URL
//!   (default: <https://api.postalpincode.in/>)
//! - `WOOLLY_DATA_DIR` - Directory for durable client blobs (default: .woolly)
//! - `WOOLLY_BRAND_NAME` - Brand shown on the payment modal (default: Woolly)
//! - `WOOLLY_FREE_SHIPPING_THRESHOLD` - Rupee subtotal at which shipping is
//!   free (default: 399)
//! - `WOOLLY_SHIPPING_FEE` - Flat rupee shipping fee below the threshold
//!   (default: 49)
//! - `WOOLLY_SESSION_FRESHNESS_MINUTES` - Session snapshot trust window
//!   (default: 30)

use std::path::PathBuf;

use chrono::Duration;
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::cart::ShippingConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Store gateway base URL, normalized to end with `/` so endpoint
    /// joins behave.
    pub store_api_url: Url,
    /// Publishable payment key (safe to expose client-side).
    pub razorpay_key_id: String,
    /// Postal PIN lookup base URL.
    pub pincode_api_url: Url,
    /// Directory for durable client blobs (cart, session).
    pub data_dir: PathBuf,
    /// Brand name shown on the payment modal.
    pub brand_name: String,
    /// Rupee subtotal at which shipping becomes free.
    pub free_shipping_threshold: Decimal,
    /// Flat rupee shipping fee below the threshold.
    pub shipping_fee: Decimal,
    /// Minutes a session snapshot is trusted without re-confirmation.
    pub session_freshness_minutes: i64,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store_api_url = parse_base_url(
            "WOOLLY_STORE_API_URL",
            &get_required_env("WOOLLY_STORE_API_URL")?,
        )?;
        let razorpay_key_id = get_required_env("RAZORPAY_KEY_ID")?;
        let pincode_api_url = parse_base_url(
            "WOOLLY_PINCODE_API_URL",
            &get_env_or_default("WOOLLY_PINCODE_API_URL", "https://api.postalpincode.in/"),
        )?;
        let data_dir = PathBuf::from(get_env_or_default("WOOLLY_DATA_DIR", ".woolly"));
        let brand_name = get_env_or_default("WOOLLY_BRAND_NAME", "Woolly");
        let free_shipping_threshold =
            parse_rupees("WOOLLY_FREE_SHIPPING_THRESHOLD", &get_env_or_default(
                "WOOLLY_FREE_SHIPPING_THRESHOLD",
                "399",
            ))?;
        let shipping_fee =
            parse_rupees("WOOLLY_SHIPPING_FEE", &get_env_or_default("WOOLLY_SHIPPING_FEE", "49"))?;
        let session_freshness_minutes = get_env_or_default("WOOLLY_SESSION_FRESHNESS_MINUTES", "30")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "WOOLLY_SESSION_FRESHNESS_MINUTES".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            store_api_url,
            razorpay_key_id,
            pincode_api_url,
            data_dir,
            brand_name,
            free_shipping_threshold,
            shipping_fee,
            session_freshness_minutes,
        })
    }

    /// Shipping rules for the cart store.
    #[must_use]
    pub const fn shipping(&self) -> ShippingConfig {
        ShippingConfig {
            free_shipping_threshold: self.free_shipping_threshold,
            flat_fee: self.shipping_fee,
        }
    }

    /// Session freshness window as a duration.
    #[must_use]
    pub fn session_freshness(&self) -> Duration {
        Duration::minutes(self.session_freshness_minutes)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL and normalize it to end with a trailing slash.
///
/// `Url::join` treats the last path segment of a slashless base as a file
/// and replaces it, so `https://host/wp-json/wc/v3` joined with `products`
/// would silently drop `v3`.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

/// Parse a non-negative rupee amount.
fn parse_rupees(var_name: &str, value: &str) -> Result<Decimal, ConfigError> {
    let amount = value
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if amount < Decimal::ZERO {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}
