//! Unified error handling.
//!
//! Provides a unified `AppError` type over the subsystem errors so embedders
//! can hold a single error at the top of the call stack. Subsystems keep
//! their own error types; this is only the aggregation point.

use thiserror::Error;

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::woo::GatewayError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Store gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout was misused or could not start.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Convenience alias for fallible storefront operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let err = AppError::from(ConfigError::MissingEnvVar("RAZORPAY_KEY_ID".to_string()));
        assert_eq!(
            err.to_string(),
            "Config error: Missing environment variable: RAZORPAY_KEY_ID"
        );
    }

    #[test]
    fn test_gateway_error_converts() {
        let err = AppError::from(GatewayError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        assert!(matches!(err, AppError::Gateway(_)));
    }
}
