//! Razorpay hosted-checkout handoff.
//!
//! The widget itself is opaque: it is given a config object, it shows a
//! modal, and it comes back with exactly one of success, failure, or
//! dismissal. This module owns the config shape (including the
//! rupees-to-paise conversion) and the [`PaymentCollector`] seam the
//! checkout orchestrator drives; the embedding UI bridges the seam to the
//! real widget, and tests script it.

use serde::Serialize;

use woolly_core::{Email, Phone, Price};

/// Errors building checkout options.
#[derive(Debug, thiserror::Error)]
pub enum PaymentOptionsError {
    /// The order amount does not convert to minor units.
    #[error("order amount {0} cannot be charged")]
    UnchargeableAmount(Price),
}

/// Config object handed to the hosted checkout widget.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
    /// Publishable key identifying the merchant.
    pub key: String,
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: &'static str,
    /// Brand name shown on the modal.
    pub name: String,
    /// Order description shown on the modal.
    pub description: String,
    /// Contact fields prefilled into the widget.
    pub prefill: Prefill,
    /// Widget theming.
    pub theme: Theme,
}

impl CheckoutOptions {
    /// Build widget options for an order amount.
    ///
    /// The widget takes minor units: a ₹399 order is handed off as 39900.
    /// The multiplication lives in [`Price::to_minor_units`] and nowhere
    /// else, so it cannot be applied twice or forgotten.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or too large to convert.
    pub fn for_amount(
        key: &str,
        brand_name: &str,
        description: &str,
        amount: Price,
        prefill: Prefill,
    ) -> Result<Self, PaymentOptionsError> {
        let minor = amount
            .to_minor_units()
            .ok_or(PaymentOptionsError::UnchargeableAmount(amount))?;

        Ok(Self {
            key: key.to_string(),
            amount: minor,
            currency: amount.currency_code.code(),
            name: brand_name.to_string(),
            description: description.to_string(),
            prefill,
            theme: Theme::default(),
        })
    }
}

/// Contact fields prefilled into the widget.
#[derive(Debug, Clone, Serialize)]
pub struct Prefill {
    /// Shopper name.
    pub name: String,
    /// Shopper email.
    pub email: String,
    /// Shopper phone number.
    pub contact: String,
}

impl Prefill {
    /// Build prefill fields from validated contact details.
    #[must_use]
    pub fn new(name: &str, email: &Email, phone: &Phone) -> Self {
        Self {
            name: name.to_string(),
            email: email.as_str().to_string(),
            contact: phone.as_str().to_string(),
        }
    }
}

/// Widget theming.
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    /// Accent color.
    pub color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // Brand accent
            color: "#2b2d42".to_string(),
        }
    }
}

/// What the widget came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment captured; the gateway's payment id.
    Completed {
        /// Payment confirmation token (e.g., `pay_...`).
        payment_id: String,
    },
    /// Payment attempted and declined/errored.
    Failed {
        /// Human-readable failure description from the gateway.
        description: String,
    },
    /// The shopper closed the modal without paying.
    Dismissed,
}

/// The seam between the orchestrator and the opaque hosted widget.
pub trait PaymentCollector {
    /// Show the widget and wait for its single callback.
    fn collect(&self, options: CheckoutOptions) -> impl Future<Output = PaymentOutcome>;
}
