//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// The amount is kept in the currency's standard unit (rupees, not paise);
/// conversion to minor units happens only at the payment handoff via
/// [`Price::to_minor_units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create an INR price from a whole-rupee amount.
    #[must_use]
    pub fn rupees(amount: i64) -> Self {
        Self::new(Decimal::from(amount), CurrencyCode::INR)
    }

    /// Convert to the currency's minor unit (paise for INR).
    ///
    /// Payment gateways take amounts in minor units, so a ₹399 order is
    /// handed off as 39900. Forgetting this multiplication charges one
    /// hundredth of the intended amount, which is why the conversion lives
    /// here and nowhere else.
    ///
    /// Returns `None` if the amount does not fit in a `u64` after scaling
    /// (negative or absurdly large).
    #[must_use]
    pub fn to_minor_units(&self) -> Option<u64> {
        (self.amount * Decimal::from(100)).round().to_u64()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The currency's display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units_whole() {
        assert_eq!(Price::rupees(399).to_minor_units(), Some(39900));
    }

    #[test]
    fn test_to_minor_units_fractional() {
        let price = Price::new(Decimal::new(4950, 2), CurrencyCode::INR);
        assert_eq!(price.to_minor_units(), Some(4950));
    }

    #[test]
    fn test_to_minor_units_negative() {
        let price = Price::new(Decimal::from(-1), CurrencyCode::INR);
        assert_eq!(price.to_minor_units(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::rupees(399).to_string(), "₹399.00");
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::INR.code(), "INR");
        assert_eq!(CurrencyCode::INR.symbol(), "₹");
    }
}
