//! Indian mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly ten digits.
    #[error("phone number must be exactly 10 digits")]
    WrongLength,
    /// The input contains non-digit characters.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The first digit is outside 6-9.
    #[error("phone number must start with 6, 7, 8, or 9")]
    InvalidPrefix,
}

/// An Indian mobile number.
///
/// Ten digits, first digit 6-9 (the TRAI mobile numbering plan). Stored
/// without a country prefix; the payment handoff prepends one where the
/// widget wants it.
///
/// ## Examples
///
/// ```
/// use woolly_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("987654321").is_err());  // 9 digits
/// assert!(Phone::parse("1234567890").is_err()); // starts with 1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not ten digits, contains
    /// non-digit characters, or does not start with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if s.len() != 10 {
            return Err(PhoneError::WrongLength);
        }

        if !matches!(s.chars().next(), Some('6'..='9')) {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
