//! Indian postal PIN code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PincodeError {
    /// The input string is empty.
    #[error("PIN code cannot be empty")]
    Empty,
    /// The input is not exactly six digits.
    #[error("PIN code must be exactly 6 digits")]
    WrongLength,
    /// The input contains non-digit characters.
    #[error("PIN code must contain only digits")]
    NonDigit,
    /// The first digit is zero.
    #[error("PIN code cannot start with 0")]
    LeadingZero,
}

/// An Indian postal PIN code.
///
/// Six digits, first digit 1-9.
///
/// ## Examples
///
/// ```
/// use woolly_core::Pincode;
///
/// assert!(Pincode::parse("560001").is_ok());
/// assert!(Pincode::parse("060001").is_err()); // leading zero
/// assert!(Pincode::parse("56001").is_err());  // 5 digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not six digits, contains
    /// non-digit characters, or starts with 0.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        if s.is_empty() {
            return Err(PincodeError::Empty);
        }

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PincodeError::NonDigit);
        }

        if s.len() != 6 {
            return Err(PincodeError::WrongLength);
        }

        if s.starts_with('0') {
            return Err(PincodeError::LeadingZero);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the PIN code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
