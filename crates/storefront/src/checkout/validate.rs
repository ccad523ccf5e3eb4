//! Shipping form validation.
//!
//! Every field is checked against its format rule and failures come back
//! as a field-keyed list so the UI can attach messages inline and scroll
//! to the first invalid field. Validation failure is soft: the flow stays
//! on the editing step.

use serde::{Deserialize, Serialize};

use woolly_core::{Email, Phone, Pincode};

use crate::woo::types::Address;

/// Raw shipping form input, exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingForm {
    /// Contact email.
    pub email: String,
    /// Contact mobile number.
    pub phone: String,
    /// Recipient full name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Postal PIN code.
    pub pincode: String,
    /// City (may be auto-filled from the PIN lookup).
    pub city: String,
    /// State (may be auto-filled from the PIN lookup).
    pub state: String,
}

/// Form fields, in the order they appear on screen.
///
/// The ordering is load-bearing: the first invalid field in this order is
/// the one the UI scrolls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Phone,
    Name,
    Address,
    Pincode,
    City,
    State,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Which field failed.
    pub field: Field,
    /// Message to attach to it.
    pub message: String,
}

/// All failures from one validation pass, in screen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Whether validation passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first invalid field (scroll target).
    #[must_use]
    pub fn first(&self) -> Option<&FieldError> {
        self.0.first()
    }

    /// All failures in screen order.
    #[must_use]
    pub fn all(&self) -> &[FieldError] {
        &self.0
    }

    /// The failure for a specific field, if any.
    #[must_use]
    pub fn for_field(&self, field: Field) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

/// A shipping form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidShipping {
    /// Validated email.
    pub email: Email,
    /// Validated mobile number.
    pub phone: Phone,
    /// Recipient full name, trimmed.
    pub name: String,
    /// Street address, trimmed.
    pub address: String,
    /// Validated PIN code.
    pub pincode: Pincode,
    /// City, trimmed.
    pub city: String,
    /// State, trimmed.
    pub state: String,
}

impl ValidShipping {
    /// First name: everything before the first space.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Last name: everything after the first space (may be empty).
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.name
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest.trim())
    }

    /// Snapshot as a gateway address block.
    #[must_use]
    pub fn to_address(&self) -> Address {
        Address {
            first_name: self.first_name().to_string(),
            last_name: self.last_name().to_string(),
            address_1: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postcode: self.pincode.as_str().to_string(),
            country: "IN".to_string(),
            email: Some(self.email.as_str().to_string()),
            phone: Some(self.phone.as_str().to_string()),
        }
    }
}

/// Validate a shipping form.
///
/// # Errors
///
/// Returns the field-keyed failures, in screen order, if any rule fails.
pub fn validate(form: &ShippingForm) -> Result<ValidShipping, FieldErrors> {
    let mut errors = FieldErrors::default();

    let email = match Email::parse(form.email.trim()) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(Field::Email, e.to_string());
            None
        }
    };

    let phone = match Phone::parse(form.phone.trim()) {
        Ok(phone) => Some(phone),
        Err(e) => {
            errors.push(Field::Phone, e.to_string());
            None
        }
    };

    let name = form.name.trim();
    if name.is_empty() {
        errors.push(Field::Name, "enter your name");
    }

    let address = form.address.trim();
    if address.is_empty() {
        errors.push(Field::Address, "enter your address");
    }

    let pincode = match Pincode::parse(form.pincode.trim()) {
        Ok(pincode) => Some(pincode),
        Err(e) => {
            errors.push(Field::Pincode, e.to_string());
            None
        }
    };

    let city = form.city.trim();
    if city.is_empty() {
        errors.push(Field::City, "enter your city");
    }

    let state = form.state.trim();
    if state.is_empty() {
        errors.push(Field::State, "enter your state");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // All three parses succeeded if errors is empty.
    match (email, phone, pincode) {
        (Some(email), Some(phone), Some(pincode)) => Ok(ValidShipping {
            email,
            phone,
            name: name.to_string(),
            address: address.to_string(),
            pincode,
            city: city.to_string(),
            state: state.to_string(),
        }),
        _ => Err(errors),
    }
}
