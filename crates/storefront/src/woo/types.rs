//! Domain types for catalog, customer, and order data.
//!
//! These are the strict internal shapes the rest of the crate works with.
//! The gateway's loose JSON is mapped into them in [`super::conversions`],
//! failing loudly instead of carrying undefined fields forward.

use serde::{Deserialize, Serialize};

use woolly_core::{CustomerId, Email, OrderId, OrderStatus, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Gateway-issued product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Description (may contain markup from the gateway).
    pub description: String,
    /// Unit price in the catalog currency.
    pub price: Price,
    /// Primary category name, if any.
    pub category: Option<String>,
    /// Image URLs in display order.
    pub images: Vec<String>,
    /// Aggregate stock across variants. Trusted from the gateway; this
    /// system does not enforce that it equals the sum of variant stocks.
    pub stock: u32,
    /// Size variants.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Look up a variant by its size label.
    #[must_use]
    pub fn variant(&self, size: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.size == size)
    }

    /// The first image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A size-specific stock-keeping unit within a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Size label (e.g., "M", "Free Size").
    pub size: String,
    /// Units available in this size.
    pub stock: u32,
}

/// A customer record on the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Gateway-issued customer ID.
    pub id: CustomerId,
    /// Login / contact email.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Billing address, if the customer has one on file.
    pub billing: Option<Address>,
}

impl Customer {
    /// Full display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        name.trim().to_string()
    }
}

/// A billing/shipping address snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Recipient first name.
    pub first_name: String,
    /// Recipient last name.
    pub last_name: String,
    /// Street address.
    pub address_1: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal PIN code.
    pub postcode: String,
    /// Country code.
    pub country: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// An order as the gateway reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Gateway-issued order ID.
    pub id: OrderId,
    /// Current status.
    pub status: OrderStatus,
    /// Order total as charged.
    pub total: Price,
    /// Line items.
    pub line_items: Vec<OrderLine>,
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Display name at order time.
    pub name: String,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Request payload for creating a customer.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    /// Login / contact email.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Billing address to put on file.
    pub billing: Address,
}

/// Request payload for creating a pending order.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    /// Customer placing the order.
    pub customer_id: CustomerId,
    /// Billing address snapshot.
    pub billing: Address,
    /// Shipping address snapshot.
    pub shipping: Address,
    /// Line items.
    pub line_items: Vec<NewOrderLine>,
    /// Shipping fee charged, if any.
    pub shipping_fee: Price,
}

/// One requested order line.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    /// Product to order.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity: u32,
    /// Selected size label, recorded as line metadata on the gateway.
    pub size: String,
}
