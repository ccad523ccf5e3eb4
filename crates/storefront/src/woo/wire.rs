//! Raw gateway JSON shapes.
//!
//! These mirror what the WooCommerce REST API actually sends: prices as
//! strings, nullable stock, nested category/image objects, and per-size
//! inventory projected into a `size_inventory` meta entry by the store's
//! API proxy. Nothing outside this module and [`super::conversions`]
//! touches them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A product as the gateway sends it.
#[derive(Debug, Deserialize)]
pub struct ProductJson {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub categories: Vec<CategoryJson>,
    #[serde(default)]
    pub images: Vec<ImageJson>,
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub meta_data: Vec<MetaJson>,
}

/// A product category reference.
#[derive(Debug, Deserialize)]
pub struct CategoryJson {
    pub name: String,
}

/// A product image reference.
#[derive(Debug, Deserialize)]
pub struct ImageJson {
    pub src: String,
}

/// A key/value meta entry on a product or order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaJson {
    pub key: String,
    pub value: Value,
}

/// Meta key under which the proxy projects per-size stock as an object of
/// size label to unit count.
pub const SIZE_INVENTORY_KEY: &str = "size_inventory";

/// A customer as the gateway sends it.
#[derive(Debug, Deserialize)]
pub struct CustomerJson {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub billing: Option<AddressJson>,
}

/// An address block on a customer or order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressJson {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An order as the gateway sends it.
#[derive(Debug, Deserialize)]
pub struct OrderJson {
    pub id: i64,
    pub status: String,
    pub total: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineJson>,
}

/// One order line as the gateway sends it.
#[derive(Debug, Deserialize)]
pub struct OrderLineJson {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
}

/// Request body for `POST customers`.
#[derive(Debug, Serialize)]
pub struct CreateCustomerBody {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub billing: AddressJson,
}

/// Request body for `POST orders`.
#[derive(Debug, Serialize)]
pub struct CreateOrderBody {
    pub customer_id: i64,
    pub status: String,
    pub set_paid: bool,
    pub billing: AddressJson,
    pub shipping: AddressJson,
    pub line_items: Vec<CreateOrderLineBody>,
    pub shipping_lines: Vec<ShippingLineBody>,
}

/// One line of a `POST orders` body.
#[derive(Debug, Serialize)]
pub struct CreateOrderLineBody {
    pub product_id: i64,
    pub quantity: i64,
    pub meta_data: Vec<MetaJson>,
}

/// One shipping charge of a `POST orders` body.
#[derive(Debug, Serialize)]
pub struct ShippingLineBody {
    pub method_id: String,
    pub method_title: String,
    pub total: String,
}

/// Request body for `PUT orders/{id}` after payment capture.
#[derive(Debug, Serialize)]
pub struct MarkPaidBody {
    pub status: String,
    pub set_paid: bool,
    pub transaction_id: String,
}
