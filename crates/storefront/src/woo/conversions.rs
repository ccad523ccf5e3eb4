//! Conversions from gateway JSON into domain types.
//!
//! The gateway is duck-typed; the mapping here is where its shapes become
//! strict. Anything missing or ill-typed fails with
//! [`GatewayError::InvalidData`] instead of carrying `null`s forward.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use woolly_core::{CurrencyCode, CustomerId, Email, OrderId, OrderStatus, Price, ProductId};

use super::GatewayError;
use super::types::{Address, Customer, Order, OrderLine, Product, Variant};
use super::wire::{
    AddressJson, CustomerJson, OrderJson, ProductJson, SIZE_INVENTORY_KEY,
};

/// Parse a gateway price string ("399.00") into a [`Price`].
fn convert_price(raw: &str, context: &str) -> Result<Price, GatewayError> {
    let amount = Decimal::from_str(raw).map_err(|e| {
        GatewayError::InvalidData(format!("{context}: bad price {raw:?}: {e}"))
    })?;
    Ok(Price::new(amount, CurrencyCode::INR))
}

/// Clamp a nullable gateway stock count to a `u32`.
fn convert_stock(raw: Option<i64>) -> u32 {
    raw.map_or(0, |n| u32::try_from(n).unwrap_or(0))
}

/// Convert a gateway product into the internal [`Product`].
///
/// # Errors
///
/// Returns `InvalidData` if the price does not parse or the size inventory
/// meta entry is present but malformed.
pub fn convert_product(json: ProductJson) -> Result<Product, GatewayError> {
    let price = convert_price(&json.price, &format!("product {}", json.id))?;
    let variants = convert_variants(&json)?;
    let stock = convert_stock(json.stock_quantity);

    Ok(Product {
        id: ProductId::new(json.id),
        name: json.name,
        description: json.description,
        price,
        category: json.categories.into_iter().next().map(|c| c.name),
        images: json.images.into_iter().map(|i| i.src).collect(),
        stock,
        variants,
    })
}

/// Build the variant list from the `size_inventory` meta entry.
///
/// Products without the entry get a single "Free Size" variant carrying the
/// aggregate stock, so the cart's per-variant checks apply uniformly.
fn convert_variants(json: &ProductJson) -> Result<Vec<Variant>, GatewayError> {
    let Some(entry) = json.meta_data.iter().find(|m| m.key == SIZE_INVENTORY_KEY) else {
        return Ok(vec![Variant {
            size: "Free Size".to_string(),
            stock: convert_stock(json.stock_quantity),
        }]);
    };

    let Value::Object(map) = &entry.value else {
        return Err(GatewayError::InvalidData(format!(
            "product {}: {SIZE_INVENTORY_KEY} is not an object",
            json.id
        )));
    };

    let mut variants = Vec::with_capacity(map.len());
    for (size, count) in map {
        let stock = count.as_u64().ok_or_else(|| {
            GatewayError::InvalidData(format!(
                "product {}: {SIZE_INVENTORY_KEY}[{size}] is not a non-negative integer",
                json.id
            ))
        })?;
        variants.push(Variant {
            size: size.clone(),
            stock: u32::try_from(stock).unwrap_or(u32::MAX),
        });
    }
    Ok(variants)
}

/// Convert a gateway customer into the internal [`Customer`].
///
/// # Errors
///
/// Returns `InvalidData` if the email on file does not parse.
pub fn convert_customer(json: CustomerJson) -> Result<Customer, GatewayError> {
    let email = Email::parse(&json.email).map_err(|e| {
        GatewayError::InvalidData(format!("customer {}: bad email: {e}", json.id))
    })?;

    Ok(Customer {
        id: CustomerId::new(json.id),
        email,
        first_name: json.first_name,
        last_name: json.last_name,
        billing: json.billing.map(convert_address),
    })
}

/// Convert a gateway address block into the internal [`Address`].
pub fn convert_address(json: AddressJson) -> Address {
    Address {
        first_name: json.first_name,
        last_name: json.last_name,
        address_1: json.address_1,
        city: json.city,
        state: json.state,
        postcode: json.postcode,
        country: json.country,
        email: json.email,
        phone: json.phone,
    }
}

/// Convert an internal [`Address`] into the gateway's wire shape.
pub fn address_to_wire(address: &Address) -> AddressJson {
    AddressJson {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        address_1: address.address_1.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postcode: address.postcode.clone(),
        country: address.country.clone(),
        email: address.email.clone(),
        phone: address.phone.clone(),
    }
}

/// Convert a gateway order into the internal [`Order`].
///
/// # Errors
///
/// Returns `InvalidData` if the status or total does not parse, or a line
/// quantity is negative.
pub fn convert_order(json: OrderJson) -> Result<Order, GatewayError> {
    let status: OrderStatus =
        serde_json::from_value(Value::String(json.status.clone())).map_err(|_| {
            GatewayError::InvalidData(format!(
                "order {}: unknown status {:?}",
                json.id, json.status
            ))
        })?;
    let total = convert_price(&json.total, &format!("order {}", json.id))?;

    let mut line_items = Vec::with_capacity(json.line_items.len());
    for line in json.line_items {
        let quantity = u32::try_from(line.quantity).map_err(|_| {
            GatewayError::InvalidData(format!(
                "order {}: negative quantity on {:?}",
                json.id, line.name
            ))
        })?;
        line_items.push(OrderLine {
            product_id: ProductId::new(line.product_id),
            name: line.name,
            quantity,
        });
    }

    Ok(Order {
        id: OrderId::new(json.id),
        status,
        total,
        line_items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json(value: serde_json::Value) -> ProductJson {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_convert_product_with_size_inventory() {
        let product = convert_product(product_json(json!({
            "id": 11,
            "name": "Cloud Sock",
            "description": "<p>Soft.</p>",
            "price": "199.00",
            "categories": [{"name": "Socks"}],
            "images": [{"src": "https://cdn.example/a.jpg"}],
            "stock_quantity": 8,
            "meta_data": [{"key": "size_inventory", "value": {"M": 5, "L": 3}}]
        })))
        .unwrap();

        assert_eq!(product.id.as_i64(), 11);
        assert_eq!(product.price.amount, Decimal::from(199));
        assert_eq!(product.category.as_deref(), Some("Socks"));
        assert_eq!(product.stock, 8);
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variant("M").map(|v| v.stock), Some(5));
    }

    #[test]
    fn test_convert_product_without_sizes_gets_free_size() {
        let product = convert_product(product_json(json!({
            "id": 12,
            "name": "Throw Blanket",
            "price": "999.00",
            "stock_quantity": 4
        })))
        .unwrap();

        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variant("Free Size").map(|v| v.stock), Some(4));
    }

    #[test]
    fn test_convert_product_null_stock_is_zero() {
        let product = convert_product(product_json(json!({
            "id": 13,
            "name": "Sold Out Sock",
            "price": "149.00",
            "stock_quantity": null
        })))
        .unwrap();

        assert_eq!(product.stock, 0);
        assert_eq!(product.variant("Free Size").map(|v| v.stock), Some(0));
    }

    #[test]
    fn test_convert_product_bad_price_fails_loudly() {
        let err = convert_product(product_json(json!({
            "id": 14,
            "name": "Broken",
            "price": "not-a-number",
            "stock_quantity": 1
        })))
        .unwrap_err();

        assert!(matches!(err, GatewayError::InvalidData(_)));
    }

    #[test]
    fn test_convert_product_malformed_size_inventory_fails() {
        let err = convert_product(product_json(json!({
            "id": 15,
            "name": "Broken Sizes",
            "price": "199.00",
            "stock_quantity": 5,
            "meta_data": [{"key": "size_inventory", "value": {"M": "five"}}]
        })))
        .unwrap_err();

        assert!(matches!(err, GatewayError::InvalidData(_)));
    }

    #[test]
    fn test_convert_customer() {
        let customer = convert_customer(
            serde_json::from_value(json!({
                "id": 7,
                "email": "asha@example.com",
                "first_name": "Asha",
                "last_name": "Rao",
                "billing": {
                    "first_name": "Asha",
                    "last_name": "Rao",
                    "address_1": "12 Lake Rd",
                    "city": "Bengaluru",
                    "state": "Karnataka",
                    "postcode": "560001",
                    "country": "IN"
                }
            }))
            .unwrap(),
        )
        .unwrap();

        assert_eq!(customer.id.as_i64(), 7);
        assert_eq!(customer.display_name(), "Asha Rao");
        assert_eq!(
            customer.billing.as_ref().map(|b| b.city.as_str()),
            Some("Bengaluru")
        );
    }

    #[test]
    fn test_convert_customer_bad_email_fails() {
        let result = convert_customer(
            serde_json::from_value(json!({
                "id": 8,
                "email": "not-an-email",
                "billing": null
            }))
            .unwrap(),
        );
        assert!(matches!(result, Err(GatewayError::InvalidData(_))));
    }

    #[test]
    fn test_convert_order() {
        let order = convert_order(
            serde_json::from_value(json!({
                "id": 1001,
                "status": "pending",
                "total": "448.00",
                "line_items": [
                    {"product_id": 11, "name": "Cloud Sock", "quantity": 2}
                ]
            }))
            .unwrap(),
        )
        .unwrap();

        assert_eq!(order.id.as_i64(), 1001);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.amount, Decimal::from(448));
        assert_eq!(order.line_items.len(), 1);
    }

    #[test]
    fn test_convert_order_unknown_status_fails() {
        let result = convert_order(
            serde_json::from_value(json!({
                "id": 1002,
                "status": "on-fire",
                "total": "10.00"
            }))
            .unwrap(),
        );
        assert!(matches!(result, Err(GatewayError::InvalidData(_))));
    }
}
