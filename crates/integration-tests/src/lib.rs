//! Integration tests for Woolly.
//!
//! Cross-module scenario tests: cart, session, and checkout wired together
//! over in-memory storage and scripted gateway/payment fakes. Shared
//! fixtures live here; the scenarios live under `tests/`.

use rust_decimal::Decimal;

use woolly_core::{Price, ProductId};
use woolly_storefront::cart::{CartStore, ShippingConfig};
use woolly_storefront::storage::MemoryStore;
use woolly_storefront::woo::types::{Product, Variant};

pub mod fakes;

/// Standard shipping rules used across scenarios: free at ₹399, ₹49 below.
#[must_use]
pub fn shipping() -> ShippingConfig {
    ShippingConfig {
        free_shipping_threshold: Decimal::from(399),
        flat_fee: Decimal::from(49),
    }
}

/// An empty cart over a fresh in-memory store.
#[must_use]
pub fn empty_cart() -> CartStore<MemoryStore> {
    CartStore::load(MemoryStore::new(), shipping())
}

/// A catalog product with the given price and per-size stock.
#[must_use]
pub fn product(id: i64, name: &str, rupees: i64, sizes: &[(&str, u32)]) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Price::rupees(rupees),
        category: Some("Socks".to_string()),
        images: vec![format!("https://cdn.example.com/{id}.jpg")],
        stock: sizes.iter().map(|(_, stock)| stock).sum(),
        variants: sizes
            .iter()
            .map(|(size, stock)| Variant {
                size: (*size).to_string(),
                stock: *stock,
            })
            .collect(),
    }
}
