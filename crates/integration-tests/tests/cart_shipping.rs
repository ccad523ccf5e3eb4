//! Cart and shipping scenarios.
//!
//! Exercises stock clamping, free-shipping thresholds, and cart
//! persistence across reloads of the same durable store.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use woolly_integration_tests::{empty_cart, product, shipping};
use woolly_storefront::cart::{AddOutcome, CartStore, LineSource, QuantityOutcome};
use woolly_storefront::storage::MemoryStore;

// =============================================================================
// Stock clamping
// =============================================================================

#[test]
fn test_add_beyond_stock_is_clamped_with_warning() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 99, &[("M", 3)]);

    let outcome = cart.add_item(&socks, 10, "M", LineSource::Catalog).unwrap();
    let AddOutcome::AddedPartial {
        requested,
        added,
        available,
        ..
    } = outcome
    else {
        panic!("expected a clamped add, got {outcome:?}");
    };

    assert_eq!(requested, 10);
    assert_eq!(added, 3);
    assert_eq!(available, 3);
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn test_topping_up_a_full_line_reports_no_headroom() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 99, &[("M", 3)]);

    cart.add_item(&socks, 3, "M", LineSource::Catalog).unwrap();
    let outcome = cart.add_item(&socks, 1, "M", LineSource::Catalog).unwrap();

    assert!(matches!(outcome, AddOutcome::NoHeadroom { available: 3, .. }));
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn test_quantity_update_is_clamped_to_variant_stock() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 99, &[("M", 4)]);

    let AddOutcome::Added { line_id, .. } =
        cart.add_item(&socks, 2, "M", LineSource::Catalog).unwrap()
    else {
        panic!("expected a clean add");
    };

    let outcome = cart.update_quantity(line_id, 9).unwrap();
    assert!(matches!(outcome, QuantityOutcome::Clamped { max: 4 }));
    assert_eq!(cart.item_count(), 4);
}

// =============================================================================
// Shipping computation
// =============================================================================

#[test]
fn test_subtotal_below_threshold_pays_flat_fee() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 175, &[("M", 10)]);

    cart.add_item(&socks, 2, "M", LineSource::Catalog).unwrap();

    assert_eq!(cart.subtotal().amount, Decimal::from(350));
    assert_eq!(cart.shipping_cost().amount, Decimal::from(49));
    assert_eq!(cart.cart_total().amount, Decimal::from(399));
}

#[test]
fn test_subtotal_above_threshold_ships_free() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 150, &[("M", 10)]);

    cart.add_item(&socks, 3, "M", LineSource::Catalog).unwrap();

    assert_eq!(cart.subtotal().amount, Decimal::from(450));
    assert_eq!(cart.shipping_cost().amount, Decimal::ZERO);
    assert_eq!(cart.cart_total().amount, Decimal::from(450));
}

#[test]
fn test_threshold_is_inclusive() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 399, &[("Free Size", 5)]);

    cart.add_item(&socks, 1, "Free Size", LineSource::Catalog)
        .unwrap();

    assert_eq!(cart.shipping_cost().amount, Decimal::ZERO);
}

#[test]
fn test_shipping_recomputes_after_removal() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 150, &[("M", 10)]);
    let throw = product(12, "Knit Throw", 299, &[("Free Size", 2)]);

    cart.add_item(&socks, 1, "M", LineSource::Catalog).unwrap();
    let AddOutcome::Added { line_id, .. } = cart
        .add_item(&throw, 1, "Free Size", LineSource::Catalog)
        .unwrap()
    else {
        panic!("expected a clean add");
    };
    assert_eq!(cart.shipping_cost().amount, Decimal::ZERO);

    // Dropping back below the threshold reinstates the fee.
    cart.remove_item(line_id).unwrap();
    assert_eq!(cart.subtotal().amount, Decimal::from(150));
    assert_eq!(cart.shipping_cost().amount, Decimal::from(49));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_cart_survives_reload_of_the_same_store() {
    let storage = MemoryStore::new();
    let socks = product(11, "Cloud Sock", 175, &[("M", 10), ("L", 2)]);

    {
        let mut cart = CartStore::load(storage.clone(), shipping());
        cart.add_item(&socks, 2, "M", LineSource::Catalog).unwrap();
        cart.add_item(&socks, 1, "L", LineSource::Catalog).unwrap();
    }

    let cart = CartStore::load(storage, shipping());
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.subtotal().amount, Decimal::from(525));
}

#[test]
fn test_same_product_different_sizes_stay_distinct_lines() {
    let mut cart = empty_cart();
    let socks = product(11, "Cloud Sock", 99, &[("M", 5), ("L", 5)]);

    cart.add_item(&socks, 1, "M", LineSource::Catalog).unwrap();
    cart.add_item(&socks, 1, "L", LineSource::Catalog).unwrap();

    assert_eq!(cart.items().len(), 2);
    let ids: Vec<_> = cart.items().iter().map(|i| i.line_id).collect();
    assert_ne!(ids[0], ids[1]);
}
