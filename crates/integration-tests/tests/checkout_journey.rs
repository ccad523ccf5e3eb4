//! End-to-end checkout scenarios over scripted external systems.
//!
//! Cart, session, validation, order placement, payment handoff, and
//! reconciliation wired together the way the embedding UI drives them.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use woolly_core::{CustomerId, Email};
use woolly_integration_tests::fakes::{RecordingGateway, ScriptedCollector};
use woolly_integration_tests::{empty_cart, product, shipping};
use woolly_storefront::cart::{CartStore, LineSource};
use woolly_storefront::checkout::validate::{Field, ShippingForm};
use woolly_storefront::checkout::{
    CheckoutContext, CheckoutError, CheckoutFlow, CheckoutOutcome, CheckoutState,
};
use woolly_storefront::session::{DEFAULT_FRESHNESS, SessionStore};
use woolly_storefront::storage::MemoryStore;
use woolly_storefront::woo::types::Customer;

fn guest_ctx() -> CheckoutContext {
    CheckoutContext {
        razorpay_key: "rzp_test_key".to_string(),
        brand_name: "Woolly".to_string(),
        customer: None,
    }
}

fn good_form() -> ShippingForm {
    ShippingForm {
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        name: "Asha Rao".to_string(),
        address: "12 Lake Rd".to_string(),
        pincode: "560001".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
    }
}

fn asha() -> Customer {
    Customer {
        id: CustomerId::new(42),
        email: Email::parse("asha@example.com").unwrap(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        billing: None,
    }
}

// =============================================================================
// Validation gate
// =============================================================================

#[tokio::test]
async fn test_invalid_phone_stops_before_any_gateway_call() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::paying("pay_x");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    let form = ShippingForm {
        phone: "987654321".to_string(),
        ..good_form()
    };
    let outcome = flow.submit(&form).await.unwrap();

    let CheckoutOutcome::InvalidFields(errors) = outcome else {
        panic!("expected field errors, got {outcome:?}");
    };
    assert_eq!(errors.first().map(|e| e.field), Some(Field::Phone));
    assert!(gateway.calls().is_empty());
    assert!(collector.options_seen().is_empty());
    assert_eq!(cart.item_count(), 2);
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::paying("pay_x");
    let mut cart = empty_cart();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    assert!(matches!(
        flow.submit(&good_form()).await,
        Err(CheckoutError::EmptyCart)
    ));
}

// =============================================================================
// Guest happy path
// =============================================================================

#[tokio::test]
async fn test_guest_checkout_creates_customer_and_charges_paise() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::paying("pay_abc123");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    let outcome = flow.submit(&good_form()).await.unwrap();
    let CheckoutOutcome::Completed {
        payment_id,
        was_authenticated,
        ..
    } = outcome
    else {
        panic!("expected completion, got {outcome:?}");
    };

    assert_eq!(payment_id, "pay_abc123");
    assert!(!was_authenticated);
    assert_eq!(flow.state(), CheckoutState::Done);
    assert!(cart.is_empty());
    assert_eq!(
        gateway.calls(),
        vec![
            "find_customer_by_email",
            "create_customer",
            "create_order",
            "mark_order_paid",
        ]
    );

    // ₹350 subtotal + ₹49 shipping, handed to the widget in paise.
    let options = collector.options_seen();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].amount, 39_900);
    assert_eq!(options[0].currency, "INR");
    assert_eq!(options[0].prefill.contact, "9876543210");
}

// =============================================================================
// Payment failure modes
// =============================================================================

#[tokio::test]
async fn test_dismissing_the_widget_keeps_the_cart() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::dismissed();
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    let outcome = flow.submit(&good_form()).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::PaymentDismissed { .. }));
    assert_eq!(flow.state(), CheckoutState::Editing);
    assert_eq!(cart.item_count(), 2);
    // The pending order was created and is left orphaned.
    assert!(gateway.called("create_order"));
    assert!(!gateway.called("mark_order_paid"));
}

#[tokio::test]
async fn test_declined_payment_surfaces_description() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::declining("Card declined by issuer");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    let outcome = flow.submit(&good_form()).await.unwrap();
    let CheckoutOutcome::PaymentFailed { description, .. } = outcome else {
        panic!("expected payment failure, got {outcome:?}");
    };
    assert_eq!(description, "Card declined by issuer");
    assert_eq!(cart.item_count(), 2);
}

#[tokio::test]
async fn test_reconciliation_failure_reports_payment_id_and_keeps_cart() {
    let gateway = RecordingGateway {
        fail_mark_paid: true,
        ..RecordingGateway::default()
    };
    let collector = ScriptedCollector::paying("pay_abc123");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());

    let outcome = flow.submit(&good_form()).await.unwrap();
    let CheckoutOutcome::ReconciliationFailed { payment_id, .. } = outcome else {
        panic!("expected reconciliation failure, got {outcome:?}");
    };
    assert_eq!(payment_id, "pay_abc123");
    assert_eq!(flow.state(), CheckoutState::Failed);
    assert_eq!(cart.item_count(), 2);
}

// =============================================================================
// Session-aware checkout
// =============================================================================

#[tokio::test]
async fn test_restored_session_checks_out_without_customer_lookup() {
    let gateway = RecordingGateway {
        known_customer: Some(asha()),
        ..RecordingGateway::default()
    };

    // A session persisted 10 minutes ago, then restored.
    let storage = MemoryStore::new();
    let mut session = SessionStore::new(storage, DEFAULT_FRESHNESS);
    session
        .login(&asha(), "tok_live", Utc::now() - Duration::minutes(10))
        .unwrap();
    let restored = session.restore(&gateway, Utc::now()).await;
    assert!(restored.is_some());

    let collector = ScriptedCollector::paying("pay_abc123");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let ctx = CheckoutContext {
        customer: session.customer_id(),
        ..guest_ctx()
    };
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, ctx);

    let outcome = flow.submit(&good_form()).await.unwrap();
    assert!(matches!(
        outcome,
        CheckoutOutcome::Completed {
            was_authenticated: true,
            ..
        }
    ));
    assert!(!gateway.called("find_customer_by_email"));
    assert!(!gateway.called("create_customer"));
}

#[tokio::test]
async fn test_stale_unreachable_session_falls_back_to_guest_checkout() {
    let gateway = RecordingGateway {
        known_customer: Some(asha()),
        fail_fetch_customer: true,
        ..RecordingGateway::default()
    };

    let storage = MemoryStore::new();
    let mut session = SessionStore::new(storage, DEFAULT_FRESHNESS);
    session
        .login(&asha(), "tok_old", Utc::now() - Duration::minutes(45))
        .unwrap();
    assert!(session.restore(&gateway, Utc::now()).await.is_none());

    // Torn-down session means the checkout resolves the customer by email.
    let collector = ScriptedCollector::paying("pay_abc123");
    let mut cart = empty_cart();
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();
    let ctx = CheckoutContext {
        customer: session.customer_id(),
        ..guest_ctx()
    };
    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, ctx);

    let outcome = flow.submit(&good_form()).await.unwrap();
    assert!(matches!(
        outcome,
        CheckoutOutcome::Completed {
            was_authenticated: false,
            ..
        }
    ));
    assert!(gateway.called("find_customer_by_email"));
}

// =============================================================================
// Cart persistence through checkout
// =============================================================================

#[tokio::test]
async fn test_completed_checkout_persists_the_empty_cart() {
    let gateway = RecordingGateway::default();
    let collector = ScriptedCollector::paying("pay_abc123");
    let storage = MemoryStore::new();

    let mut cart = CartStore::load(storage.clone(), shipping());
    cart.add_item(
        &product(11, "Cloud Sock", 175, &[("M", 5)]),
        2,
        "M",
        LineSource::Catalog,
    )
    .unwrap();

    let mut flow = CheckoutFlow::new(&gateway, &collector, &mut cart, guest_ctx());
    let outcome = flow.submit(&good_form()).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed { .. }));

    // A reload sees the cleared cart, not the pre-checkout contents.
    let reloaded = CartStore::load(storage, shipping());
    assert!(reloaded.is_empty());
}
