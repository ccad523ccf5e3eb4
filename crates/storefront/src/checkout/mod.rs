//! Checkout orchestration.
//!
//! A sequential state machine over two independently-failable external
//! steps: order creation on the gateway and payment capture in the hosted
//! widget. There is no distributed-transaction rollback; the accepted
//! failure mode is an orphaned pending order on the gateway, which does
//! not decrement real inventory there.
//!
//! States: `Editing → Validating → PlacingOrder → AwaitingPayment →
//! Reconciling → Done`, with `Failed` reachable from the middle states.
//! Validation failure is soft: the flow returns to `Editing` with
//! field-level errors rather than entering `Failed`.
//!
//! The one truly dangerous edge is a reconciliation failure: money
//! captured, order-update call lost. It is surfaced to the shopper as a
//! contact-support outcome instead of being retried, because a blind
//! retry of the order update is not provably idempotent against this
//! gateway. The cart is cleared only after confirmed reconciliation.

pub mod pincode;
pub mod validate;

use thiserror::Error;
use tracing::{info, instrument, warn};

use woolly_core::{CustomerId, OrderId};

use crate::cart::{CartError, CartStore};
use crate::razorpay::{
    CheckoutOptions, PaymentCollector, PaymentOptionsError, PaymentOutcome, Prefill,
};
use crate::storage::KeyValueStore;
use crate::woo::types::{NewCustomer, NewOrder, NewOrderLine};
use crate::woo::{GatewayError, OrderGateway};

use pincode::AreaLookup;
use validate::{FieldErrors, ShippingForm, ValidShipping, validate};

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// Shopper is filling the shipping form.
    #[default]
    Editing,
    /// Form is being validated.
    Validating,
    /// Pending order is being created on the gateway.
    PlacingOrder,
    /// Hosted payment widget is open.
    AwaitingPayment,
    /// Payment captured; order update in flight.
    Reconciling,
    /// Order placed and paid; cart cleared.
    Done,
    /// A gateway step failed hard.
    Failed,
}

/// Inputs the flow needs beyond the cart and the two external seams.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// Publishable payment key.
    pub razorpay_key: String,
    /// Brand name shown on the payment modal.
    pub brand_name: String,
    /// The authenticated customer, if a session is active. When absent the
    /// flow resolves the customer by email on the gateway.
    pub customer: Option<CustomerId>,
}

/// How one `submit` drive through the machine ended.
///
/// This is the single place user-facing failure messaging comes from;
/// everything below the orchestrator reports structured errors upward.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Validation failed; stay on the form. Field-level messages attached.
    InvalidFields(FieldErrors),
    /// Customer resolution or order creation failed; raw error surfaced.
    OrderFailed(GatewayError),
    /// Shopper closed the widget. The pending order stays orphaned on the
    /// gateway; the cart is untouched.
    PaymentDismissed {
        /// The orphaned pending order.
        order_id: OrderId,
    },
    /// The gateway declined or errored the payment attempt.
    PaymentFailed {
        /// The orphaned pending order.
        order_id: OrderId,
        /// The payment gateway's human-readable description.
        description: String,
    },
    /// Payment captured but the order update failed. Support-only
    /// recovery; the shopper must be told payment DID succeed.
    ReconciliationFailed {
        /// Order that should have been marked paid.
        order_id: OrderId,
        /// Captured payment confirmation token.
        payment_id: String,
        /// What the update call failed with.
        error: GatewayError,
    },
    /// Order placed, paid, and reconciled; cart cleared.
    Completed {
        /// The paid order.
        order_id: OrderId,
        /// Payment confirmation token.
        payment_id: String,
        /// Whether a session was active at order time (account vs. login
        /// redirect is the embedder's concern).
        was_authenticated: bool,
    },
}

/// Misuse and arithmetic errors, as opposed to flow outcomes.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// `submit` was called with nothing in the cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The cart total does not convert to a chargeable amount.
    #[error(transparent)]
    Payment(#[from] PaymentOptionsError),

    /// Cart persistence failed before payment was attempted.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// The checkout state machine.
///
/// Generic over the order gateway and the payment collector so tests can
/// script both; production wires in [`crate::woo::WooClient`] and the
/// embedding UI's widget bridge.
pub struct CheckoutFlow<'a, G, P, S: KeyValueStore> {
    gateway: &'a G,
    payments: &'a P,
    cart: &'a mut CartStore<S>,
    ctx: CheckoutContext,
    state: CheckoutState,
}

impl<'a, G, P, S> CheckoutFlow<'a, G, P, S>
where
    G: OrderGateway,
    P: PaymentCollector,
    S: KeyValueStore,
{
    /// Start a flow in the `Editing` state.
    pub fn new(
        gateway: &'a G,
        payments: &'a P,
        cart: &'a mut CartStore<S>,
        ctx: CheckoutContext,
    ) -> Self {
        Self {
            gateway,
            payments,
            cart,
            ctx,
            state: CheckoutState::Editing,
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// Drive the machine from a submitted form to a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns an error for misuse (empty cart) or an unchargeable total;
    /// everything that can go wrong with the external systems comes back
    /// as a [`CheckoutOutcome`], not an error.
    #[instrument(skip(self, form))]
    pub async fn submit(&mut self, form: &ShippingForm) -> Result<CheckoutOutcome, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Validating
        self.state = CheckoutState::Validating;
        let shipping = match validate(form) {
            Ok(shipping) => shipping,
            Err(errors) => {
                self.state = CheckoutState::Editing;
                return Ok(CheckoutOutcome::InvalidFields(errors));
            }
        };

        // PlacingOrder
        self.state = CheckoutState::PlacingOrder;
        let was_authenticated = self.ctx.customer.is_some();
        let customer_id = match self.resolve_customer(&shipping).await {
            Ok(id) => id,
            Err(e) => {
                self.state = CheckoutState::Failed;
                return Ok(CheckoutOutcome::OrderFailed(e));
            }
        };

        let order = match self.gateway.create_order(&self.new_order(customer_id, &shipping)).await
        {
            Ok(order) => order,
            Err(e) => {
                self.state = CheckoutState::Failed;
                return Ok(CheckoutOutcome::OrderFailed(e));
            }
        };
        info!(order_id = %order.id, "Pending order created");

        // AwaitingPayment
        self.state = CheckoutState::AwaitingPayment;
        let options = CheckoutOptions::for_amount(
            &self.ctx.razorpay_key,
            &self.ctx.brand_name,
            &format!("Order #{}", order.id),
            self.cart.cart_total(),
            Prefill::new(&shipping.name, &shipping.email, &shipping.phone),
        )?;

        let payment_id = match self.payments.collect(options).await {
            PaymentOutcome::Completed { payment_id } => payment_id,
            PaymentOutcome::Dismissed => {
                // Orphaned pending order is accepted; no compensating
                // cancellation is sent.
                info!(order_id = %order.id, "Payment widget dismissed");
                self.state = CheckoutState::Editing;
                return Ok(CheckoutOutcome::PaymentDismissed { order_id: order.id });
            }
            PaymentOutcome::Failed { description } => {
                warn!(order_id = %order.id, description = %description, "Payment failed");
                self.state = CheckoutState::Editing;
                return Ok(CheckoutOutcome::PaymentFailed {
                    order_id: order.id,
                    description,
                });
            }
        };

        // Reconciling
        self.state = CheckoutState::Reconciling;
        if let Err(e) = self.gateway.mark_order_paid(order.id, &payment_id).await {
            // Money captured, order not marked paid. Surfaced, not retried:
            // the update is not provably idempotent against this gateway.
            self.state = CheckoutState::Failed;
            warn!(
                order_id = %order.id,
                error = %e,
                "Payment captured but order update failed"
            );
            return Ok(CheckoutOutcome::ReconciliationFailed {
                order_id: order.id,
                payment_id,
                error: e,
            });
        }

        // Done
        if let Err(e) = self.cart.clear() {
            // The order is placed and paid; a persistence hiccup here must
            // not look like a checkout failure.
            warn!(error = %e, "Cart clear after checkout failed");
        }
        self.state = CheckoutState::Done;
        info!(order_id = %order.id, "Checkout complete");

        Ok(CheckoutOutcome::Completed {
            order_id: order.id,
            payment_id,
            was_authenticated,
        })
    }

    async fn resolve_customer(
        &self,
        shipping: &ValidShipping,
    ) -> Result<CustomerId, GatewayError> {
        if let Some(id) = self.ctx.customer {
            return Ok(id);
        }

        if let Some(existing) = self.gateway.find_customer_by_email(&shipping.email).await? {
            info!(customer_id = %existing.id, "Reusing existing customer");
            return Ok(existing.id);
        }

        let created = self
            .gateway
            .create_customer(&NewCustomer {
                email: shipping.email.clone(),
                first_name: shipping.first_name().to_string(),
                last_name: shipping.last_name().to_string(),
                billing: shipping.to_address(),
            })
            .await?;
        info!(customer_id = %created.id, "Created new customer");
        Ok(created.id)
    }

    fn new_order(&self, customer_id: CustomerId, shipping: &ValidShipping) -> NewOrder {
        let address = shipping.to_address();
        NewOrder {
            customer_id,
            billing: address.clone(),
            shipping: address,
            line_items: self
                .cart
                .items()
                .iter()
                .map(|item| NewOrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    size: item.size.clone(),
                })
                .collect(),
            shipping_fee: self.cart.shipping_cost(),
        }
    }
}

/// Fill empty city/state fields from a PIN lookup, best effort.
///
/// Fields the shopper already typed are left alone, an unparseable PIN is
/// ignored without a lookup, and a failed lookup changes nothing.
pub async fn autofill_from_pincode<L: AreaLookup>(lookup: &L, form: &mut ShippingForm) {
    let Ok(pincode) = woolly_core::Pincode::parse(form.pincode.trim()) else {
        return;
    };
    let Some(area) = lookup.lookup(&pincode).await else {
        return;
    };
    if form.city.trim().is_empty() {
        form.city = area.city;
    }
    if form.state.trim().is_empty() {
        form.state = area.state;
    }
}
