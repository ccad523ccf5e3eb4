//! Scripted stand-ins for the external systems.
//!
//! The gateway fake records which endpoints were hit so scenarios can
//! assert on sequencing (for example, that validation failures never reach
//! the gateway). The payment fake plays back a single scripted outcome.

use std::sync::Mutex;

use woolly_core::{CustomerId, Email, OrderId, OrderStatus, Price};
use woolly_storefront::razorpay::{CheckoutOptions, PaymentCollector, PaymentOutcome};
use woolly_storefront::woo::types::{Customer, NewCustomer, NewOrder, Order, OrderLine};
use woolly_storefront::woo::{CustomerSource, GatewayError, OrderGateway};

/// A gateway whose responses are scripted and whose calls are recorded.
#[derive(Default)]
pub struct RecordingGateway {
    /// Result of `find_customer_by_email`.
    pub known_customer: Option<Customer>,
    /// Make `create_order` fail with a 500.
    pub fail_create_order: bool,
    /// Make `mark_order_paid` fail with a 500.
    pub fail_mark_paid: bool,
    /// Make `fetch_customer` fail with a 401.
    pub fail_fetch_customer: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

impl RecordingGateway {
    /// Whether the named endpoint was hit.
    pub fn called(&self, name: &str) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .any(|c| *c == name)
    }

    /// Endpoints hit, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, name: &'static str) {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(name);
    }

    fn server_error() -> GatewayError {
        GatewayError::Status {
            status: 500,
            body: "internal error".to_string(),
        }
    }
}

impl OrderGateway for RecordingGateway {
    async fn find_customer_by_email(
        &self,
        _email: &Email,
    ) -> Result<Option<Customer>, GatewayError> {
        self.record("find_customer_by_email");
        Ok(self.known_customer.clone())
    }

    async fn create_customer(&self, new_customer: &NewCustomer) -> Result<Customer, GatewayError> {
        self.record("create_customer");
        Ok(Customer {
            id: CustomerId::new(501),
            email: new_customer.email.clone(),
            first_name: new_customer.first_name.clone(),
            last_name: new_customer.last_name.clone(),
            billing: Some(new_customer.billing.clone()),
        })
    }

    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, GatewayError> {
        self.record("create_order");
        if self.fail_create_order {
            return Err(Self::server_error());
        }
        Ok(Order {
            id: OrderId::new(9001),
            status: OrderStatus::Pending,
            total: new_order.shipping_fee,
            line_items: new_order
                .line_items
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    name: String::new(),
                    quantity: line.quantity,
                })
                .collect(),
        })
    }

    async fn mark_order_paid(
        &self,
        order_id: OrderId,
        _payment_id: &str,
    ) -> Result<Order, GatewayError> {
        self.record("mark_order_paid");
        if self.fail_mark_paid {
            return Err(Self::server_error());
        }
        Ok(Order {
            id: order_id,
            status: OrderStatus::Processing,
            total: Price::rupees(0),
            line_items: vec![],
        })
    }
}

impl CustomerSource for RecordingGateway {
    async fn fetch_customer(&self, id: CustomerId) -> Result<Customer, GatewayError> {
        self.record("fetch_customer");
        if self.fail_fetch_customer {
            return Err(GatewayError::Status {
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        self.known_customer
            .clone()
            .map_or_else(|| Err(GatewayError::NotFound(format!("customer {id}"))), Ok)
    }
}

/// A payment widget that plays back one scripted outcome.
pub struct ScriptedCollector {
    outcome: PaymentOutcome,
    options_seen: Mutex<Vec<CheckoutOptions>>,
}

impl ScriptedCollector {
    /// Script the widget to report a captured payment.
    #[must_use]
    pub fn paying(payment_id: &str) -> Self {
        Self::new(PaymentOutcome::Completed {
            payment_id: payment_id.to_string(),
        })
    }

    /// Script the widget to be closed without paying.
    #[must_use]
    pub fn dismissed() -> Self {
        Self::new(PaymentOutcome::Dismissed)
    }

    /// Script the widget to report a failed payment attempt.
    #[must_use]
    pub fn declining(description: &str) -> Self {
        Self::new(PaymentOutcome::Failed {
            description: description.to_string(),
        })
    }

    fn new(outcome: PaymentOutcome) -> Self {
        Self {
            outcome,
            options_seen: Mutex::new(Vec::new()),
        }
    }

    /// The options each invocation was handed.
    pub fn options_seen(&self) -> Vec<CheckoutOptions> {
        self.options_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl PaymentCollector for ScriptedCollector {
    async fn collect(&self, options: CheckoutOptions) -> PaymentOutcome {
        self.options_seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(options);
        self.outcome.clone()
    }
}
