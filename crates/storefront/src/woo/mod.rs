//! WooCommerce REST gateway client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; the gateway is the source of truth, there
//!   is no local sync
//! - Wire shapes live in [`wire`], strict domain types in [`types`], and
//!   the mapping between them in [`conversions`]
//! - The catalog is cached in-memory via `moka` (5-minute TTL); customer
//!   and order calls are never cached (mutable state)
//! - Authentication is injected by the store's API proxy in front of the
//!   gateway; this client sends no credentials
//!
//! # Example
//!
//! ```rust,ignore
//! use woolly_storefront::woo::WooClient;
//!
//! let client = WooClient::new(&config);
//! let products = client.get_products().await?;
//! let order = client.create_order(&new_order).await?;
//! ```

pub mod conversions;
pub mod types;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use woolly_core::{CustomerId, Email, OrderId, OrderStatus};

use crate::config::StorefrontConfig;
use conversions::{address_to_wire, convert_customer, convert_order, convert_product};
use types::{Customer, NewCustomer, NewOrder, Order, Product};
use wire::{
    CreateCustomerBody, CreateOrderBody, CreateOrderLineBody, CustomerJson, MarkPaidBody,
    MetaJson, OrderJson, ProductJson, ShippingLineBody,
};

/// Errors that can occur when talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-success status.
    #[error("gateway returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The gateway's data failed boundary validation.
    #[error("invalid gateway data: {0}")]
    InvalidData(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// The order/customer surface the checkout orchestrator depends on.
///
/// [`WooClient`] is the production implementation; tests script fakes.
pub trait OrderGateway {
    /// Look up an existing customer by email.
    fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<Customer>, GatewayError>>;

    /// Create a new customer.
    fn create_customer(
        &self,
        new_customer: &NewCustomer,
    ) -> impl Future<Output = Result<Customer, GatewayError>>;

    /// Create a pending order.
    fn create_order(&self, new_order: &NewOrder)
    -> impl Future<Output = Result<Order, GatewayError>>;

    /// Mark an order paid with the gateway-confirmed payment id.
    fn mark_order_paid(
        &self,
        order_id: OrderId,
        payment_id: &str,
    ) -> impl Future<Output = Result<Order, GatewayError>>;
}

/// The customer-refresh surface the session store depends on.
pub trait CustomerSource {
    /// Fetch a customer by id.
    fn fetch_customer(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Customer, GatewayError>>;
}

/// Maximum body length echoed into errors and logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the WooCommerce-style REST gateway.
///
/// Cheaply cloneable; the catalog cache is shared across clones.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog_cache: Cache<String, Vec<Product>>,
}

const CATALOG_CACHE_KEY: &str = "products";

impl WooClient {
    /// Create a new gateway client from configuration.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(WooClientInner {
                client: reqwest::Client::new(),
                base_url: config.store_api_url.clone(),
                catalog_cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| GatewayError::InvalidData(format!("bad endpoint {path:?}: {e}")))
    }

    /// Send a prepared request and parse the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let truncated: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::error!(
                status = %status,
                body = %truncated,
                "Gateway returned non-success status"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncated,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse gateway response"
            );
            GatewayError::Parse(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path)?;
        self.execute(self.inner.client.get(url).query(query)).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path)?;
        self.execute(self.inner.client.post(url).json(body)).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path)?;
        self.execute(self.inner.client.put(url).json(body)).await
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// Fetch the full catalog.
    ///
    /// Cached for 5 minutes; the storefront loads this wholesale at start.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a product fails boundary
    /// validation.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, GatewayError> {
        if let Some(products) = self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let raw: Vec<ProductJson> = self
            .get_json("products", &[("per_page", "100".to_string())])
            .await?;

        let products = raw
            .into_iter()
            .map(convert_product)
            .collect::<Result<Vec<_>, _>>()?;

        self.inner
            .catalog_cache
            .insert(CATALOG_CACHE_KEY.to_string(), products.clone())
            .await;

        Ok(products)
    }

    /// Invalidate the cached catalog.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog_cache.invalidate(CATALOG_CACHE_KEY).await;
    }

    // =========================================================================
    // Customers (not cached - mutable state)
    // =========================================================================

    /// Fetch a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the gateway has no such customer, or an error
    /// if the request fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, GatewayError> {
        let result: Result<CustomerJson, GatewayError> =
            self.get_json(&format!("customers/{id}"), &[]).await;
        match result {
            Ok(json) => convert_customer(json),
            Err(GatewayError::Status { status: 404, .. }) => {
                Err(GatewayError::NotFound(format!("customer {id}")))
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Orders (not cached - mutable state)
    // =========================================================================

    /// Fetch a customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an order fails boundary
    /// validation.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, GatewayError> {
        let raw: Vec<OrderJson> = self
            .get_json("orders", &[("customer", customer_id.to_string())])
            .await?;
        raw.into_iter().map(convert_order).collect()
    }
}

impl OrderGateway for WooClient {
    #[instrument(skip(self, email))]
    async fn find_customer_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Customer>, GatewayError> {
        let raw: Vec<CustomerJson> = self
            .get_json("customers", &[("email", email.as_str().to_string())])
            .await?;
        raw.into_iter().next().map(convert_customer).transpose()
    }

    #[instrument(skip(self, new_customer))]
    async fn create_customer(&self, new_customer: &NewCustomer) -> Result<Customer, GatewayError> {
        let body = CreateCustomerBody {
            email: new_customer.email.as_str().to_string(),
            first_name: new_customer.first_name.clone(),
            last_name: new_customer.last_name.clone(),
            billing: address_to_wire(&new_customer.billing),
        };
        let raw: CustomerJson = self.post_json("customers", &body).await?;
        convert_customer(raw)
    }

    #[instrument(skip(self, new_order), fields(customer_id = %new_order.customer_id))]
    async fn create_order(&self, new_order: &NewOrder) -> Result<Order, GatewayError> {
        let raw: OrderJson = self.post_json("orders", &order_body(new_order)).await?;
        convert_order(raw)
    }

    #[instrument(skip(self, payment_id), fields(order_id = %order_id))]
    async fn mark_order_paid(
        &self,
        order_id: OrderId,
        payment_id: &str,
    ) -> Result<Order, GatewayError> {
        let body = MarkPaidBody {
            status: OrderStatus::Processing.as_str().to_string(),
            set_paid: true,
            transaction_id: payment_id.to_string(),
        };
        let raw: OrderJson = self.put_json(&format!("orders/{order_id}"), &body).await?;
        convert_order(raw)
    }
}

impl CustomerSource for WooClient {
    async fn fetch_customer(&self, id: CustomerId) -> Result<Customer, GatewayError> {
        self.get_customer(id).await
    }
}

/// Build the `POST orders` body for a pending order.
fn order_body(new_order: &NewOrder) -> CreateOrderBody {
    let shipping_lines = if new_order.shipping_fee.amount.is_zero() {
        Vec::new()
    } else {
        vec![ShippingLineBody {
            method_id: "flat_rate".to_string(),
            method_title: "Flat Rate".to_string(),
            total: format!("{:.2}", new_order.shipping_fee.amount),
        }]
    };

    CreateOrderBody {
        customer_id: new_order.customer_id.as_i64(),
        status: OrderStatus::Pending.as_str().to_string(),
        set_paid: false,
        billing: address_to_wire(&new_order.billing),
        shipping: address_to_wire(&new_order.shipping),
        line_items: new_order
            .line_items
            .iter()
            .map(|line| CreateOrderLineBody {
                product_id: line.product_id.as_i64(),
                quantity: i64::from(line.quantity),
                meta_data: vec![MetaJson {
                    key: "size".to_string(),
                    value: serde_json::Value::String(line.size.clone()),
                }],
            })
            .collect(),
        shipping_lines,
    }
}
