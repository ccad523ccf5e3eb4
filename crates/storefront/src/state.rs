//! Application composition root.

use chrono::Utc;

use crate::cart::CartStore;
use crate::checkout::pincode::PincodeLookup;
use crate::checkout::{CheckoutContext, CheckoutFlow};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::razorpay::PaymentCollector;
use crate::session::{SessionRecord, SessionStore};
use crate::storage::FileStore;
use crate::woo::WooClient;

/// The assembled storefront.
///
/// Owns every long-lived component; all wiring happens in [`App::new`] so
/// the rest of the crate takes its collaborators as constructor arguments
/// and stays testable with fakes.
pub struct App {
    config: StorefrontConfig,
    gateway: WooClient,
    pincode: PincodeLookup,
    cart: CartStore<FileStore>,
    session: SessionStore<FileStore>,
}

impl App {
    /// Assemble the storefront from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let gateway = WooClient::new(&config);
        let pincode = PincodeLookup::new(config.pincode_api_url.clone());
        let store = FileStore::open(&config.data_dir)?;
        let cart = CartStore::load(store.clone(), config.shipping());
        let session = SessionStore::new(store, config.session_freshness());

        Ok(Self {
            config,
            gateway,
            pincode,
            cart,
            session,
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The store gateway client.
    #[must_use]
    pub const fn gateway(&self) -> &WooClient {
        &self.gateway
    }

    /// The postal PIN lookup client.
    #[must_use]
    pub const fn pincode(&self) -> &PincodeLookup {
        &self.pincode
    }

    /// The cart store.
    pub fn cart(&mut self) -> &mut CartStore<FileStore> {
        &mut self.cart
    }

    /// Read-only view of the cart store.
    #[must_use]
    pub const fn cart_view(&self) -> &CartStore<FileStore> {
        &self.cart
    }

    /// The session store.
    pub fn session(&mut self) -> &mut SessionStore<FileStore> {
        &mut self.session
    }

    /// Restore the persisted session against the live gateway.
    pub async fn restore_session(&mut self) -> Option<&SessionRecord> {
        self.session.restore(&self.gateway, Utc::now()).await
    }

    /// Start a checkout over the live gateway and the given payment
    /// collector, capturing the current session's customer if any.
    pub fn checkout<'a, P: PaymentCollector>(
        &'a mut self,
        payments: &'a P,
    ) -> CheckoutFlow<'a, WooClient, P, FileStore> {
        let ctx = CheckoutContext {
            razorpay_key: self.config.razorpay_key_id.clone(),
            brand_name: self.config.brand_name.clone(),
            customer: self.session.customer_id(),
        };
        CheckoutFlow::new(&self.gateway, payments, &mut self.cart, ctx)
    }
}
