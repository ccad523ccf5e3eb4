//! Persisted account session with a freshness window.
//!
//! A session is a locally persisted customer snapshot plus an auth token.
//! The snapshot is trusted for thirty minutes (configurable) after it was
//! last written; after that it must be re-confirmed against the gateway
//! before it counts as logged in. A fresh snapshot is still refreshed
//! opportunistically, but a refresh failure there is swallowed. The
//! asymmetry is deliberate: a recently-confirmed session should survive a
//! blip in connectivity, while a day-old one should not survive a revoked
//! account.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use woolly_core::{CustomerId, Email};

use crate::storage::{KeyValueStore, StorageError, keys};
use crate::woo::CustomerSource;
use crate::woo::types::{Address, Customer};

/// Default freshness window.
pub const DEFAULT_FRESHNESS: Duration = Duration::minutes(30);

/// The persisted customer snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Gateway-issued customer ID.
    pub customer_id: CustomerId,
    /// Account email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Billing address on file, if any.
    pub address: Option<Address>,
    /// When this snapshot was last confirmed against the gateway.
    pub last_updated: DateTime<Utc>,
}

impl SessionRecord {
    fn from_customer(customer: &Customer, now: DateTime<Utc>) -> Self {
        Self {
            customer_id: customer.id,
            email: customer.email.clone(),
            name: customer.display_name(),
            address: customer.billing.clone(),
            last_updated: now,
        }
    }

    /// Leftover placeholder records from before real accounts existed.
    /// They look logged-in but reference no real customer.
    fn is_sentinel(&self) -> bool {
        self.customer_id.as_i64() == 0 || self.name == "Guest User"
    }

    fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_updated < window
    }
}

/// Local session state backed by durable storage.
pub struct SessionStore<S: KeyValueStore> {
    storage: S,
    freshness: Duration,
    record: Option<SessionRecord>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Create a store over the given storage with a freshness window.
    pub const fn new(storage: S, freshness: Duration) -> Self {
        Self {
            storage,
            freshness,
            record: None,
        }
    }

    /// The restored customer snapshot, if logged in.
    #[must_use]
    pub fn customer(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    /// The customer ID, if logged in.
    #[must_use]
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.record.as_ref().map(|r| r.customer_id)
    }

    /// The stored auth token, if logged in.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.storage.get(keys::AUTH_TOKEN).ok().flatten()
    }

    /// Restore the persisted session, re-confirming against the gateway
    /// as the freshness window requires.
    ///
    /// Returns the restored snapshot, or `None` when there is no usable
    /// session. Storage failures degrade to logged out rather than
    /// erroring; a session is a cache, not a source of truth.
    #[instrument(skip(self, source, now))]
    pub async fn restore<C: CustomerSource>(
        &mut self,
        source: &C,
        now: DateTime<Utc>,
    ) -> Option<&SessionRecord> {
        let Some(record) = self.load_record() else {
            self.record = None;
            return None;
        };

        if self.auth_token().is_none() {
            debug!("Session record present but auth token missing");
            self.tear_down();
            return None;
        }

        if record.is_sentinel() {
            info!("Discarding placeholder session record");
            self.tear_down();
            return None;
        }

        if record.is_fresh(now, self.freshness) {
            // Best effort; a fresh snapshot stands on its own.
            match source.fetch_customer(record.customer_id).await {
                Ok(customer) => self.store_record(SessionRecord::from_customer(&customer, now)),
                Err(e) => {
                    debug!(error = %e, "Fresh session refresh failed; keeping snapshot");
                    self.record = Some(record);
                }
            }
        } else {
            // A stale snapshot must be re-confirmed or it is torn down.
            match source.fetch_customer(record.customer_id).await {
                Ok(customer) => self.store_record(SessionRecord::from_customer(&customer, now)),
                Err(e) => {
                    info!(error = %e, "Stale session could not be re-confirmed");
                    self.tear_down();
                    return None;
                }
            }
        }

        self.record.as_ref()
    }

    /// Persist a session for a just-authenticated customer.
    ///
    /// # Errors
    ///
    /// Returns an error if either blob cannot be written.
    pub fn login(
        &mut self,
        customer: &Customer,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let record = SessionRecord::from_customer(customer, now);
        let blob =
            serde_json::to_string(&record).map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        self.storage.set(keys::SESSION, &blob)?;
        self.storage.set(keys::AUTH_TOKEN, token)?;
        self.record = Some(record);
        info!(customer_id = %customer.id, "Session established");
        Ok(())
    }

    /// Tear down the session and forget the customer.
    pub fn logout(&mut self) {
        self.tear_down();
        info!("Session ended");
    }

    fn load_record(&self) -> Option<SessionRecord> {
        let blob = match self.storage.get(keys::SESSION) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Session blob unreadable");
                return None;
            }
        };
        match serde_json::from_str(&blob) {
            Ok(record) => Some(record),
            Err(e) => {
                // Old or corrupt shape; discard rather than guess.
                warn!(error = %e, "Discarding undecodable session blob");
                None
            }
        }
    }

    fn store_record(&mut self, record: SessionRecord) {
        match serde_json::to_string(&record) {
            Ok(blob) => {
                if let Err(e) = self.storage.set(keys::SESSION, &blob) {
                    warn!(error = %e, "Session blob write failed");
                }
            }
            Err(e) => warn!(error = %e, "Session blob encode failed"),
        }
        self.record = Some(record);
    }

    fn tear_down(&mut self) {
        self.record = None;
        if let Err(e) = self.storage.remove(keys::SESSION) {
            warn!(error = %e, "Session blob removal failed");
        }
        if let Err(e) = self.storage.remove(keys::AUTH_TOKEN) {
            warn!(error = %e, "Auth token removal failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::woo::GatewayError;

    struct FakeSource {
        result: Result<Customer, ()>,
    }

    impl FakeSource {
        fn ok(customer: Customer) -> Self {
            Self {
                result: Ok(customer),
            }
        }

        fn failing() -> Self {
            Self { result: Err(()) }
        }
    }

    impl CustomerSource for FakeSource {
        async fn fetch_customer(&self, _id: CustomerId) -> Result<Customer, GatewayError> {
            self.result.clone().map_err(|()| GatewayError::Status {
                status: 401,
                body: "unauthorized".to_string(),
            })
        }
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(42),
            email: Email::parse("asha@example.com").unwrap(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            billing: None,
        }
    }

    fn store_with_session(last_updated: DateTime<Utc>) -> SessionStore<MemoryStore> {
        let storage = MemoryStore::new();
        let record = SessionRecord {
            customer_id: CustomerId::new(42),
            email: Email::parse("asha@example.com").unwrap(),
            name: "Asha Rao".to_string(),
            address: None,
            last_updated,
        };
        storage
            .set(keys::SESSION, &serde_json::to_string(&record).unwrap())
            .unwrap();
        storage.set(keys::AUTH_TOKEN, "tok_123").unwrap();
        SessionStore::new(storage, DEFAULT_FRESHNESS)
    }

    #[tokio::test]
    async fn test_no_record_means_logged_out() {
        let mut store = SessionStore::new(MemoryStore::new(), DEFAULT_FRESHNESS);
        let source = FakeSource::ok(customer());
        assert!(store.restore(&source, Utc::now()).await.is_none());
    }

    #[tokio::test]
    async fn test_record_without_token_is_torn_down() {
        let now = Utc::now();
        let store = store_with_session(now);
        store.storage.remove(keys::AUTH_TOKEN).unwrap();
        let mut store = store;
        let source = FakeSource::ok(customer());

        assert!(store.restore(&source, now).await.is_none());
        assert!(store.storage.get(keys::SESSION).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sentinel_record_is_discarded() {
        let storage = MemoryStore::new();
        let record = SessionRecord {
            customer_id: CustomerId::new(0),
            email: Email::parse("guest@example.com").unwrap(),
            name: "Guest User".to_string(),
            address: None,
            last_updated: Utc::now(),
        };
        storage
            .set(keys::SESSION, &serde_json::to_string(&record).unwrap())
            .unwrap();
        storage.set(keys::AUTH_TOKEN, "tok_stale").unwrap();
        let mut store = SessionStore::new(storage, DEFAULT_FRESHNESS);
        let source = FakeSource::ok(customer());

        assert!(store.restore(&source, Utc::now()).await.is_none());
        assert!(store.storage.get(keys::SESSION).unwrap().is_none());
        assert!(store.storage.get(keys::AUTH_TOKEN).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fresh_session_survives_refresh_failure() {
        let now = Utc::now();
        let mut store = store_with_session(now - Duration::minutes(5));
        let source = FakeSource::failing();

        let restored = store.restore(&source, now).await;
        assert!(restored.is_some());
        assert_eq!(store.customer_id(), Some(CustomerId::new(42)));
    }

    #[tokio::test]
    async fn test_stale_session_requires_successful_refresh() {
        let now = Utc::now();
        let mut store = store_with_session(now - Duration::minutes(45));
        let source = FakeSource::failing();

        assert!(store.restore(&source, now).await.is_none());
        assert!(store.customer().is_none());
        assert!(store.storage.get(keys::SESSION).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_session_refreshes_on_success() {
        let now = Utc::now();
        let mut store = store_with_session(now - Duration::minutes(45));
        let source = FakeSource::ok(customer());

        let restored = store.restore(&source, now).await.cloned();
        assert_eq!(
            restored.map(|r| r.customer_id),
            Some(CustomerId::new(42))
        );

        // The blob was rewritten with the refresh time.
        let blob = store.storage.get(keys::SESSION).unwrap().unwrap();
        let record: SessionRecord = serde_json::from_str(&blob).unwrap();
        assert_eq!(record.last_updated, now);
    }

    #[tokio::test]
    async fn test_boundary_age_is_stale() {
        let now = Utc::now();
        let mut store = store_with_session(now - DEFAULT_FRESHNESS);
        let source = FakeSource::failing();

        // Exactly thirty minutes old is no longer fresh.
        assert!(store.restore(&source, now).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_blob_means_logged_out() {
        let storage = MemoryStore::new();
        storage.set(keys::SESSION, "{not json").unwrap();
        storage.set(keys::AUTH_TOKEN, "tok").unwrap();
        let mut store = SessionStore::new(storage, DEFAULT_FRESHNESS);
        let source = FakeSource::ok(customer());

        assert!(store.restore(&source, Utc::now()).await.is_none());
    }

    #[test]
    fn test_login_logout_round_trip() {
        let mut store = SessionStore::new(MemoryStore::new(), DEFAULT_FRESHNESS);
        let now = Utc::now();

        store.login(&customer(), "tok_live", now).unwrap();
        assert_eq!(store.customer_id(), Some(CustomerId::new(42)));
        assert_eq!(store.auth_token().as_deref(), Some("tok_live"));

        store.logout();
        assert!(store.customer().is_none());
        assert!(store.auth_token().is_none());
    }
}
