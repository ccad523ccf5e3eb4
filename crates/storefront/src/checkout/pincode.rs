//! Best-effort PIN code to city/state lookup.
//!
//! Queries a public postal-code service to auto-fill city and state while
//! the shopper types. This is pure convenience: every failure mode (network,
//! bad status, unexpected shape, unknown PIN) collapses to `None` and the
//! shopper just types the fields themselves. Checkout never depends on it.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use woolly_core::Pincode;

/// City/state pair for a PIN code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalArea {
    /// District/city name.
    pub city: String,
    /// State name.
    pub state: String,
}

/// The lookup surface the autofill step depends on.
///
/// [`PincodeLookup`] is the production implementation; tests script fakes.
pub trait AreaLookup {
    /// Resolve a PIN code to its district and state, best effort.
    fn lookup(&self, pincode: &Pincode) -> impl Future<Output = Option<PostalArea>>;
}

#[derive(Debug, Deserialize)]
struct LookupJson {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "PostOffice")]
    post_office: Option<Vec<PostOfficeJson>>,
}

#[derive(Debug, Deserialize)]
struct PostOfficeJson {
    #[serde(rename = "District")]
    district: String,
    #[serde(rename = "State")]
    state: String,
}

/// Client for the public postal-code service.
#[derive(Debug, Clone)]
pub struct PincodeLookup {
    client: reqwest::Client,
    base_url: Url,
}

impl PincodeLookup {
    /// Create a lookup client against the given service base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn fetch(&self, pincode: &Pincode) -> Option<PostalArea> {
        let url = self
            .base_url
            .join(&format!("pincode/{pincode}"))
            .inspect_err(|e| debug!(error = %e, "Bad pincode lookup URL"))
            .ok()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| debug!(error = %e, "Pincode lookup request failed"))
            .ok()?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Pincode lookup non-success status");
            return None;
        }

        let results: Vec<LookupJson> = response
            .json()
            .await
            .inspect_err(|e| debug!(error = %e, "Pincode lookup response unreadable"))
            .ok()?;

        let first = results.into_iter().next()?;
        if first.status != "Success" {
            debug!(status = %first.status, "Pincode not found");
            return None;
        }

        let office = first.post_office?.into_iter().next()?;
        Some(PostalArea {
            city: office.district,
            state: office.state,
        })
    }
}

impl AreaLookup for PincodeLookup {
    async fn lookup(&self, pincode: &Pincode) -> Option<PostalArea> {
        self.fetch(pincode).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_payload() {
        let payload = r#"[{
            "Status": "Success",
            "PostOffice": [
                {"District": "Bangalore", "State": "Karnataka"},
                {"District": "Bangalore Rural", "State": "Karnataka"}
            ]
        }]"#;
        let results: Vec<LookupJson> = serde_json::from_str(payload).unwrap();
        let first = results.into_iter().next().unwrap();
        assert_eq!(first.status, "Success");
        let office = first.post_office.unwrap().into_iter().next().unwrap();
        assert_eq!(office.district, "Bangalore");
        assert_eq!(office.state, "Karnataka");
    }

    #[test]
    fn test_parse_error_payload() {
        let payload = r#"[{"Status": "Error", "PostOffice": null}]"#;
        let results: Vec<LookupJson> = serde_json::from_str(payload).unwrap();
        let first = results.into_iter().next().unwrap();
        assert_ne!(first.status, "Success");
        assert!(first.post_office.is_none());
    }
}
