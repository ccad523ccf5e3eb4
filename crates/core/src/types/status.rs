//! Status enums for gateway-owned entities.

use serde::{Deserialize, Serialize};

/// Order status on the gateway.
///
/// The storefront only ever writes two transitions: orders are created as
/// `Pending` and moved to `Processing` once payment is reconciled. A
/// pending order whose payment never completes simply stays pending
/// (orphaned) on the gateway side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    #[default]
    Pending,
    /// Paid, being fulfilled.
    Processing,
    /// Payment failed on the gateway side.
    Failed,
    /// Fulfilled and shipped.
    Completed,
    /// Cancelled on the gateway side.
    Cancelled,
}

impl OrderStatus {
    /// The gateway's wire value for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}
