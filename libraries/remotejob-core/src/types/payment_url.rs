/// Payout URL domain types
use serde::{Deserialize, Serialize};

/// A payout destination registered for a user, keyed by slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUrl {
    /// Slot number, unique per user
    pub slot: i64,

    /// Payout URL
    pub url: String,

    /// Whether the administrator approved this destination
    pub approved: bool,
}

/// Upsert of a payout URL by slot
#[derive(Debug, Clone, Deserialize)]
pub struct SetPaymentUrl {
    /// Slot to create or replace
    pub slot: i64,
    /// Payout URL
    pub url: String,
    /// Approval flag
    #[serde(default)]
    pub approved: bool,
}
