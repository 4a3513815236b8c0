/// Wallet domain types
use super::{Amount, UserId};
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};

/// A validated withdrawal request, before PIN verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Amount to debit
    pub amount: Amount,
    /// Currency the payout is made in
    pub crypto: String,
    /// Destination address
    pub address: String,
}

impl WithdrawalRequest {
    /// Validate a withdrawal request
    pub fn new(amount: Amount, crypto: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        let crypto = crypto.into().trim().to_string();
        let address = address.into().trim().to_string();

        if amount.is_zero() {
            return Err(MarketError::invalid_input("amount must be greater than zero"));
        }
        if crypto.is_empty() {
            return Err(MarketError::invalid_input("crypto is required"));
        }
        if address.is_empty() {
            return Err(MarketError::invalid_input("address is required"));
        }

        Ok(Self {
            amount,
            crypto,
            address,
        })
    }
}

/// A committed withdrawal, as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    /// Ledger identifier
    pub id: i64,
    /// User whose wallet was debited
    pub user_id: UserId,
    /// Amount debited
    pub amount: Amount,
    /// Currency of the payout
    pub crypto: String,
    /// Destination address
    pub address: String,
    /// Wallet balance right after the debit
    pub balance_after: Amount,
    /// When the withdrawal was processed (unix seconds)
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_amount() {
        let err = WithdrawalRequest::new(Amount::ZERO, "BTC", "bc1q").unwrap_err();
        assert!(matches!(err, MarketError::InvalidInput(_)));
    }

    #[test]
    fn rejects_blank_destination() {
        let amount = Amount::from_cents(100).unwrap();
        assert!(WithdrawalRequest::new(amount, "BTC", "   ").is_err());
        assert!(WithdrawalRequest::new(amount, "", "bc1q").is_err());
    }

    #[test]
    fn trims_fields() {
        let amount = Amount::from_cents(100).unwrap();
        let req = WithdrawalRequest::new(amount, " USDT ", " T9yD ").unwrap();
        assert_eq!(req.crypto, "USDT");
        assert_eq!(req.address, "T9yD");
    }
}
