//! Wallet amounts
//!
//! Balances and payouts are held as integer cents so credits and debits are
//! exact. On the wire they travel as decimal numbers of whole currency units.

use crate::error::{MarketError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A non-negative amount of money in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero amount
    pub const ZERO: Amount = Amount(0);

    /// Largest amount, 2^53 - 1 cents
    pub const MAX: Amount = Amount(9_007_199_254_740_991);

    /// Create an amount from cents, rejecting negative values
    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(MarketError::invalid_input("amount must not be negative"));
        }
        if cents > Self::MAX.0 {
            return Err(MarketError::invalid_input("amount is too large"));
        }
        Ok(Self(cents))
    }

    /// Create an amount from whole currency units, rounding to the nearest cent
    pub fn from_major(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(MarketError::invalid_input("amount must be a finite number"));
        }
        let cents = (value * 100.0).round();
        if cents < 0.0 {
            return Err(MarketError::invalid_input("amount must not be negative"));
        }
        if cents > Self::MAX.0 as f64 {
            return Err(MarketError::invalid_input("amount is too large"));
        }
        Ok(Self(cents as i64))
    }

    /// Amount in cents
    pub fn cents(self) -> i64 {
        self.0
    }

    /// Amount in whole currency units
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whether the amount is zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, `None` above `Amount::MAX`
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0
            .checked_add(other.0)
            .filter(|sum| *sum <= Self::MAX.0)
            .map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_major(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Amount::from_cents(5000).unwrap().to_string(), "50.00");
        assert_eq!(Amount::from_cents(1005).unwrap().to_string(), "10.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(Amount::from_major(19.999).unwrap().cents(), 2000);
        assert_eq!(Amount::from_major(12.5).unwrap().cents(), 1250);
        assert_eq!(Amount::from_major(0.1 + 0.2).unwrap().cents(), 30);
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(Amount::from_major(-1.0).is_err());
        assert!(Amount::from_major(f64::NAN).is_err());
        assert!(Amount::from_major(f64::INFINITY).is_err());
        assert!(Amount::from_cents(-5).is_err());
    }

    #[test]
    fn rejects_amounts_above_max() {
        assert!(Amount::from_major(9.2e16).is_err());
        assert!(Amount::from_cents(i64::MAX).is_err());
        assert_eq!(Amount::from_cents(Amount::MAX.cents()).unwrap(), Amount::MAX);
        assert!(serde_json::from_str::<Amount>("1e20").is_err());
    }

    #[test]
    fn checked_add_stops_at_max() {
        let one = Amount::from_cents(1).unwrap();
        assert_eq!(one.checked_add(one), Some(Amount::from_cents(2).unwrap()));
        assert_eq!(Amount::MAX.checked_add(Amount::ZERO), Some(Amount::MAX));
        assert_eq!(Amount::MAX.checked_add(one), None);
    }

    #[test]
    fn json_uses_major_units() {
        let amount: Amount = serde_json::from_str("40").unwrap();
        assert_eq!(amount.cents(), 4000);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "40.0");
        assert!(serde_json::from_str::<Amount>("-3").is_err());
    }
}
