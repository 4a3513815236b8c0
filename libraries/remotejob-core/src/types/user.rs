/// User domain types
use super::{Amount, UserId};
use serde::{Deserialize, Serialize};

/// Kind of account a user registered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    /// Completes tasks for payouts
    Worker,
    /// Posts work
    Customer,
}

impl ProfileType {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Worker => "worker",
            ProfileType::Customer => "customer",
        }
    }

    /// Parse from database/wire representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "worker" => Some(ProfileType::Worker),
            "customer" => Some(ProfileType::Customer),
            _ => None,
        }
    }
}

/// Gender recorded at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

impl Gender {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse from database/wire representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// User account, without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Account kind
    pub profile_type: ProfileType,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Login email, always lowercase
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Gender
    pub gender: Gender,

    /// Country of residence
    pub country: String,

    /// Spendable balance
    pub wallet_balance: Amount,

    /// Whether an administrator has set a withdrawal PIN
    pub has_verify_pin: bool,

    /// Registration timestamp (unix seconds)
    pub registered_at: i64,
}

impl User {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data required to register a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Account kind
    pub profile_type: ProfileType,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Login email (normalized to lowercase on insert)
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Gender
    pub gender: Gender,
    /// Country of residence
    pub country: String,
    /// Already-hashed password
    pub password_hash: String,
}

/// Profile fields a user may change; `None` keeps the current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    /// New first name
    pub first_name: Option<String>,
    /// New last name
    pub last_name: Option<String>,
    /// New country
    pub country: Option<String>,
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
