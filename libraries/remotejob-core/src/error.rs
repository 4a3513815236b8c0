/// Core error types for RemoteJob
use thiserror::Error;

/// Result type alias using `MarketError`
pub type Result<T> = std::result::Result<T, MarketError>;

/// Core error type for the marketplace
///
/// Variants are grouped by how the serving layer reports them: missing
/// entities, lifecycle violations, business-rule rejections, and internal
/// failures of the store.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A submission for this user and task already exists
    #[error("Already started")]
    AlreadyStarted,

    /// Attempt requested without a prior start
    #[error("Task not started yet")]
    NotStarted,

    /// Submission was already marked completed
    #[error("Already completed")]
    AlreadyCompleted,

    /// Approval requested for a submission that is still in progress
    #[error("Submission not completed yet")]
    NotCompleted,

    /// Submission was already approved and paid out
    #[error("Submission already approved")]
    AlreadyApproved,

    /// Withdrawal attempted before an administrator set a PIN
    #[error("No PIN set for user")]
    NoPinConfigured,

    /// Supplied PIN does not match the stored one
    #[error("Invalid PIN")]
    InvalidPin,

    /// Withdrawal amount exceeds the wallet balance
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// A credit would push the wallet past the largest representable amount
    #[error("Wallet balance limit exceeded")]
    BalanceLimitExceeded,

    /// Duplicate entry
    #[error("{0}")]
    Duplicate(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// How a `MarketError` should be reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The addressed entity does not exist
    NotFound,
    /// Operation attempted in the wrong lifecycle state
    InvalidState,
    /// Request rejected by a business rule (PIN, funds, duplicates, validation)
    Rejected,
    /// The store failed; details must not reach the caller
    Internal,
}

impl MarketError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Classify the error for the serving layer
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyStarted
            | Self::NotStarted
            | Self::AlreadyCompleted
            | Self::NotCompleted
            | Self::AlreadyApproved => ErrorClass::InvalidState,
            Self::NoPinConfigured
            | Self::InvalidPin
            | Self::InsufficientFunds
            | Self::BalanceLimitExceeded
            | Self::Duplicate(_)
            | Self::InvalidInput(_) => ErrorClass::Rejected,
            Self::Storage(_)
            | Self::Database(_)
            | Self::Notification(_)
            | Self::Serialization(_) => ErrorClass::Internal,
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for MarketError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
