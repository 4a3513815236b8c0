//! RemoteJob Core
//!
//! Storage-agnostic domain types, traits, and error handling for the RemoteJob
//! task marketplace.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Task`, `Submission`, `Message`, `PaymentUrl`, `Withdrawal`
//! - **Money**: `Amount`, an exact cent-based wallet amount
//! - **Core Traits**: `StorageContext` (persistence seam) and `Notifier` (admin channel)
//! - **Error Handling**: Unified `MarketError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use remotejob_core::types::{Amount, SubmissionStatus};
//!
//! let payout = Amount::from_major(50.0).unwrap();
//! assert_eq!(payout.to_string(), "50.00");
//!
//! // Wallet amounts are capped so they stay exact on the wire
//! assert!(Amount::from_major(1e20).is_err());
//!
//! assert_eq!(SubmissionStatus::from_str("in-progress"), Some(SubmissionStatus::InProgress));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod notify;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorClass, MarketError, Result};
pub use notify::Notifier;
pub use storage::StorageContext;

pub use types::{
    Amount, ApprovalReceipt, CreateTask, CreateUser, Gender, Message, PaymentUrl, ProfileType,
    SetPaymentUrl, Submission, SubmissionId, SubmissionReview, SubmissionStatus, Task, TaskId, UpdateProfile,
    UpdateTask, User, UserId, Withdrawal, WithdrawalRequest,
};
