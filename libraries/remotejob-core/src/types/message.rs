/// Inbox message domain type
use serde::{Deserialize, Serialize};

/// Sender label for workflow-generated messages
pub const SYSTEM_SENDER: &str = "System";

/// Sender label for messages written by the administrator
pub const ADMIN_SENDER: &str = "Admin";

/// One entry of a user's append-only inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Insertion-ordered identifier
    pub id: i64,

    /// Sender label
    pub from: String,

    /// Message body
    pub content: String,

    /// When the message was appended (unix seconds)
    pub date: i64,
}
