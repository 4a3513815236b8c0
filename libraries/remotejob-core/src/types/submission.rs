/// Submission domain types
use super::{Amount, SubmissionId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Progress of a submission
///
/// Approval is tracked separately by `Submission::approved`, so a submission
/// that has been paid out is still `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    /// Started by the worker
    InProgress,
    /// Marked done by the worker, awaiting review
    Completed,
}

impl SubmissionStatus {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::InProgress => "in-progress",
            SubmissionStatus::Completed => "completed",
        }
    }

    /// Parse from database/wire representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in-progress" => Some(SubmissionStatus::InProgress),
            "completed" => Some(SubmissionStatus::Completed),
            _ => None,
        }
    }
}

/// A worker's attempt record against one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Globally unique submission identifier
    pub id: SubmissionId,

    /// Task this submission belongs to
    pub task_id: TaskId,

    /// Worker who started the task
    pub user: UserId,

    /// Progress of the work
    pub status: SubmissionStatus,

    /// Set once, when an administrator approves the payout
    pub approved: bool,

    /// Optional link to delivered work
    pub file_url: Option<String>,

    /// When the task was started (unix seconds)
    pub created_at: i64,

    /// When the task was marked completed
    pub completed_at: Option<i64>,

    /// When the payout was approved
    pub approved_at: Option<i64>,
}

/// Flattened row for the admin approval listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReview {
    /// Submission identifier
    pub submission_id: SubmissionId,
    /// Worker identifier
    pub user_id: UserId,
    /// Worker email
    pub user_email: String,
    /// Worker display name
    pub user_name: String,
    /// Task identifier
    pub task_id: TaskId,
    /// Task title
    pub task_title: String,
    /// Payout that approval would credit
    pub amount: Amount,
    /// Whether the payout has been approved
    pub approved: bool,
}

/// Outcome of a committed approval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalReceipt {
    /// The approved submission
    pub submission: Submission,
    /// Title of the task that was paid
    pub task_title: String,
    /// Amount credited
    pub amount: Amount,
    /// Wallet balance after the credit
    pub wallet_balance: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            SubmissionStatus::from_str("completed"),
            Some(SubmissionStatus::Completed)
        );
        assert_eq!(SubmissionStatus::from_str("approved"), None);
    }
}
