/// Task domain types
use super::{Amount, Submission, TaskId};
use serde::{Deserialize, Serialize};

/// A unit of paid work published by the administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier
    pub id: TaskId,

    /// Short title
    pub title: String,

    /// Longer instructions
    pub description: Option<String>,

    /// Payout for one approved submission
    pub amount: Amount,

    /// Where the work itself is carried out
    pub external_url: Option<String>,

    /// Creation timestamp (unix seconds)
    pub created_at: i64,

    /// Submissions in the order they were started, at most one per user
    pub submissions: Vec<Submission>,
}

/// Data required to create a task
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    /// Short title
    pub title: String,
    /// Longer instructions
    #[serde(default)]
    pub description: Option<String>,
    /// Payout for one approved submission
    pub amount: Amount,
    /// Where the work itself is carried out
    #[serde(default)]
    pub external_url: Option<String>,
}

/// Fields to replace on an existing task; `None` keeps the current value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New payout; only affects approvals made afterwards
    pub amount: Option<Amount>,
    /// New external URL
    pub external_url: Option<String>,
}
