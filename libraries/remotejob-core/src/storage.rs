//! Storage trait for the marketplace

use crate::error::Result;
use crate::types::{
    Amount, ApprovalReceipt, CreateTask, CreateUser, Message, PaymentUrl, SetPaymentUrl,
    Submission, SubmissionId, SubmissionReview, Task, TaskId, UpdateProfile, UpdateTask, User,
    UserId, Withdrawal, WithdrawalRequest,
};
use async_trait::async_trait;

/// Storage context providing access to database operations
///
/// Every mutating workflow step (`start_submission`, `complete_submission`,
/// `approve_submission`, `withdraw`) is atomic on its own: implementations
/// must guarantee that concurrent callers, possibly in other processes,
/// cannot observe or produce a half-applied transition.
#[async_trait]
pub trait StorageContext: Send + Sync {
    // ========================================================================
    // Accounts
    // ========================================================================

    /// Register a new user; `Duplicate` if the email is taken
    async fn create_user(&self, user: CreateUser) -> Result<User>;

    /// Get user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get user by email (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get all users, newest registration first
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Get a user together with their password hash, for login
    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Update profile fields
    async fn update_profile(&self, id: &UserId, update: UpdateProfile) -> Result<User>;

    /// Store the hash of a user's withdrawal PIN
    async fn set_verify_pin_hash(&self, id: &UserId, pin_hash: &str) -> Result<()>;

    /// Get the hash of a user's withdrawal PIN, `None` if no PIN is set
    async fn get_verify_pin_hash(&self, id: &UserId) -> Result<Option<String>>;

    // ========================================================================
    // Inbox
    // ========================================================================

    /// Append a message to a user's inbox
    async fn append_message(&self, id: &UserId, from: &str, content: &str) -> Result<Message>;

    /// Get a user's inbox in append order
    async fn get_messages(&self, id: &UserId) -> Result<Vec<Message>>;

    // ========================================================================
    // Payout URLs
    // ========================================================================

    /// Create or replace the payout URL in a slot
    async fn set_payment_url(&self, id: &UserId, url: SetPaymentUrl) -> Result<PaymentUrl>;

    /// Get a user's payout URLs ordered by slot
    async fn get_payment_urls(&self, id: &UserId) -> Result<Vec<PaymentUrl>>;

    // ========================================================================
    // Tasks
    // ========================================================================

    /// Get all tasks with their submissions
    async fn get_all_tasks(&self) -> Result<Vec<Task>>;

    /// Get task by ID with its submissions
    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Create a new task
    async fn create_task(&self, task: CreateTask) -> Result<Task>;

    /// Update a task
    async fn update_task(&self, id: &TaskId, task: UpdateTask) -> Result<Task>;

    /// Replace a task's external URL
    async fn set_task_url(&self, id: &TaskId, external_url: Option<String>) -> Result<()>;

    /// Delete a task and its submissions
    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    // ========================================================================
    // Submissions
    // ========================================================================

    /// Start a task: create an in-progress submission
    async fn start_submission(&self, user_id: &UserId, task_id: &TaskId) -> Result<Submission>;

    /// Attempt a task: move the user's submission to completed
    async fn complete_submission(&self, user_id: &UserId, task_id: &TaskId)
        -> Result<Submission>;

    /// Approve a completed submission and credit the worker in one transaction
    async fn approve_submission(&self, id: &SubmissionId) -> Result<ApprovalReceipt>;

    /// Remove a submission that has not been approved
    async fn delete_submission(&self, id: &SubmissionId) -> Result<Submission>;

    /// Get submission by ID
    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    /// Completed submissions awaiting (or, optionally, past) review
    async fn list_completed_submissions(
        &self,
        include_approved: bool,
    ) -> Result<Vec<SubmissionReview>>;

    // ========================================================================
    // Wallet
    // ========================================================================

    /// Current wallet balance
    async fn get_balance(&self, id: &UserId) -> Result<Amount>;

    /// Debit the wallet if funds suffice, recording inbox message and ledger row
    async fn withdraw(&self, id: &UserId, request: &WithdrawalRequest) -> Result<Withdrawal>;

    /// Administrative override of the balance
    async fn set_balance(&self, id: &UserId, balance: Amount) -> Result<Amount>;

    /// Withdrawal ledger for a user, newest first
    async fn get_withdrawals(&self, id: &UserId) -> Result<Vec<Withdrawal>>;
}
