use crate::{messages, payment_urls, submissions, tasks, users, wallet, Connection, StorageError};
use async_trait::async_trait;
use remotejob_core::{error::Result, storage::StorageContext, types::*};
use sqlx::SqlitePool;

/// Local storage context using `SQLite`
pub struct LocalStorageContext {
    conn: Connection,
}

impl LocalStorageContext {
    /// Create a context that opens the database on first use
    pub fn connect(database_url: impl Into<String>) -> Self {
        Self {
            conn: Connection::new(database_url),
        }
    }

    /// Create a context over an open, migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            conn: Connection::from_pool(pool),
        }
    }

    pub async fn pool(&self) -> std::result::Result<&SqlitePool, StorageError> {
        self.conn.pool().await
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.conn.close().await;
    }

    async fn db(&self) -> Result<&SqlitePool> {
        Ok(self.conn.pool().await?)
    }
}

#[async_trait]
impl StorageContext for LocalStorageContext {
    // Accounts
    async fn create_user(&self, user: CreateUser) -> Result<User> {
        users::create(self.db().await?, user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        users::get_by_id(self.db().await?, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::get_by_email(self.db().await?, email).await
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        users::get_all(self.db().await?).await
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        users::get_credentials(self.db().await?, email).await
    }

    async fn update_profile(&self, id: &UserId, update: UpdateProfile) -> Result<User> {
        users::update_profile(self.db().await?, id, update).await
    }

    async fn set_verify_pin_hash(&self, id: &UserId, pin_hash: &str) -> Result<()> {
        users::set_verify_pin_hash(self.db().await?, id, pin_hash).await
    }

    async fn get_verify_pin_hash(&self, id: &UserId) -> Result<Option<String>> {
        users::get_verify_pin_hash(self.db().await?, id).await
    }

    // Inbox
    async fn append_message(&self, id: &UserId, from: &str, content: &str) -> Result<Message> {
        messages::append(self.db().await?, id, from, content).await
    }

    async fn get_messages(&self, id: &UserId) -> Result<Vec<Message>> {
        messages::get_for_user(self.db().await?, id).await
    }

    // Payout URLs
    async fn set_payment_url(&self, id: &UserId, url: SetPaymentUrl) -> Result<PaymentUrl> {
        payment_urls::upsert(self.db().await?, id, url).await
    }

    async fn get_payment_urls(&self, id: &UserId) -> Result<Vec<PaymentUrl>> {
        payment_urls::get_for_user(self.db().await?, id).await
    }

    // Tasks
    async fn get_all_tasks(&self) -> Result<Vec<Task>> {
        tasks::get_all(self.db().await?).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>> {
        tasks::get_by_id(self.db().await?, id).await
    }

    async fn create_task(&self, task: CreateTask) -> Result<Task> {
        tasks::create(self.db().await?, task).await
    }

    async fn update_task(&self, id: &TaskId, task: UpdateTask) -> Result<Task> {
        tasks::update(self.db().await?, id, task).await
    }

    async fn set_task_url(&self, id: &TaskId, external_url: Option<String>) -> Result<()> {
        tasks::set_external_url(self.db().await?, id, external_url).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        tasks::delete(self.db().await?, id).await
    }

    // Submissions
    async fn start_submission(&self, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
        submissions::start(self.db().await?, user_id, task_id).await
    }

    async fn complete_submission(&self, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
        submissions::complete(self.db().await?, user_id, task_id).await
    }

    async fn approve_submission(&self, id: &SubmissionId) -> Result<ApprovalReceipt> {
        submissions::approve(self.db().await?, id).await
    }

    async fn delete_submission(&self, id: &SubmissionId) -> Result<Submission> {
        submissions::delete(self.db().await?, id).await
    }

    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        submissions::get_by_id(self.db().await?, id).await
    }

    async fn list_completed_submissions(&self, include_approved: bool) -> Result<Vec<SubmissionReview>> {
        submissions::list_completed(self.db().await?, include_approved).await
    }

    // Wallet
    async fn get_balance(&self, id: &UserId) -> Result<Amount> {
        wallet::get_balance(self.db().await?, id).await
    }

    async fn withdraw(&self, id: &UserId, request: &WithdrawalRequest) -> Result<Withdrawal> {
        wallet::withdraw(self.db().await?, id, request).await
    }

    async fn set_balance(&self, id: &UserId, balance: Amount) -> Result<Amount> {
        wallet::set_balance(self.db().await?, id, balance).await
    }

    async fn get_withdrawals(&self, id: &UserId) -> Result<Vec<Withdrawal>> {
        wallet::get_withdrawals(self.db().await?, id).await
    }
}
