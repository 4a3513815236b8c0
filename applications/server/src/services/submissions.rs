//! Submission workflow
//!
//! Drives start → attempt → approve on top of the store's atomic steps and
//! fires the post-commit side effects.

use crate::services::{events::WalletEvents, notifier};
use remotejob_core::{
    ApprovalReceipt, Notifier, Result, StorageContext, Submission, SubmissionId,
    TaskId, UserId,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SubmissionService {
    db: Arc<dyn StorageContext>,
    notifier: Arc<dyn Notifier>,
    events: WalletEvents,
}

impl SubmissionService {
    pub fn new(db: Arc<dyn StorageContext>, notifier: Arc<dyn Notifier>, events: WalletEvents) -> Self {
        Self {
            db,
            notifier,
            events,
        }
    }

    /// Start a task for a worker
    pub async fn start(&self, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
        let submission = self.db.start_submission(user_id, task_id).await?;
        tracing::info!(user_id = %user_id, task_id = %task_id, "Task started");

        self.notify_task_event("Task Started", "started", user_id, task_id);
        Ok(submission)
    }

    /// Mark a worker's submission completed
    pub async fn attempt(&self, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
        let submission = self.db.complete_submission(user_id, task_id).await?;
        tracing::info!(user_id = %user_id, task_id = %task_id, "Task completed");

        self.notify_task_event("Task Attempted", "completed", user_id, task_id);
        Ok(submission)
    }

    /// Approve a completed submission; the wallet credit commits with it
    pub async fn approve(&self, submission_id: &SubmissionId) -> Result<ApprovalReceipt> {
        let receipt = self.db.approve_submission(submission_id).await?;

        self.events
            .publish(receipt.submission.user.clone(), receipt.wallet_balance);
        Ok(receipt)
    }

    /// Remove a submission that has not been approved
    pub async fn delete(&self, submission_id: &SubmissionId) -> Result<Submission> {
        let submission = self.db.delete_submission(submission_id).await?;
        tracing::info!(submission_id = %submission_id, "Submission deleted");
        Ok(submission)
    }

    /// Look up the names involved and notify the admin, off the request path
    fn notify_task_event(&self, subject: &'static str, verb: &'static str, user_id: &UserId, task_id: &TaskId) {
        let db = Arc::clone(&self.db);
        let notifier = Arc::clone(&self.notifier);
        let user_id = user_id.clone();
        let task_id = task_id.clone();

        tokio::spawn(async move {
            let email = match db.get_user(&user_id).await {
                Ok(Some(user)) => user.email,
                _ => user_id.to_string(),
            };
            let title = match db.get_task(&task_id).await {
                Ok(Some(task)) => task.title,
                Ok(None) => {
                    tracing::warn!(task_id = %task_id, "Task vanished before notification");
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load task for notification");
                    return;
                }
            };

            let body = format!(
                "User {} {} task \"{}\" (ID: {}).",
                email, verb, title, task_id
            );
            notifier::deliver(notifier.as_ref(), subject, &body).await;
        });
    }
}
