//! Admin notification channel

use crate::error::Result;
use async_trait::async_trait;

/// Sink for fire-and-forget notifications to the administrator
///
/// Implementations deliver a subject and a body over some external channel
/// (email in production). Callers dispatch notifications only after the state
/// change they describe has been committed, and a failed delivery never
/// undoes that change.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}
