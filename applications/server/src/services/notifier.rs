//! Admin notification channel
//!
//! Notifications are best-effort: they are sent after the state change they
//! describe has committed, on a spawned task, and a failure is only logged.

use crate::config::NotificationSettings;
use crate::error::{Result, ServerError};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message as EmailMessage, Tokio1Executor,
};
use remotejob_core::{MarketError, Notifier};
use std::sync::Arc;

/// Sends notifications to the administrator by SMTP
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn from_settings(settings: &NotificationSettings) -> Result<Self> {
        let missing = |field: &str| ServerError::Config(format!("notifications.{} is required", field));

        let server = settings.smtp_server.as_deref().ok_or_else(|| missing("smtp_server"))?;
        let username = settings.smtp_username.clone().ok_or_else(|| missing("smtp_username"))?;
        let password = settings.smtp_password.clone().ok_or_else(|| missing("smtp_password"))?;
        let admin_email = settings.admin_email.as_deref().ok_or_else(|| missing("admin_email"))?;

        let from = format!("{} <{}>", settings.from_name, username)
            .parse::<Mailbox>()
            .map_err(|e| ServerError::Config(format!("Invalid sender address: {}", e)))?;
        let to = admin_email
            .parse::<Mailbox>()
            .map_err(|e| ServerError::Config(format!("Invalid admin address: {}", e)))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(server)
            .map_err(|e| ServerError::Config(format!("Invalid SMTP server: {}", e)))?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, body: &str) -> remotejob_core::Result<()> {
        let email = EmailMessage::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(format!("<p>{}</p>", html_escape(body)))
            .map_err(|e| MarketError::Notification(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| MarketError::Notification(e.to_string()))?;

        Ok(())
    }
}

/// Writes notifications to the log; used when SMTP is not configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> remotejob_core::Result<()> {
        tracing::info!(subject, body, "Admin notification");
        Ok(())
    }
}

/// Build the notifier the settings ask for
pub fn from_settings(settings: &NotificationSettings) -> Result<Arc<dyn Notifier>> {
    if settings.enabled {
        Ok(Arc::new(EmailNotifier::from_settings(settings)?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

/// Send a notification, logging instead of failing
pub async fn deliver(notifier: &dyn Notifier, subject: &str, body: &str) {
    if let Err(e) = notifier.notify(subject, body).await {
        tracing::warn!(subject = %subject, error = %e, "Failed to deliver admin notification");
    }
}

/// Send a notification in the background
pub fn dispatch(notifier: &Arc<dyn Notifier>, subject: impl Into<String>, body: impl Into<String>) {
    let notifier = Arc::clone(notifier);
    let subject = subject.into();
    let body = body.into();

    tokio::spawn(async move {
        deliver(notifier.as_ref(), &subject, &body).await;
    });
}

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
