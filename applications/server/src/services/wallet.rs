//! Wallet workflow
//!
//! Withdrawal order: validate the request, require a PIN, verify it, then
//! hand the conditional debit to the store. The PIN check runs before any
//! write so a wrong PIN never touches the balance or the inbox.

use crate::{
    error::{Result, ServerError},
    services::{events::WalletEvents, notifier, AuthService},
};
use remotejob_core::{
    Amount, MarketError, Notifier, StorageContext, User, UserId, Withdrawal, WithdrawalRequest,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct WalletService {
    db: Arc<dyn StorageContext>,
    auth: Arc<AuthService>,
    notifier: Arc<dyn Notifier>,
    events: WalletEvents,
}

impl WalletService {
    pub fn new(
        db: Arc<dyn StorageContext>,
        auth: Arc<AuthService>,
        notifier: Arc<dyn Notifier>,
        events: WalletEvents,
    ) -> Self {
        Self {
            db,
            auth,
            notifier,
            events,
        }
    }

    /// Current balance
    pub async fn balance(&self, user_id: &UserId) -> Result<Amount> {
        Ok(self.db.get_balance(user_id).await?)
    }

    /// Check a PIN without side effects
    pub async fn verify_pin(&self, user_id: &UserId, pin: &str) -> Result<()> {
        let hash = self
            .db
            .get_verify_pin_hash(user_id)
            .await?
            .ok_or(MarketError::NoPinConfigured)?;

        if !self.auth.verify_pin(pin, &hash)? {
            return Err(MarketError::InvalidPin.into());
        }
        Ok(())
    }

    /// PIN-gated withdrawal
    pub async fn withdraw(
        &self,
        user_id: &UserId,
        amount: Amount,
        crypto: &str,
        address: &str,
        pin: &str,
    ) -> Result<Withdrawal> {
        let request = WithdrawalRequest::new(amount, crypto, address)?;

        if let Err(e) = self.verify_pin(user_id, pin).await {
            tracing::warn!(user_id = %user_id, error = %e, "Withdrawal rejected");
            return Err(e);
        }

        let withdrawal = self.db.withdraw(user_id, &request).await?;

        self.events.publish(user_id.clone(), withdrawal.balance_after);

        let db = Arc::clone(&self.db);
        let notifier = Arc::clone(&self.notifier);
        let user_id = user_id.clone();
        let w = withdrawal.clone();
        tokio::spawn(async move {
            let email = match db.get_user(&user_id).await {
                Ok(Some(user)) => user.email,
                _ => user_id.to_string(),
            };
            let body = format!(
                "User {} confirmed withdrawal of ${} in {} to address {}.",
                email, w.amount, w.crypto, w.address
            );
            notifier::deliver(notifier.as_ref(), "Withdrawal Confirmed", &body).await;
        });

        Ok(withdrawal)
    }

    /// Administrative balance override
    pub async fn edit_balance(&self, email: &str, balance: Amount) -> Result<(User, Amount)> {
        let user = self.user_by_email(email).await?;
        let new_balance = self.db.set_balance(&user.id, balance).await?;

        tracing::info!(user_id = %user.id, balance = %new_balance, "Wallet balance overridden");
        self.events.publish(user.id.clone(), new_balance);

        Ok((user, new_balance))
    }

    /// Set (or replace) a user's withdrawal PIN
    pub async fn set_pin(&self, email: &str, pin: &str) -> Result<User> {
        let user = self.user_by_email(email).await?;
        let hash = self.auth.hash_pin(pin)?;
        self.db.set_verify_pin_hash(&user.id, &hash).await?;

        tracing::info!(user_id = %user.id, "Withdrawal PIN set");
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<User> {
        self.db
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServerError::Market(MarketError::not_found("User", email)))
    }
}
