/// Shared application state
use crate::services::{AuthService, SubmissionService, WalletEvents, WalletService};
use remotejob_core::{Notifier, StorageContext};
use remotejob_storage::Database;
use std::sync::Arc;

/// Credentials accepted by the admin login
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password_hash: String,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub submissions: SubmissionService,
    pub wallet: WalletService,
    pub notifier: Arc<dyn Notifier>,
    pub events: WalletEvents,
    pub admin: Option<AdminCredentials>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        auth_service: Arc<AuthService>,
        notifier: Arc<dyn Notifier>,
        events: WalletEvents,
        admin: Option<AdminCredentials>,
    ) -> Self {
        let store: Arc<dyn StorageContext> = db.clone();

        Self {
            submissions: SubmissionService::new(
                Arc::clone(&store),
                Arc::clone(&notifier),
                events.clone(),
            ),
            wallet: WalletService::new(
                store,
                Arc::clone(&auth_service),
                Arc::clone(&notifier),
                events.clone(),
            ),
            db,
            auth_service,
            notifier,
            events,
            admin,
        }
    }
}
