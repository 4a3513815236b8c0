//! RemoteJob Storage
//!
//! `SQLite` database layer for the RemoteJob marketplace.
//!
//! This crate provides persistent storage for users, tasks, submissions and
//! wallets, and implements the atomic workflow steps the server relies on.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Atomic Transitions**: Workflow steps are single conditional statements
//!   or one transaction whose first statement takes the write lock
//! - **Lazy Connection**: The pool is opened and migrated on first use
//!
//! # Example
//!
//! ```rust,no_run
//! use remotejob_storage::LocalStorageContext;
//! use remotejob_core::storage::StorageContext;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = LocalStorageContext::connect("sqlite://remotejob.db");
//!
//! // The database is opened and migrated on the first query
//! let tasks = storage.get_all_tasks().await?;
//!
//! storage.close().await;
//! # Ok(())
//! # }
//! ```

mod connection;
mod context;
mod error;

// Vertical slices
pub mod messages;
pub mod payment_urls;
pub mod submissions;
pub mod tasks;
pub mod users;
pub mod wallet;

pub use connection::Connection;
pub use context::LocalStorageContext;
pub use error::StorageError;

// Type alias used by the server
pub type Database = LocalStorageContext;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://remotejob.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Writers queue behind each other instead of failing with SQLITE_BUSY
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Current unix timestamp in seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
