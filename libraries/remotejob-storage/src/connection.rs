//! Lazily-initialized database handle

use crate::{create_pool, run_migrations, StorageError};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

/// Owned handle to the database
///
/// The pool is created and migrated by the first caller of [`Connection::pool`]
/// and reused afterwards. Concurrent first callers wait for the same
/// initialization. [`Connection::close`] shuts the pool down; later calls to
/// `pool` fail instead of reconnecting.
pub struct Connection {
    database_url: String,
    pool: OnceCell<SqlitePool>,
}

impl Connection {
    /// Create a handle; nothing is opened until first use
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool: OnceCell::new(),
        }
    }

    /// Wrap an already-open, already-migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            database_url: String::new(),
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Get the pool, opening and migrating the database on first use
    pub async fn pool(&self) -> Result<&SqlitePool, StorageError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                let pool = create_pool(&self.database_url).await?;
                run_migrations(&pool).await?;
                tracing::info!("Database connected");
                Ok::<_, StorageError>(pool)
            })
            .await?;

        if pool.is_closed() {
            return Err(StorageError::Connection("connection closed".to_string()));
        }

        Ok(pool)
    }

    /// Close the pool if it was opened
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Database connection closed");
        }
    }
}
