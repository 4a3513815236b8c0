//! Per-user append-only inbox

use remotejob_core::{
    error::Result,
    types::{Message, UserId},
    MarketError,
};
use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool};

fn map_message(row: &SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        from: row.get("sender"),
        content: row.get("content"),
        date: row.get("created_at"),
    }
}

/// Append a message inside an open transaction
///
/// Used by the workflow steps that must record a message in the same commit
/// as a balance change.
pub(crate) async fn append_in_tx(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    user_id: &UserId,
    from: &str,
    content: &str,
) -> Result<Message> {
    let row = sqlx::query(
        r#"
        INSERT INTO messages (user_id, sender, content, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, sender, content, created_at
        "#,
    )
    .bind(user_id.as_str())
    .bind(from)
    .bind(content)
    .bind(crate::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(map_message(&row))
}

/// Append a message to a user's inbox
pub async fn append(pool: &SqlitePool, user_id: &UserId, from: &str, content: &str) -> Result<Message> {
    let row = sqlx::query(
        r#"
        INSERT INTO messages (user_id, sender, content, created_at)
        SELECT id, ?, ?, ? FROM users WHERE id = ?
        RETURNING id, sender, content, created_at
        "#,
    )
    .bind(from)
    .bind(content)
    .bind(crate::now())
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| MarketError::not_found("User", user_id.as_str()))?;

    Ok(map_message(&row))
}

/// Get a user's inbox in append order
pub async fn get_for_user(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Message>> {
    let rows = sqlx::query(
        "SELECT id, sender, content, created_at FROM messages WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_message).collect())
}
