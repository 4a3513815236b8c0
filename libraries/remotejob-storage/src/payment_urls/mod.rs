//! Payout URLs, one per (user, slot)

use remotejob_core::{
    error::Result,
    types::{PaymentUrl, SetPaymentUrl, UserId},
    MarketError,
};
use sqlx::{Row, SqlitePool};

/// Create or replace the payout URL in a slot
pub async fn upsert(pool: &SqlitePool, user_id: &UserId, input: SetPaymentUrl) -> Result<PaymentUrl> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(MarketError::invalid_input("url is required"));
    }
    if input.slot < 0 {
        return Err(MarketError::invalid_input("slot must not be negative"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO payment_urls (user_id, slot, url, approved, updated_at)
        SELECT id, ?, ?, ?, ? FROM users WHERE id = ?
        ON CONFLICT (user_id, slot) DO UPDATE SET
            url = excluded.url,
            approved = excluded.approved,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(input.slot)
    .bind(url)
    .bind(input.approved)
    .bind(crate::now())
    .bind(user_id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("User", user_id.as_str()));
    }

    Ok(PaymentUrl {
        slot: input.slot,
        url: url.to_string(),
        approved: input.approved,
    })
}

/// Get a user's payout URLs ordered by slot
pub async fn get_for_user(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<PaymentUrl>> {
    let rows = sqlx::query(
        "SELECT slot, url, approved FROM payment_urls WHERE user_id = ? ORDER BY slot",
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PaymentUrl {
            slot: row.get("slot"),
            url: row.get("url"),
            approved: row.get::<i64, _>("approved") != 0,
        })
        .collect())
}
