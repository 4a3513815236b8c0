//! Wallet balances and the withdrawal ledger

use crate::messages;
use remotejob_core::{
    error::Result,
    types::{Amount, UserId, Withdrawal, WithdrawalRequest, SYSTEM_SENDER},
    MarketError,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn map_withdrawal(row: &SqliteRow) -> Result<Withdrawal> {
    Ok(Withdrawal {
        id: row.get("id"),
        user_id: UserId::new(row.get::<String, _>("user_id")),
        amount: Amount::from_cents(row.get("amount"))?,
        crypto: row.get("crypto"),
        address: row.get("address"),
        balance_after: Amount::from_cents(row.get("balance_after"))?,
        created_at: row.get("created_at"),
    })
}

/// Current wallet balance
pub async fn get_balance(pool: &SqlitePool, user_id: &UserId) -> Result<Amount> {
    let row = sqlx::query("SELECT wallet_balance FROM users WHERE id = ?")
        .bind(user_id.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id.as_str()))?;

    Amount::from_cents(row.get("wallet_balance"))
}

/// Debit the wallet if the balance covers the request
///
/// PIN verification happens before this is called. The check and the debit
/// are one conditional update, so concurrent withdrawals can never take the
/// balance below zero. The inbox message and ledger row commit with the debit.
pub async fn withdraw(pool: &SqlitePool, user_id: &UserId, request: &WithdrawalRequest) -> Result<Withdrawal> {
    let now = crate::now();
    let amount = request.amount.cents();
    let mut tx = pool.begin().await?;

    let debited = sqlx::query(
        r#"
        UPDATE users
        SET wallet_balance = wallet_balance - ?
        WHERE id = ? AND wallet_balance >= ?
        RETURNING wallet_balance
        "#,
    )
    .bind(amount)
    .bind(user_id.as_str())
    .bind(amount)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = debited else {
        tx.rollback().await?;
        return Err(match get_balance(pool, user_id).await {
            Ok(_) => MarketError::InsufficientFunds,
            Err(e) => e,
        });
    };
    let balance_after: i64 = row.get("wallet_balance");

    let row = sqlx::query(
        r#"
        INSERT INTO withdrawals (user_id, amount, crypto, address, balance_after, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, amount, crypto, address, balance_after, created_at
        "#,
    )
    .bind(user_id.as_str())
    .bind(amount)
    .bind(&request.crypto)
    .bind(&request.address)
    .bind(balance_after)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    let withdrawal = map_withdrawal(&row)?;

    messages::append_in_tx(
        &mut tx,
        user_id,
        SYSTEM_SENDER,
        &format!(
            "Your withdrawal of ${} in {} to {} has been processed.",
            request.amount, request.crypto, request.address
        ),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        amount = %request.amount,
        balance_after = %withdrawal.balance_after,
        "Withdrawal processed"
    );

    Ok(withdrawal)
}

/// Overwrite the balance (administrative correction)
pub async fn set_balance(pool: &SqlitePool, user_id: &UserId, balance: Amount) -> Result<Amount> {
    let row = sqlx::query("UPDATE users SET wallet_balance = ? WHERE id = ? RETURNING wallet_balance")
        .bind(balance.cents())
        .bind(user_id.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| MarketError::not_found("User", user_id.as_str()))?;

    Amount::from_cents(row.get("wallet_balance"))
}

/// Withdrawal ledger for a user, newest first
pub async fn get_withdrawals(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Withdrawal>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, amount, crypto, address, balance_after, created_at
        FROM withdrawals
        WHERE user_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(user_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_withdrawal).collect()
}
