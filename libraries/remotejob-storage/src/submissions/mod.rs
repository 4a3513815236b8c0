//! Submission lifecycle
//!
//! Every transition is decided by a single conditional statement so that
//! concurrent requests, in this process or another one sharing the database,
//! cannot both succeed. When the statement matches nothing, the current row
//! is read back only to pick the right error.

use crate::{messages, wallet};
use remotejob_core::{
    error::Result,
    types::{
        Amount, ApprovalReceipt, Submission, SubmissionId, SubmissionReview, SubmissionStatus,
        TaskId, UserId, SYSTEM_SENDER,
    },
    MarketError,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

pub(crate) const SUBMISSION_COLUMNS: &str =
    "id, task_id, user_id, status, approved, file_url, created_at, completed_at, approved_at";

pub(crate) fn map_submission(row: &SqliteRow) -> Result<Submission> {
    let status: String = row.get("status");

    Ok(Submission {
        id: SubmissionId::new(row.get::<String, _>("id")),
        task_id: TaskId::new(row.get::<String, _>("task_id")),
        user: UserId::new(row.get::<String, _>("user_id")),
        status: SubmissionStatus::from_str(&status)
            .ok_or_else(|| MarketError::storage(format!("Unknown submission status: {}", status)))?,
        approved: row.get::<i64, _>("approved") != 0,
        file_url: row.get("file_url"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
        approved_at: row.get("approved_at"),
    })
}

async fn require_task(pool: &SqlitePool, task_id: &TaskId) -> Result<()> {
    let exists = sqlx::query("SELECT 1 FROM tasks WHERE id = ?")
        .bind(task_id.as_str())
        .fetch_optional(pool)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(MarketError::not_found("Task", task_id.as_str())),
    }
}

async fn get_for_user(pool: &SqlitePool, user_id: &UserId, task_id: &TaskId) -> Result<Option<Submission>> {
    let row = sqlx::query(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE task_id = ? AND user_id = ?"
    ))
    .bind(task_id.as_str())
    .bind(user_id.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_submission).transpose()
}

/// Get submission by ID
pub async fn get_by_id(pool: &SqlitePool, id: &SubmissionId) -> Result<Option<Submission>> {
    let row = sqlx::query(&format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_submission).transpose()
}

/// Start a task for a user
///
/// The (task, user) uniqueness constraint decides the race between two
/// concurrent starts; the loser gets `AlreadyStarted`.
pub async fn start(pool: &SqlitePool, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
    require_task(pool, task_id).await?;

    let id = SubmissionId::generate();
    let result = sqlx::query(
        r#"
        INSERT INTO submissions (id, task_id, user_id, status, approved, created_at)
        VALUES (?, ?, ?, 'in-progress', 0, ?)
        ON CONFLICT (task_id, user_id) DO NOTHING
        "#,
    )
    .bind(id.as_str())
    .bind(task_id.as_str())
    .bind(user_id.as_str())
    .bind(crate::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::AlreadyStarted);
    }

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| MarketError::storage("Failed to retrieve created submission"))
}

/// Mark a user's in-progress submission as completed
pub async fn complete(pool: &SqlitePool, user_id: &UserId, task_id: &TaskId) -> Result<Submission> {
    require_task(pool, task_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE submissions
        SET status = 'completed', completed_at = ?
        WHERE task_id = ? AND user_id = ? AND status = 'in-progress'
        "#,
    )
    .bind(crate::now())
    .bind(task_id.as_str())
    .bind(user_id.as_str())
    .execute(pool)
    .await?;

    let current = get_for_user(pool, user_id, task_id).await?;

    if result.rows_affected() == 0 {
        return Err(match current {
            None => MarketError::NotStarted,
            Some(_) => MarketError::AlreadyCompleted,
        });
    }

    current.ok_or_else(|| MarketError::storage("Submission vanished after completion"))
}

/// Approve a completed submission and credit the worker
///
/// The approval flag, the wallet credit and the inbox message commit together.
/// The compare-and-set on `approved` is the first statement of the
/// transaction, so of two racing approvals exactly one credits the wallet.
pub async fn approve(pool: &SqlitePool, id: &SubmissionId) -> Result<ApprovalReceipt> {
    let now = crate::now();
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query(
        r#"
        UPDATE submissions
        SET approved = 1, approved_at = ?
        WHERE id = ? AND status = 'completed' AND approved = 0
        "#,
    )
    .bind(now)
    .bind(id.as_str())
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(match get_by_id(pool, id).await? {
            None => MarketError::not_found("Submission", id.as_str()),
            Some(s) if s.status != SubmissionStatus::Completed => MarketError::NotCompleted,
            Some(_) => MarketError::AlreadyApproved,
        });
    }

    let row = sqlx::query(
        r#"
        SELECT s.user_id, t.title, t.amount
        FROM submissions s
        JOIN tasks t ON t.id = s.task_id
        WHERE s.id = ?
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| MarketError::not_found("Task", format!("for submission {}", id)))?;

    let user_id = UserId::new(row.get::<String, _>("user_id"));
    let task_title: String = row.get("title");
    let amount = Amount::from_cents(row.get("amount"))?;

    // Both operands are at most Amount::MAX, so the bound itself cannot overflow
    let credited = sqlx::query(
        r#"
        UPDATE users
        SET wallet_balance = wallet_balance + ?
        WHERE id = ? AND wallet_balance <= ? - ?
        RETURNING wallet_balance
        "#,
    )
    .bind(amount.cents())
    .bind(user_id.as_str())
    .bind(Amount::MAX.cents())
    .bind(amount.cents())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(balance_row) = credited else {
        tx.rollback().await?;
        return Err(match wallet::get_balance(pool, &user_id).await {
            Ok(balance) if balance.checked_add(amount).is_none() => {
                tracing::warn!(
                    submission_id = %id,
                    user_id = %user_id,
                    balance = %balance,
                    amount = %amount,
                    "Approval refused, credit would exceed the balance limit"
                );
                MarketError::BalanceLimitExceeded
            }
            Ok(_) => MarketError::storage("Wallet credit was not applied"),
            Err(e) => e,
        });
    };
    let wallet_balance = Amount::from_cents(balance_row.get("wallet_balance"))?;

    messages::append_in_tx(
        &mut tx,
        &user_id,
        SYSTEM_SENDER,
        &format!(
            "Your payment of ${} for \"{}\" has been approved and credited to your wallet.",
            amount, task_title
        ),
    )
    .await?;

    let submission_row = sqlx::query(&format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"))
        .bind(id.as_str())
        .fetch_one(&mut *tx)
        .await?;
    let submission = map_submission(&submission_row)?;

    tx.commit().await?;

    tracing::info!(
        submission_id = %id,
        user_id = %user_id,
        amount = %amount,
        "Submission approved and wallet credited"
    );

    Ok(ApprovalReceipt {
        submission,
        task_title,
        amount,
        wallet_balance,
    })
}

/// Remove a submission that has not been approved
///
/// Approved submissions are kept so the credit they produced stays explained.
pub async fn delete(pool: &SqlitePool, id: &SubmissionId) -> Result<Submission> {
    let row = sqlx::query(&format!(
        "DELETE FROM submissions WHERE id = ? AND approved = 0 RETURNING {SUBMISSION_COLUMNS}"
    ))
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => map_submission(&row),
        None => match get_by_id(pool, id).await? {
            Some(_) => Err(MarketError::AlreadyApproved),
            None => Err(MarketError::not_found("Submission", id.as_str())),
        },
    }
}

/// Completed submissions across all tasks, for review
///
/// Unapproved entries only unless `include_approved` is set. Oldest
/// completion first.
pub async fn list_completed(pool: &SqlitePool, include_approved: bool) -> Result<Vec<SubmissionReview>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id AS submission_id, s.user_id, s.task_id, s.approved,
               u.email, u.first_name, u.last_name,
               t.title, t.amount
        FROM submissions s
        JOIN tasks t ON t.id = s.task_id
        JOIN users u ON u.id = s.user_id
        WHERE s.status = 'completed' AND (? OR s.approved = 0)
        ORDER BY s.completed_at, s.rowid
        "#,
    )
    .bind(include_approved)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let first_name: String = row.get("first_name");
            let last_name: String = row.get("last_name");

            Ok(SubmissionReview {
                submission_id: SubmissionId::new(row.get::<String, _>("submission_id")),
                user_id: UserId::new(row.get::<String, _>("user_id")),
                user_email: row.get("email"),
                user_name: format!("{} {}", first_name, last_name),
                task_id: TaskId::new(row.get::<String, _>("task_id")),
                task_title: row.get("title"),
                amount: Amount::from_cents(row.get("amount"))?,
                approved: row.get::<i64, _>("approved") != 0,
            })
        })
        .collect()
}
