//! Task definitions and their submissions

use crate::submissions::{map_submission, SUBMISSION_COLUMNS};
use remotejob_core::{
    error::Result,
    types::{Amount, CreateTask, Submission, Task, TaskId, UpdateTask},
    MarketError,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;

fn map_task(row: &SqliteRow, submissions: Vec<Submission>) -> Result<Task> {
    Ok(Task {
        id: TaskId::new(row.get::<String, _>("id")),
        title: row.get("title"),
        description: row.get("description"),
        amount: Amount::from_cents(row.get("amount"))?,
        external_url: row.get("external_url"),
        created_at: row.get("created_at"),
        submissions,
    })
}

async fn submissions_for(pool: &SqlitePool, task_id: &TaskId) -> Result<Vec<Submission>> {
    let rows = sqlx::query(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE task_id = ? ORDER BY created_at, rowid"
    ))
    .bind(task_id.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_submission).collect()
}

/// Get all tasks with their submissions, newest task first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Task>> {
    let task_rows = sqlx::query(
        "SELECT id, title, description, amount, external_url, created_at
         FROM tasks ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    let submission_rows = sqlx::query(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    let mut by_task: HashMap<String, Vec<Submission>> = HashMap::new();
    for row in &submission_rows {
        let submission = map_submission(row)?;
        by_task
            .entry(submission.task_id.as_str().to_string())
            .or_default()
            .push(submission);
    }

    task_rows
        .iter()
        .map(|row| {
            let id: String = row.get("id");
            map_task(row, by_task.remove(&id).unwrap_or_default())
        })
        .collect()
}

/// Get task by ID with its submissions
pub async fn get_by_id(pool: &SqlitePool, id: &TaskId) -> Result<Option<Task>> {
    let row = sqlx::query(
        "SELECT id, title, description, amount, external_url, created_at FROM tasks WHERE id = ?",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let submissions = submissions_for(pool, id).await?;
            Ok(Some(map_task(&row, submissions)?))
        }
        None => Ok(None),
    }
}

/// Create a new task
pub async fn create(pool: &SqlitePool, task: CreateTask) -> Result<Task> {
    let title = task.title.trim();
    if title.is_empty() {
        return Err(MarketError::invalid_input("title is required"));
    }

    let id = TaskId::generate();

    sqlx::query(
        r#"
        INSERT INTO tasks (id, title, description, amount, external_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(title)
    .bind(&task.description)
    .bind(task.amount.cents())
    .bind(&task.external_url)
    .bind(crate::now())
    .execute(pool)
    .await?;

    tracing::info!(task_id = %id, amount = %task.amount, "Task created");

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| MarketError::storage("Failed to retrieve created task"))
}

/// Update a task, keeping the current value where the update is `None`
///
/// A new amount only applies to approvals made after the update.
pub async fn update(pool: &SqlitePool, id: &TaskId, task: UpdateTask) -> Result<Task> {
    if let Some(title) = &task.title {
        if title.trim().is_empty() {
            return Err(MarketError::invalid_input("title must not be empty"));
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            amount = COALESCE(?, amount),
            external_url = COALESCE(?, external_url)
        WHERE id = ?
        "#,
    )
    .bind(task.title.as_deref().map(str::trim))
    .bind(task.description)
    .bind(task.amount.map(Amount::cents))
    .bind(task.external_url)
    .bind(id.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("Task", id.as_str()));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| MarketError::not_found("Task", id.as_str()))
}

/// Replace or clear a task's external URL
pub async fn set_external_url(pool: &SqlitePool, id: &TaskId, external_url: Option<String>) -> Result<()> {
    let result = sqlx::query("UPDATE tasks SET external_url = ? WHERE id = ?")
        .bind(external_url)
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("Task", id.as_str()));
    }

    Ok(())
}

/// Delete a task; its submissions go with it
pub async fn delete(pool: &SqlitePool, id: &TaskId) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MarketError::not_found("Task", id.as_str()));
    }

    tracing::info!(task_id = %id, "Task deleted");
    Ok(())
}
