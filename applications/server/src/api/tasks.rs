/// Task API routes (worker side)
use crate::{
    api::{ack, MessageResponse},
    error::Result,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use remotejob_core::{MarketError, StorageContext, Task, TaskId};

/// GET /api/tasks
pub async fn list_tasks(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(app_state.db.get_all_tasks().await?))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    let id = TaskId::new(id);
    let task = app_state
        .db
        .get_task(&id)
        .await?
        .ok_or_else(|| MarketError::not_found("Task", id.as_str()))?;

    Ok(Json(task))
}

/// POST /api/tasks/start/:id
pub async fn start_task(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    app_state
        .submissions
        .start(auth.user_id(), &TaskId::new(id))
        .await?;

    Ok(ack("Task started"))
}

/// POST /api/tasks/attempt/:id
pub async fn attempt_task(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    app_state
        .submissions
        .attempt(auth.user_id(), &TaskId::new(id))
        .await?;

    Ok(ack("Task marked completed"))
}
