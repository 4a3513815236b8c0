/// Admin API routes
///
/// Every handler takes `AdminUser`, so non-admin tokens get 403.
use crate::{
    api::{ack, ApiJson, MessageResponse},
    error::Result,
    middleware::AdminUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use remotejob_core::{
    types::ADMIN_SENDER, Amount, CreateTask, MarketError, PaymentUrl, SetPaymentUrl,
    StorageContext, SubmissionId, SubmissionReview, Task, TaskId, UpdateTask, User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EditWalletRequest {
    pub email: String,
    pub balance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditWalletResponse {
    pub message: &'static str,
    pub wallet_balance: Amount,
}

#[derive(Debug, Deserialize)]
pub struct SetPinRequest {
    pub email: String,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUrlRequest {
    #[serde(default)]
    pub external_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentUrlRequest {
    pub email: String,
    pub slot: i64,
    pub url: String,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionsQuery {
    #[serde(default)]
    pub include_approved: bool,
}

async fn user_by_email(app_state: &AppState, email: &str) -> Result<User> {
    Ok(app_state
        .db
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| MarketError::not_found("User", email))?)
}

/// GET /api/admin/users
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>> {
    Ok(Json(app_state.db.get_all_users().await?))
}

/// POST /api/admin/message
pub async fn send_message(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<MessageResponse>> {
    if req.message.trim().is_empty() {
        return Err(MarketError::invalid_input("message is required").into());
    }

    let user = user_by_email(&app_state, &req.email).await?;
    app_state
        .db
        .append_message(&user.id, ADMIN_SENDER, &req.message)
        .await?;

    Ok(ack("Message sent"))
}

/// POST /api/admin/wallet
pub async fn edit_wallet(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<EditWalletRequest>,
) -> Result<Json<EditWalletResponse>> {
    let balance = Amount::from_major(req.balance)?;
    let (_, wallet_balance) = app_state.wallet.edit_balance(&req.email, balance).await?;

    Ok(Json(EditWalletResponse {
        message: "Wallet updated",
        wallet_balance,
    }))
}

/// POST /api/admin/verify-pin
pub async fn set_verify_pin(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<SetPinRequest>,
) -> Result<Json<MessageResponse>> {
    app_state.wallet.set_pin(&req.email, &req.pin).await?;
    Ok(ack("Verify PIN set"))
}

/// GET /api/admin/tasks
pub async fn list_tasks(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(app_state.db.get_all_tasks().await?))
}

/// POST /api/admin/tasks
pub async fn create_task(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<CreateTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = app_state.db.create_task(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/admin/tasks/:id
pub async fn update_task(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTask>,
) -> Result<Json<Task>> {
    Ok(Json(app_state.db.update_task(&TaskId::new(id), req).await?))
}

/// DELETE /api/admin/tasks/:id
pub async fn delete_task(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    app_state.db.delete_task(&TaskId::new(id)).await?;
    Ok(ack("Task removed"))
}

/// POST /api/admin/tasks/:id/url
pub async fn update_task_url(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TaskUrlRequest>,
) -> Result<Json<MessageResponse>> {
    let url = req
        .external_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    app_state.db.set_task_url(&TaskId::new(id), url).await?;
    Ok(ack("Task URL updated"))
}

/// POST /api/admin/payment-url
pub async fn set_payment_url(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<PaymentUrlRequest>,
) -> Result<Json<MessageResponse>> {
    let user = user_by_email(&app_state, &req.email).await?;
    app_state
        .db
        .set_payment_url(
            &user.id,
            SetPaymentUrl {
                slot: req.slot,
                url: req.url,
                approved: req.approved,
            },
        )
        .await?;

    Ok(ack("Payment URL updated"))
}

/// GET /api/admin/payment-url?email=
pub async fn get_payment_urls(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<PaymentUrl>>> {
    let user = user_by_email(&app_state, &query.email).await?;
    Ok(Json(app_state.db.get_payment_urls(&user.id).await?))
}

/// GET /api/admin/task-submissions[?includeApproved=true]
pub async fn task_submissions(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SubmissionsQuery>,
) -> Result<Json<Vec<SubmissionReview>>> {
    Ok(Json(
        app_state
            .db
            .list_completed_submissions(query.include_approved)
            .await?,
    ))
}

/// POST /api/admin/approve-submission/:submission_id
pub async fn approve_submission(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(submission_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    app_state
        .submissions
        .approve(&SubmissionId::new(submission_id))
        .await?;

    Ok(ack("Submission approved and wallet updated"))
}

/// DELETE /api/admin/submission/:submission_id
pub async fn delete_submission(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(submission_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    app_state
        .submissions
        .delete(&SubmissionId::new(submission_id))
        .await?;

    Ok(ack("Submission deleted"))
}
