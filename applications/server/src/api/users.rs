/// User profile and inbox API routes
use crate::{
    api::{ack, ApiJson, MessageResponse},
    error::Result,
    middleware::AuthenticatedUser,
    services::notifier,
    state::AppState,
};
use axum::{extract::State, Json};
use remotejob_core::{Message, MarketError, PaymentUrl, StorageContext, UpdateProfile, User};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ContactAdminRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPinRequest {
    pub pin: String,
}

async fn current_user(app_state: &AppState, auth: &AuthenticatedUser) -> Result<User> {
    Ok(app_state
        .db
        .get_user(auth.user_id())
        .await?
        .ok_or_else(|| MarketError::not_found("User", auth.user_id().as_str()))?)
}

/// GET /api/users/profile
pub async fn get_profile(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<User>> {
    Ok(Json(current_user(&app_state, &auth).await?))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(update): ApiJson<UpdateProfile>,
) -> Result<Json<User>> {
    let user = app_state.db.update_profile(auth.user_id(), update).await?;

    notifier::dispatch(
        &app_state.notifier,
        "Profile Update",
        format!(
            "User {} (Profile: {}) updated their profile.",
            user.full_name(),
            user.profile_type.as_str()
        ),
    );

    Ok(Json(user))
}

/// POST /api/users/message-admin
pub async fn message_admin(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<ContactAdminRequest>,
) -> Result<Json<MessageResponse>> {
    if req.content.trim().is_empty() {
        return Err(MarketError::invalid_input("content is required").into());
    }

    let user = current_user(&app_state, &auth).await?;

    notifier::dispatch(
        &app_state.notifier,
        "User Message to Admin",
        format!("From {} ({}): {}", user.full_name(), user.email, req.content),
    );

    Ok(ack("Message sent to admin"))
}

/// GET /api/users/messages
pub async fn get_messages(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(app_state.db.get_messages(auth.user_id()).await?))
}

/// POST /api/users/verify-pin
pub async fn verify_pin(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<VerifyPinRequest>,
) -> Result<Json<MessageResponse>> {
    app_state.wallet.verify_pin(auth.user_id(), &req.pin).await?;
    Ok(ack("PIN verified"))
}

/// GET /api/users/payment-url
pub async fn get_payment_urls(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<PaymentUrl>>> {
    Ok(Json(app_state.db.get_payment_urls(auth.user_id()).await?))
}
