/// Authentication API routes
use crate::{
    api::ApiJson,
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::notifier,
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use remotejob_core::{
    types::normalize_email, CreateUser, Gender, MarketError, ProfileType, StorageContext, User,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub profile_type: ProfileType,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Gender,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub status: &'static str,
    pub token: String,
    pub is_admin: bool,
}

/// POST /api/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&req.email);
    if !email.contains('@') {
        return Err(MarketError::invalid_input("a valid email is required").into());
    }
    if req.password.is_empty() {
        return Err(MarketError::invalid_input("password is required").into());
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(MarketError::invalid_input("first and last name are required").into());
    }

    let password_hash = app_state.auth_service.hash_password(&req.password)?;

    let user = app_state
        .db
        .create_user(CreateUser {
            profile_type: req.profile_type,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email,
            phone: req.phone,
            gender: req.gender,
            country: req.country,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    notifier::dispatch(
        &app_state.notifier,
        "New User Registration",
        format!(
            "New {} registered: {} ({})",
            user.profile_type.as_str(),
            user.full_name(),
            user.email
        ),
    );

    let token = app_state.auth_service.create_user_token(&user.id)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (user, password_hash) = app_state
        .db
        .get_credentials(&req.email)
        .await?
        .ok_or_else(|| ServerError::Auth("Invalid credentials".to_string()))?;

    if !app_state
        .auth_service
        .verify_password(&req.password, &password_hash)?
    {
        return Err(ServerError::Auth("Invalid credentials".to_string()));
    }

    notifier::dispatch(
        &app_state.notifier,
        "User Login",
        format!(
            "{} logged in: {} ({})",
            user.profile_type.as_str(),
            user.full_name(),
            user.email
        ),
    );

    let token = app_state.auth_service.create_user_token(&user.id)?;
    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<User>> {
    let user = app_state
        .db
        .get_user(auth.user_id())
        .await?
        .ok_or_else(|| MarketError::not_found("User", auth.user_id().as_str()))?;

    Ok(Json(user))
}

/// POST /api/admin/auth/login
pub async fn admin_login(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AdminLoginResponse>> {
    let invalid = || ServerError::Auth("Invalid admin credentials".to_string());

    let admin = app_state.admin.as_ref().ok_or_else(invalid)?;
    let email = normalize_email(&req.email);

    if email != normalize_email(&admin.email) {
        return Err(invalid());
    }
    if !app_state
        .auth_service
        .verify_password(&req.password, &admin.password_hash)?
    {
        return Err(invalid());
    }

    notifier::dispatch(
        &app_state.notifier,
        "Admin Login",
        format!("Admin logged in with email {}", email),
    );

    let token = app_state.auth_service.create_admin_token(&email)?;
    Ok(Json(AdminLoginResponse {
        status: "success",
        token,
        is_admin: true,
    }))
}
