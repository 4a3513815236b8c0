/// API route modules
pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
pub mod wallet;
pub mod ws;

use crate::{error::ServerError, middleware, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// `{"message": "..."}` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub(crate) fn ack(message: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse { message })
}

/// JSON body extractor whose rejections use the `{"error": ...}` shape
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Build the full `/api` router
pub fn create_router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/admin/auth/login", post(auth::admin_login))
        // Authenticates with ?token= since browsers cannot set headers here
        .route("/ws", get(ws::wallet_updates));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        // Profile and inbox
        .route("/users/profile", get(users::get_profile))
        .route("/users/profile", put(users::update_profile))
        .route("/users/message-admin", post(users::message_admin))
        .route("/users/messages", get(users::get_messages))
        .route("/users/verify-pin", post(users::verify_pin))
        .route("/users/payment-url", get(users::get_payment_urls))
        // Tasks
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/:id", get(tasks::get_task))
        .route("/tasks/start/:id", post(tasks::start_task))
        .route("/tasks/attempt/:id", post(tasks::attempt_task))
        // Wallet
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/withdraw", post(wallet::withdraw))
        .route("/wallet/withdrawals", get(wallet::list_withdrawals))
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route("/admin/message", post(admin::send_message))
        .route("/admin/wallet", post(admin::edit_wallet))
        .route("/admin/verify-pin", post(admin::set_verify_pin))
        .route("/admin/tasks", get(admin::list_tasks))
        .route("/admin/tasks", post(admin::create_task))
        .route("/admin/tasks/:id", put(admin::update_task))
        .route("/admin/tasks/:id", delete(admin::delete_task))
        .route("/admin/tasks/:id/url", post(admin::update_task_url))
        .route("/admin/payment-url", get(admin::get_payment_urls))
        .route("/admin/payment-url", post(admin::set_payment_url))
        .route("/admin/task-submissions", get(admin::task_submissions))
        .route(
            "/admin/approve-submission/:submission_id",
            post(admin::approve_submission),
        )
        .route(
            "/admin/submission/:submission_id",
            delete(admin::delete_submission),
        )
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
