/// Authentication middleware
use crate::{
    error::ServerError,
    services::{AuthService, Principal},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use remotejob_core::UserId;
use std::sync::Arc;

/// Legacy header some clients still send instead of `Authorization`
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated principal stored in request extensions
/// Can be used as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin
    }
}

/// Extractor that only admits admin principals
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

/// Pull the token from `Authorization: Bearer` or `x-auth-token`
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        return value.strip_prefix("Bearer ");
    }

    headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
}

/// Middleware that extracts and validates the JWT
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = token_from_headers(request.headers())
        .ok_or_else(|| ServerError::Auth("Session expired or not authenticated.".to_string()))?;

    let principal = auth_service.authenticate(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ServerError::Auth("Session expired or not authenticated.".to_string())
    })?;

    request.extensions_mut().insert(AuthenticatedUser(principal));

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Session expired or not authenticated.".to_string()))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !principal.is_admin {
            tracing::warn!(user_id = %principal.user_id, "Non-admin attempted admin route");
            return Err(ServerError::Unauthorized("Admin access required".to_string()));
        }

        Ok(AdminUser(principal))
    }
}
