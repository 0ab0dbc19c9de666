//! services/api/src/web/auth.rs
//!
//! Public authentication endpoints: registration, login and token refresh.

use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use mentor_core::accounts::{AuthPayload, LoginRequest, RegisterRequest};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::{extract::JsonBody, middleware::bearer_token, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /register - Create a new account and sign in
#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthPayload),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// POST /login - Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid credentials or deactivated account")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthPayload>, ApiError> {
    Ok(Json(state.accounts.login(req).await?))
}

/// POST /refresh-token - Re-issue a still-valid bearer token
#[utoipa::path(
    post,
    path = "/api/v1/refresh-token",
    tag = "auth",
    responses(
        (status = 200, description = "Fresh token issued", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn refresh_token_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.accounts.refresh(bearer_token(&headers)?)?;
    Ok(Json(TokenResponse { token }))
}
