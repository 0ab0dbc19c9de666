//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use mentor_core::{AuthError, Caller, PortError};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Authorization header required"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid authorization header format"))
}

fn unauthorized(msg: &str) -> ApiError {
    ApiError::Port(PortError::Auth(AuthError::Invalid(msg.to_string())))
}

/// Validates the bearer token and attaches the resulting [`Caller`] to the
/// request extensions. Missing or bad tokens get a 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = {
        let token = bearer_token(req.headers())?;
        state.accounts.authenticate(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::Port(e)
        })?
    };

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Must run after [`require_auth`]. Non-admin callers get a 403.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<Caller>() {
        Some(caller) if caller.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(ApiError::Port(PortError::Forbidden(
            "Admin access required".to_string(),
        ))),
        None => Err(unauthorized("Authorization header required")),
    }
}
