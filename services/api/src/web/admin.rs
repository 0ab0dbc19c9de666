//! services/api/src/web/admin.rs
//!
//! Admin-only endpoints. The router guards them with `require_admin`.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use mentor_core::domain::{Page, PlatformAnalytics, SessionListing, User};
use mentor_core::Caller;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::PageQuery;
use crate::web::{
    extract::{JsonBody, QueryParams},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserStatusRequest {
    pub is_active: bool,
}

/// GET /admin/users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(PageQuery),
    responses(
        (status = 200, description = "Newest accounts first", body = [User]),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    Ok(Json(state.accounts.list_users(page).await?))
}

/// PUT /admin/users/{id}/status - Activate or deactivate an account
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/status",
    tag = "admin",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserStatusRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UserStatusRequest>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.set_user_active(&caller, id, req.is_active).await?))
}

/// GET /admin/sessions/all
#[utoipa::path(
    get,
    path = "/api/v1/admin/sessions/all",
    tag = "admin",
    params(PageQuery),
    responses(
        (status = 200, description = "Every session, newest first", body = [SessionListing]),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_sessions_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Vec<SessionListing>>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    Ok(Json(state.sessions.list_all_sessions(page).await?))
}

/// GET /admin/analytics/platform
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics/platform",
    tag = "admin",
    responses(
        (status = 200, description = "Platform totals", body = PlatformAnalytics),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn platform_analytics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlatformAnalytics>, ApiError> {
    Ok(Json(state.dashboard.platform().await?))
}
