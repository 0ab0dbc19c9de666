//! services/api/src/web/sessions.rs
//!
//! Session ledger endpoints. Every route acts on behalf of the authenticated
//! caller; participant checks live in the ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use mentor_core::domain::{Page, Session, SessionFilter, SessionListing, SessionPatch, SessionStatus};
use mentor_core::{Caller, CreateSessionRequest};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::MessageResponse;
use crate::web::{
    extract::{JsonBody, QueryParams},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// Only sessions in this status.
    pub status: Option<SessionStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /sessions - Sessions where the caller is solver or seeker
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "sessions",
    params(SessionQuery),
    responses((status = 200, description = "Newest scheduled first", body = [SessionListing])),
    security(("bearer_auth" = []))
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<SessionQuery>,
) -> Result<Json<Vec<SessionListing>>, ApiError> {
    let filter = SessionFilter {
        status: query.status,
        page: Page::new(query.limit, query.offset),
    };
    Ok(Json(state.sessions.list_sessions(&caller, &filter).await?))
}

/// POST /sessions - Book a session with another user
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session scheduled", body = Session),
        (status = 400, description = "Invalid session request")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(req): JsonBody<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.sessions.create_session(&caller, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sessions/{id}
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session", body = SessionListing),
        (status = 404, description = "Missing, or the caller is not a participant")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionListing>, ApiError> {
    Ok(Json(state.sessions.get_session(&caller, id).await?))
}

/// PUT /sessions/{id} - Lifecycle and feedback changes
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SessionPatch,
    responses(
        (status = 200, description = "Updated session", body = Session),
        (status = 400, description = "Invalid, illegal or empty patch"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session changed concurrently")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<SessionPatch>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.sessions.update_session(&caller, id, patch).await?))
}

/// DELETE /sessions/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session deleted", body = MessageResponse),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.sessions.delete_session(&caller, id).await?;
    Ok(Json(MessageResponse::new("Session deleted successfully")))
}
