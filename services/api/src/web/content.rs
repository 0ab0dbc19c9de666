//! services/api/src/web/content.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use mentor_core::domain::{Content, ContentDraft, ContentFilter, ContentListing, ContentStatus, Page};
use mentor_core::{Caller, PortError};
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

/// Status value that disables the status filter.
const ALL_STATUSES: &str = "all";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentQuery {
    pub category: Option<String>,
    /// `draft`, `published` (default), `archived` or `all`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContentQuery {
    fn into_filter(self) -> Result<ContentFilter, PortError> {
        let status = match self.status.as_deref() {
            None => Some(ContentStatus::Published),
            Some(ALL_STATUSES) => None,
            Some(raw) => Some(raw.parse::<ContentStatus>().map_err(PortError::Validation)?),
        };
        Ok(ContentFilter {
            category: self.category.filter(|c| !c.trim().is_empty()),
            status,
            page: Page::new(self.limit, self.offset),
        })
    }
}

/// GET /content - Own items plus published items of others
#[utoipa::path(
    get,
    path = "/api/v1/content",
    tag = "content",
    params(ContentQuery),
    responses(
        (status = 200, description = "Newest first", body = [ContentListing]),
        (status = 400, description = "Unknown status filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_content_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<ContentQuery>,
) -> Result<Json<Vec<ContentListing>>, ApiError> {
    let filter = query.into_filter()?;
    Ok(Json(state.content.list(caller.user_id, &filter).await?))
}

/// POST /content
#[utoipa::path(
    post,
    path = "/api/v1/content",
    tag = "content",
    request_body = ContentDraft,
    responses(
        (status = 201, description = "Content created", body = Content),
        (status = 400, description = "Invalid content")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_content_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(draft): JsonBody<ContentDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state.content.create(caller.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(content)))
}

/// GET /content/{id} - Counts as a view
#[utoipa::path(
    get,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = Uuid, Path, description = "Content id")),
    responses(
        (status = 200, description = "Content", body = ContentListing),
        (status = 404, description = "Missing or not visible to the caller")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_content_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentListing>, ApiError> {
    Ok(Json(state.content.get(caller.user_id, id).await?))
}

/// PUT /content/{id} - Owner only
#[utoipa::path(
    put,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = Uuid, Path, description = "Content id")),
    request_body = ContentDraft,
    responses(
        (status = 200, description = "Updated content", body = Content),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Content not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_content_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    JsonBody(draft): JsonBody<ContentDraft>,
) -> Result<Json<Content>, ApiError> {
    Ok(Json(state.content.update(caller.user_id, id, draft).await?))
}

/// DELETE /content/{id} - Owner only
#[utoipa::path(
    delete,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = Uuid, Path, description = "Content id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Content not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_content_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.content.delete(caller.user_id, id).await?;
    Ok(Json(MessageResponse::new("Content deleted successfully")))
}
