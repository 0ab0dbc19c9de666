//! services/api/src/web/community.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use mentor_core::domain::{Discussion, DiscussionDraft, Event, EventDraft, Page};
use mentor_core::Caller;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::PageQuery;
use crate::web::{
    extract::{JsonBody, QueryParams},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscussionQuery {
    pub community_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /community/discussions
#[utoipa::path(
    get,
    path = "/api/v1/community/discussions",
    tag = "community",
    params(DiscussionQuery),
    responses((status = 200, description = "Newest first", body = [Discussion])),
    security(("bearer_auth" = []))
)]
pub async fn list_discussions_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<DiscussionQuery>,
) -> Result<Json<Vec<Discussion>>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    Ok(Json(state.community.discussions(caller.user_id, query.community_id, page).await?))
}

/// POST /community/discussions
#[utoipa::path(
    post,
    path = "/api/v1/community/discussions",
    tag = "community",
    request_body = DiscussionDraft,
    responses(
        (status = 201, description = "Discussion started", body = Discussion),
        (status = 400, description = "Invalid discussion")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_discussion_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(draft): JsonBody<DiscussionDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let discussion = state.community.start_discussion(caller.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(discussion)))
}

/// GET /community/events - Upcoming active events, soonest first
#[utoipa::path(
    get,
    path = "/api/v1/community/events",
    tag = "community",
    params(PageQuery),
    responses((status = 200, description = "Upcoming events", body = [Event])),
    security(("bearer_auth" = []))
)]
pub async fn list_events_handler(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    Ok(Json(state.community.upcoming_events(page).await?))
}

/// POST /community/events
#[utoipa::path(
    post,
    path = "/api/v1/community/events",
    tag = "community",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid event")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(draft): JsonBody<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.community.create_event(caller.user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}
