//! services/api/src/web/notifications.rs

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use mentor_core::domain::Notification;
use mentor_core::Caller;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::rest::MessageResponse;
use crate::web::state::AppState;

/// GET /notifications - The 50 most recent
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "notifications",
    responses((status = 200, description = "Newest first", body = [Notification])),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifier.list(caller.user_id).await?))
}

/// PUT /notifications/{id}/read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses((status = 200, description = "Marked as read", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notifier.mark_read(caller.user_id, id).await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// DELETE /notifications/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses((status = 200, description = "Deleted", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn delete_notification_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notifier.delete(caller.user_id, id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}
