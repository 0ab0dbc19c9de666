//! services/api/src/web/profile.rs

use axum::{extract::State, Extension, Json};
use mentor_core::domain::{ProfileUpdate, ProfileView, Settings};
use mentor_core::Caller;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::{extract::JsonBody, state::AppState};

/// GET /profile - The caller's account and extended profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profile",
    responses((status = 200, description = "Profile", body = ProfileView)),
    security(("bearer_auth" = []))
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.accounts.profile(caller.user_id).await?))
}

/// PUT /profile - Update personal fields and profile lists
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    tag = "profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = ProfileView),
        (status = 400, description = "Invalid update")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.accounts.update_profile(caller.user_id, update).await?))
}

/// GET /settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "profile",
    responses((status = 200, description = "Stored or default settings", body = Settings)),
    security(("bearer_auth" = []))
)]
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.accounts.settings(caller.user_id).await?))
}

/// PUT /settings
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "profile",
    request_body = Settings,
    responses(
        (status = 200, description = "Saved settings", body = Settings),
        (status = 400, description = "Invalid settings")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(settings): JsonBody<Settings>,
) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.accounts.update_settings(caller.user_id, settings).await?))
}
