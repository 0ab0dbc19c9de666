//! services/api/src/web/dashboard.rs
//!
//! Dashboard aggregations for the caller, plus the public leaderboard.

use axum::{extract::State, Extension, Json};
use mentor_core::domain::{DashboardStats, LeaderboardEntry, MonthlyActivity, SessionDigest};
use mentor_core::Caller;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

/// GET /dashboard/stats
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "dashboard",
    responses((status = 200, description = "Headline numbers", body = DashboardStats)),
    security(("bearer_auth" = []))
)]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.dashboard.stats(&caller).await?))
}

/// GET /dashboard/recent-sessions
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/recent-sessions",
    tag = "dashboard",
    responses((status = 200, description = "Last 10 sessions from the caller's side", body = [SessionDigest])),
    security(("bearer_auth" = []))
)]
pub async fn recent_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<SessionDigest>>, ApiError> {
    Ok(Json(state.dashboard.recent_sessions(&caller).await?))
}

/// GET /dashboard/upcoming-sessions
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/upcoming-sessions",
    tag = "dashboard",
    responses((status = 200, description = "Scheduled or confirmed, soonest first", body = [SessionDigest])),
    security(("bearer_auth" = []))
)]
pub async fn upcoming_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<SessionDigest>>, ApiError> {
    Ok(Json(state.dashboard.upcoming_sessions(&caller).await?))
}

/// GET /dashboard/analytics
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/analytics",
    tag = "dashboard",
    responses((status = 200, description = "Per-month activity over the last six months", body = [MonthlyActivity])),
    security(("bearer_auth" = []))
)]
pub async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<MonthlyActivity>>, ApiError> {
    Ok(Json(state.dashboard.analytics(&caller).await?))
}

/// GET /leaderboard - Top solvers, public
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "dashboard",
    responses((status = 200, description = "Top 20 solvers", body = [LeaderboardEntry]))
)]
pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    Ok(Json(state.dashboard.leaderboard().await?))
}
