//! services/api/src/web/router.rs
//!
//! Assembles the HTTP router: public, authenticated and admin route groups
//! under `/api/v1`, plus the health probe and Swagger UI.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    admin, auth, community, content, dashboard, health,
    middleware::{require_admin, require_auth},
    notifications, profile,
    rest::ApiDoc,
    sessions,
    state::AppState,
    wallet,
};

pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/refresh-token", post(auth::refresh_token_handler))
        .route("/leaderboard", get(dashboard::leaderboard_handler));

    let protected_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile_handler).put(profile::update_profile_handler),
        )
        .route(
            "/settings",
            get(profile::get_settings_handler).put(profile::update_settings_handler),
        )
        .route(
            "/sessions",
            get(sessions::list_sessions_handler).post(sessions::create_session_handler),
        )
        .route(
            "/sessions/{id}",
            get(sessions::get_session_handler)
                .put(sessions::update_session_handler)
                .delete(sessions::delete_session_handler),
        )
        .route("/wallet", get(wallet::get_wallet_handler))
        .route("/wallet/transactions", get(wallet::list_transactions_handler))
        .route("/wallet/transfer", post(wallet::transfer_handler))
        .route("/notifications", get(notifications::list_notifications_handler))
        .route(
            "/notifications/{id}/read",
            put(notifications::mark_notification_read_handler),
        )
        .route(
            "/notifications/{id}",
            axum::routing::delete(notifications::delete_notification_handler),
        )
        .route(
            "/content",
            get(content::list_content_handler).post(content::create_content_handler),
        )
        .route(
            "/content/{id}",
            get(content::get_content_handler)
                .put(content::update_content_handler)
                .delete(content::delete_content_handler),
        )
        .route(
            "/community/discussions",
            get(community::list_discussions_handler).post(community::create_discussion_handler),
        )
        .route(
            "/community/events",
            get(community::list_events_handler).post(community::create_event_handler),
        )
        .route("/dashboard/stats", get(dashboard::stats_handler))
        .route("/dashboard/recent-sessions", get(dashboard::recent_sessions_handler))
        .route("/dashboard/upcoming-sessions", get(dashboard::upcoming_sessions_handler))
        .route("/dashboard/analytics", get(dashboard::analytics_handler))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run outermost-last, so authentication wraps the admin check.
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users_handler))
        .route("/admin/users/{id}/status", put(admin::update_user_status_handler))
        .route("/admin/sessions/all", get(admin::list_all_sessions_handler))
        .route("/admin/analytics/platform", get(admin::platform_analytics_handler))
        .route_layer(axum_middleware::from_fn(require_admin))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api_router)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}
