//! services/api/src/web/rest.rs
//!
//! Shared REST payloads and the master definition for the OpenAPI
//! document.

use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    IntoParams, Modify, OpenApi, ToSchema,
};

use crate::web::{admin, auth, community, content, dashboard, health, notifications, profile, sessions, wallet};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_handler,
        auth::register_handler,
        auth::login_handler,
        auth::refresh_token_handler,
        profile::get_profile_handler,
        profile::update_profile_handler,
        profile::get_settings_handler,
        profile::update_settings_handler,
        sessions::list_sessions_handler,
        sessions::create_session_handler,
        sessions::get_session_handler,
        sessions::update_session_handler,
        sessions::delete_session_handler,
        wallet::get_wallet_handler,
        wallet::list_transactions_handler,
        wallet::transfer_handler,
        notifications::list_notifications_handler,
        notifications::mark_notification_read_handler,
        notifications::delete_notification_handler,
        content::list_content_handler,
        content::create_content_handler,
        content::get_content_handler,
        content::update_content_handler,
        content::delete_content_handler,
        community::list_discussions_handler,
        community::create_discussion_handler,
        community::list_events_handler,
        community::create_event_handler,
        dashboard::stats_handler,
        dashboard::recent_sessions_handler,
        dashboard::upcoming_sessions_handler,
        dashboard::analytics_handler,
        dashboard::leaderboard_handler,
        admin::list_users_handler,
        admin::update_user_status_handler,
        admin::list_all_sessions_handler,
        admin::platform_analytics_handler,
    ),
    components(schemas(MessageResponse, ErrorResponse)),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and token refresh."),
        (name = "sessions", description = "Mentoring session lifecycle."),
        (name = "wallet", description = "Balances and the transaction ledger."),
        (name = "notifications", description = "In-app notifications."),
        (name = "content", description = "Solver content catalogue."),
        (name = "community", description = "Discussions and events."),
        (name = "dashboard", description = "Per-user aggregates and the leaderboard."),
        (name = "admin", description = "Platform administration.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

//=========================================================================================
// Shared Payloads
//=========================================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Defaults to 20, capped at 100.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Acknowledgement for operations with nothing else to return.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_bearer_auth_and_core_paths() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/api/v1/sessions/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/wallet/transfer"));
    }
}
