//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its mapping
//! onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mentor_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;
use crate::web::rest::ErrorResponse;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core services.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The HTTP status a core error maps to.
pub fn status_for(err: &PortError) -> StatusCode {
    match err {
        PortError::Validation(_) | PortError::InsufficientBalance { .. } | PortError::NoOp => {
            StatusCode::BAD_REQUEST
        }
        PortError::Auth(_) | PortError::InvalidCredentials | PortError::AccountDeactivated => {
            StatusCode::UNAUTHORIZED
        }
        PortError::Forbidden(_) => StatusCode::FORBIDDEN,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The text clients see. Kinds that carry their own message drop the prefix.
fn client_message(err: &PortError) -> String {
    match err {
        PortError::Validation(msg)
        | PortError::NotFound(msg)
        | PortError::Forbidden(msg)
        | PortError::Conflict(msg) => msg.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Port(PortError::Unexpected(detail)) => {
                error!("Unexpected service error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::Port(err) => (status_for(err), client_message(err)),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_core::AuthError;
    use rust_decimal::Decimal;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (PortError::validation("x"), StatusCode::BAD_REQUEST),
            (PortError::Auth(AuthError::Expired), StatusCode::UNAUTHORIZED),
            (PortError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (PortError::AccountDeactivated, StatusCode::UNAUTHORIZED),
            (PortError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PortError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (PortError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                PortError::InsufficientBalance {
                    available: Decimal::ZERO,
                    requested: Decimal::ONE,
                },
                StatusCode::BAD_REQUEST,
            ),
            (PortError::NoOp, StatusCode::BAD_REQUEST),
            (PortError::Unexpected("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err), status, "{err}");
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::Port(PortError::Unexpected("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_messages_drop_the_kind_prefix() {
        assert_eq!(
            client_message(&PortError::validation("Passwords do not match")),
            "Passwords do not match"
        );
        assert_eq!(client_message(&PortError::NoOp), "No valid fields to update");
    }
}
