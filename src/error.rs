//! # Error Handling
//!
//! Application error type and its conversion into HTTP responses.
//!
//! Gates and handlers return `AppResult<T>`; axum turns the error side into a
//! response through the `IntoResponse` impl below.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SQLx library errors)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed while (re)initializing the database
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Session store errors (load, save, serialization of session values)
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Authentication failures (401)
    ///
    /// The message is sent to the client as-is in `{"error": ...}`.
    #[error("{0}")]
    Unauthorized(String),

    /// The database is not ready and could not be reinitialized (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server errors (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(e) => {
                // Log details, return a generic message
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Migrate(e) => {
                tracing::error!("Migration error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error".to_string())
            }
            AppError::ServiceUnavailable(reason) => {
                tracing::error!("Service unavailable: {}", reason);
                // Empty body, like the database gate always answered
                return StatusCode::SERVICE_UNAVAILABLE.into_response();
            }
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            AppError::Internal(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        // Format: { "error": "error message here" }
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_sends_message_verbatim() {
        let response = AppError::Unauthorized("expired".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "expired" }));
    }

    #[tokio::test]
    async fn service_unavailable_has_empty_body() {
        let response = AppError::ServiceUnavailable("no database".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn database_errors_are_not_leaked() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "Database error" }));
    }
}
