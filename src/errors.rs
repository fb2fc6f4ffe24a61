use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// No identity key (Aadhaar) exists for the given application id.
    IdentityNotFound(String),
    /// The primary loan application record is missing.
    ApplicationNotFound(String),
    /// A section lookup failed at the store level.
    StoreError(sqlx::Error),
    /// The external ML scorer call failed or returned malformed data.
    ScorerUnavailable(String),
    /// Bad request error (invalid input).
    BadRequest(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IdentityNotFound(msg) => write!(f, "Identity not found: {}", msg),
            AppError::ApplicationNotFound(msg) => write!(f, "Application not found: {}", msg),
            AppError::StoreError(e) => write!(f, "Store error: {}", e),
            AppError::ScorerUnavailable(msg) => write!(f, "Scorer unavailable: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Not-found variants map to 404, store and scorer failures to 500,
    /// invalid input to 400. Severity drives the log level.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::IdentityNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ApplicationNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::StoreError(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Store error".to_string())
            }
            AppError::ScorerUnavailable(msg) => {
                tracing::error!("Scorer unavailable: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Scoring service error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    /// Converts a `sqlx::Error` into an `AppError`.
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreError(err)
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::ScorerUnavailable(err.to_string())
    }
}
