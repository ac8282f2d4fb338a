//! Error handling for the Skylark worker
//!
//! None of these errors is fatal to the process: a failed roster fetch
//! keeps the previous roster, a failed evaluation is isolated to its
//! camera, and a failed dispatch drops the event.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Camera roster fetch failed (network, non-2xx, malformed body)
    #[error("Registry fetch failed: {0}")]
    RegistryFetch(String),

    /// Single camera evaluation failed or timed out
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Alert delivery failed (network or non-2xx acknowledgment)
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            Error::RegistryFetch(msg) => {
                (StatusCode::BAD_GATEWAY, "REGISTRY_FETCH_ERROR", msg.clone())
            }
            Error::Dispatch(msg) => (StatusCode::BAD_GATEWAY, "DISPATCH_ERROR", msg.clone()),
            Error::Evaluation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EVALUATION_ERROR",
                msg.clone(),
            ),
            Error::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERIALIZATION_ERROR",
                e.to_string(),
            ),
        };

        tracing::error!(
            status = %status,
            error_code = %error_code,
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error_code": error_code,
            "message": message
        }));

        (status, body).into_response()
    }
}
