//! Error types for huemap.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of the color-naming oracle collaborator.
///
/// `Clone` so a single underlying failure can fan out to every caller
/// awaiting the same in-flight request. The core never retries these;
/// retry policy belongs to the oracle side of the boundary.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Transport-level failure (connect, timeout, DNS)
    #[error("oracle network error: {0}")]
    Network(String),

    /// Oracle responded with a non-success status
    #[error("oracle returned status {0}: {1}")]
    Status(u16, String),

    /// Oracle response body could not be decoded
    #[error("oracle response decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OracleError::Decode(err.to_string())
        } else {
            OracleError::Network(err.to_string())
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The oracle collaborator failed (502)
    #[error("Oracle failure: {0}")]
    Oracle(#[from] OracleError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Oracle(ref err) => {
                (StatusCode::BAD_GATEWAY, "ORACLE_ERROR", err.to_string())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
