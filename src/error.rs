//! Error types for the Fibonacci service
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Shared Cache Error ==
/// Failures talking to the shared cache. Never surfaced past the engine.
#[derive(Error, Debug)]
pub enum SharedCacheError {
    /// Could not establish or use the connection
    #[error("connection failed: {0}")]
    Connection(String),

    /// Call exceeded the configured timeout
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend rejected the command
    #[error("backend error: {0}")]
    Backend(#[from] redis::RedisError),
}

// == Codec Error ==
/// A cached value that could not be turned back into a sequence.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Not a JSON array of unsigned integers
    #[error("malformed cached sequence: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Parsed, but holds the wrong number of elements
    #[error("cached sequence has length {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Parsed, but the values do not follow the recurrence
    #[error("cached sequence is not a Fibonacci prefix")]
    NotFibonacci,
}

// == Sequence Error ==
/// Errors from the sequence engine itself.
///
/// Only reachable when a caller skips input validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("requested length {requested} exceeds maximum of {max}")]
    LengthOutOfRange { requested: usize, max: usize },
}

// == App Error ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or non-integer parameter
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Well-formed but unacceptable value
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Client exceeded its request budget
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Defect inside the service
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SequenceError> for AppError {
    fn from(err: SequenceError) -> Self {
        AppError::Internal(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::RateLimited(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Rate limit exceeded: {}", msg),
            ),
            AppError::Internal(msg) => {
                error!("Error processing request: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, AppError>;
