//! Error types for the query service and the live-update broadcaster

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::api::websocket::broadcaster::SubscriberId;

/// Result type for broadcaster operations
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Errors raised by queries against the record table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Student not found")]
    StudentNotFound(String),

    #[error("Class not found")]
    ClassNotFound(String),
}

/// Why a single transmission attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransmitFailure {
    #[error("send timed out")]
    Timeout,

    #[error("connection closed")]
    Closed,
}

/// Errors raised inside the live-update broadcaster
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// Registration attempted after the loop stopped
    #[error("live updates are not available")]
    ServiceUnavailable,

    /// One subscriber could not be reached; handled inside the fan-out
    #[error("transmission to subscriber {id} failed: {reason}")]
    Transmission {
        id: SubscriberId,
        reason: TransmitFailure,
    },

    /// A tick could not produce a snapshot; the tick is skipped
    #[error("snapshot computation failed: {0}")]
    Computation(String),

    /// Unrecoverable fault; the loop stops
    #[error("broadcaster fault: {0}")]
    Fault(String),
}

/// Application error returned by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error flag
    pub error: bool,
    /// Machine readable error code
    pub code: String,
    /// Error message
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl From<BroadcastError> for AppError {
    fn from(err: BroadcastError) -> Self {
        match err {
            BroadcastError::ServiceUnavailable => AppError::ServiceUnavailable(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
