//! Unified error types for the consoles service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Body returned for every server-side failure.
pub const SERVER_ERROR_BODY: &str = "Something went wrong";

/// Body returned when a console id has no matching record.
pub const NOT_FOUND_BODY: &str = "No record found for this console";

/// Startup-level errors. Any of these ends the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage could not be reached or prepared.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed storage call.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record has the requested id.
    #[error("console {0} not found")]
    NotFound(String),

    /// The id is not a valid document identifier, so no record can match it.
    #[error("malformed console id: {0}")]
    InvalidId(String),

    /// Another record already uses this name.
    #[error("a console named {0:?} already exists")]
    DuplicateName(String),

    /// The record does not satisfy the required-field rules.
    #[error("invalid console: {0}")]
    Invalid(String),

    /// Driver or server failure.
    #[error("database error: {0}")]
    Backend(#[from] mongodb::error::Error),
}

/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The id has no matching record.
    #[error("not found")]
    NotFound,

    /// Catch-all failure; the detail is logged, never returned.
    #[error("server error: {0}")]
    Server(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) | StoreError::InvalidId(_) => ApiError::NotFound,
            other => ApiError::Server(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response(),
            ApiError::Server(detail) => {
                error!(error = %detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response()
            }
        }
    }
}

/// Convenient Result type alias for storage calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
