//! Error types for the realtime relay.
//!
//! [`RelayError`] is the explicit outcome of a failed upstream call; handlers
//! map it to a status/body pair. [`AppError`] covers bootstrap failures and
//! the few handler paths that are not part of the relay contract.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of a single upstream round trip.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Upstream answered with a non-2xx status. `body` is the raw response text.
    #[error("upstream responded with {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Network failure, timeout, or an unparseable upstream response.
    #[error("{0}")]
    Local(String),
}

impl RelayError {
    /// Status code to report to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Upstream { status, .. } => *status,
            RelayError::Local(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `details` (or `error`) field of the response.
    pub fn detail(&self) -> &str {
        match self {
            RelayError::Upstream { body, .. } => body,
            RelayError::Local(message) => message,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, RelayError::Upstream { .. })
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Local(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Local(format!("invalid upstream response: {}", e))
    }
}

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The outbound HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
