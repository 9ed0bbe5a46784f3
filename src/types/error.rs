//! Error types for the complaint service

use hyper::StatusCode;
use serde_json::json;

/// Main error type for complaint store operations
#[derive(Debug, thiserror::Error)]
pub enum KavachError {
    #[error("{0}")]
    BadRequest(String),

    /// One or more submitted fields failed validation
    #[error("Invalid complaint: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KavachError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error message may be shown to the caller verbatim
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// JSON error body. Server-side failures are reduced to `fallback` so that
    /// driver messages never reach the caller.
    pub fn to_body(&self, fallback: &str) -> serde_json::Value {
        match self {
            Self::Validation(details) => json!({
                "error": "Invalid complaint",
                "details": details,
            }),
            e if e.is_client_error() => json!({ "error": e.to_string() }),
            _ => json!({ "error": fallback }),
        }
    }
}

impl From<std::io::Error> for KavachError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for KavachError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<mongodb::error::Error> for KavachError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for KavachError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encoding failed: {}", err))
    }
}

/// Result type alias for complaint store operations
pub type Result<T> = std::result::Result<T, KavachError>;
