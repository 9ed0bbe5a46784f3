//! Client side of the complaint service
//!
//! - `api`: typed HTTP client for the complaint API
//! - `form`: turns raw form input into a submission the server will accept
//! - `tracker`: polls a case and publishes the latest record

pub mod api;
pub mod form;
pub mod tracker;

pub use api::ComplaintClient;
pub use form::ComplaintForm;
pub use tracker::{CaseSource, Tracker, TrackerUpdate, DEFAULT_POLL_INTERVAL};

/// Errors seen by API consumers
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error status
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    /// Rejected before anything was sent
    #[error("Invalid complaint: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message suitable for showing to the person using the form
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Validation(problems) => problems.join("\n"),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
