//! Error types for the publishing console

use thiserror::Error;

/// Main error type for the publishing console
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Unsupported file type: {0} (expected a .zip bundle)")]
    UnsupportedType(String),

    #[error("Invalid app name: {0}")]
    InvalidName(String),

    #[error("No bundle staged")]
    NothingStaged,

    #[error("Upload failed: {0}")]
    UploadTransportFailure(String),

    #[error("{message}")]
    UploadRejected { status: u16, message: String },

    #[error("Malformed response from server (HTTP {status})")]
    MalformedResponse { status: u16 },

    #[error("App list unavailable: {0}")]
    ListUnavailable(String),

    #[error("{message}")]
    ActionRejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    ActionTransportFailure(String),

    #[error("Stale action: app '{0}' is not in the current list")]
    StaleAction(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// HTTP status attached to a server-side rejection, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::UploadRejected { status, .. }
            | ConsoleError::MalformedResponse { status }
            | ConsoleError::ActionRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
