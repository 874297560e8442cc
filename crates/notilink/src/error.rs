//! Notification client error types.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors that can occur while delivering notifications.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Connection-related errors (WebSocket open/send failures)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Wire envelope parsing errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// REST companion errors, propagated unmodified to the caller
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid endpoint or socket URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON encode/decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl NotifyError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
