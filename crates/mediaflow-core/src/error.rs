//! Error types for MediaFlow core operations.
//!
//! Every error is recovered at the controller boundary and rendered as an
//! inline status message; none of them is fatal to the page.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error category used by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught before any network call (empty URL, missing file or format).
    Validation,
    /// Network failure or non-success HTTP status.
    Request,
    /// Malformed wire data.
    Parse,
    /// Invalid client configuration.
    Configuration,
}

/// Errors that can occur in MediaFlow core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// An action of the same kind is already in flight.
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// The media service answered with a failure.
    #[error("{message}")]
    Request {
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Server-provided or generic message.
        message: String,
    },

    /// Transport-level failure (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The delivery backend could not hand the result to the browser.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Malformed data received from the service.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a request error carrying the HTTP status.
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Busy(_) => ErrorKind::Validation,
            Self::Request { .. } | Self::Network(_) | Self::Delivery(_) => ErrorKind::Request,
            Self::Parse(_) | Self::Serialization(_) => ErrorKind::Parse,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP status of a failed request, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }

    /// Text shown inline to the user.
    ///
    /// Server messages are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
