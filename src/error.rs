//! Courtside error types

use std::time::Duration;

/// Courtside error types
#[derive(Debug, thiserror::Error)]
pub enum CourtsideError {
    // Session/permission errors
    #[error("session is not authorized")]
    Unauthorized,

    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    // Request errors
    #[error("resource not found")]
    NotFound,

    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    // Transport/server errors
    #[error("server error ({status})")]
    Server { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    /// The request was superseded and its result is obsolete.
    ///
    /// Internal signal, never user-visible. Swallowed at the point of
    /// occurrence rather than surfaced as a failure.
    #[error("request cancelled")]
    Cancelled,

    // Data errors
    #[error("malformed server payload: {0}")]
    Decoding(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CourtsideError {
    /// Whether this error signals an obsolete result rather than a problem.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CourtsideError::Cancelled)
    }

    /// Human-readable message for display.
    ///
    /// Never exposes a raw status code or technical detail. Server-supplied
    /// reasons (cancellation rejections, validation messages) pass through
    /// because they are written for the member.
    pub fn user_message(&self) -> String {
        match self {
            CourtsideError::Unauthorized => {
                "Your session has expired. Please sign in again.".into()
            }
            CourtsideError::Forbidden { reason } => reason.clone(),
            CourtsideError::NotFound => "The requested data is no longer available.".into(),
            CourtsideError::BadRequest { reason } => reason.clone(),
            CourtsideError::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".into()
            }
            CourtsideError::Server { .. } => {
                "The booking service is currently unavailable. Please try again later.".into()
            }
            CourtsideError::Network(_) => {
                "Connection problem. Please check your network and try again.".into()
            }
            CourtsideError::Cancelled => String::new(),
            CourtsideError::Decoding(_) => {
                "The booking service returned an unexpected response.".into()
            }
            CourtsideError::Configuration(msg) => msg.clone(),
        }
    }
}

impl From<serde_json::Error> for CourtsideError {
    fn from(err: serde_json::Error) -> Self {
        CourtsideError::Decoding(err.to_string())
    }
}

impl From<reqwest::Error> for CourtsideError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CourtsideError::Decoding(err.to_string())
        } else {
            CourtsideError::Network(err.to_string())
        }
    }
}

/// Result type alias for Courtside operations
pub type Result<T> = std::result::Result<T, CourtsideError>;
