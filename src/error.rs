//! Error types for backend exchanges.

use thiserror::Error;

/// Shown when the request never reached the backend.
pub const UNREACHABLE_MESSAGE: &str =
    "Could not reach the agent. Please check that the server is running.";

/// Errors raised while talking to the agent backend.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The request never completed (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid backend URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend answered with a body we could not read.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, when the server sent one.
        detail: Option<String>,
    },
}

impl ExchangeError {
    /// Text for the error item shown in the conversation.
    ///
    /// Prefers the server-supplied detail, then a generic status
    /// description.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::Api { status, .. } => match reqwest::StatusCode::from_u16(*status) {
                Ok(code) => format!(
                    "Request failed: {} {}",
                    code.as_u16(),
                    code.canonical_reason().unwrap_or("Unknown Status")
                ),
                Err(_) => format!("Request failed with status {status}"),
            },
            Self::Decode(_) => "The agent sent a response that could not be read.".to_string(),
            Self::Transport(_) | Self::InvalidUrl(_) => UNREACHABLE_MESSAGE.to_string(),
        }
    }

    /// Whether the failure happened before any response arrived.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidUrl(_))
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;
