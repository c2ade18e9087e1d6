//! Agent API access.
//!
//! - [`types`]: request/response bodies of the agent backend
//! - [`client`]: `reqwest` implementation of [`Transport`]

pub mod client;
pub mod types;

pub use client::ChatClient;
pub use types::{
    ChatRequest, ChatResponse, ConfirmationReply, ConversationHistory, HealthResponse,
    HistoryMessage, InterruptData,
};

use crate::error::{ExchangeError, Result};

/// Carries one exchange to the backend and returns its reply.
///
/// The session controller only depends on this trait, so tests can script
/// replies without a live server.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the matching response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers with a
    /// non-success status.
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Fetch the server-side history of `thread_id`.
    ///
    /// Transports without a history endpoint answer `501 Not Implemented`.
    async fn history(&self, thread_id: &str) -> Result<ConversationHistory> {
        tracing::debug!(name: "api.history.unsupported", thread_id, "Transport has no history endpoint");
        Err(ExchangeError::Api {
            status: 501,
            detail: Some("History is not available for this connection.".to_string()),
        })
    }
}
