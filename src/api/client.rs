//! HTTP client for the agent API.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::api::Transport;
use crate::api::types::{
    ChatRequest, ChatResponse, ClearThreadResponse, ConversationHistory, ErrorBody,
    HealthResponse,
};
use crate::error::{ExchangeError, Result};
use crate::liveness::LivenessProbe;

/// HTTP client for the agent API.
///
/// # Example
///
/// ```rust,no_run
/// use traveops_chat::api::{ChatClient, ChatRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClient::new("http://localhost:8000")?;
/// let reply = client.chat(&ChatRequest::text("Hello!", None)).await?;
/// println!("{} ({})", reply.response, reply.thread_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the agent server (e.g., "http://localhost:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client whose chat requests give up after `timeout`.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // `Url::join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one exchange to `POST /chat`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(
            name: "api.chat.request",
            thread_id = ?request.thread_id,
            message_length = request.message.len(),
            "Sending chat request"
        );
        let response = self
            .http
            .post(self.url("chat")?)
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch the server-side history of a thread.
    pub async fn history(&self, thread_id: &str) -> Result<ConversationHistory> {
        let response = self
            .http
            .get(self.url(&format!("chat/{thread_id}"))?)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Ask the server to forget a thread.
    pub async fn clear_thread(&self, thread_id: &str) -> Result<ClearThreadResponse> {
        let response = self
            .http
            .delete(self.url(&format!("chat/{thread_id}"))?)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Query `GET /health` with a per-request timeout.
    pub async fn health_with_timeout(&self, timeout: Duration) -> Result<HealthResponse> {
        let response = self
            .http
            .get(self.url("health")?)
            .timeout(timeout)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            tracing::warn!(
                name: "api.response.error",
                status = status.as_u16(),
                detail = ?detail,
                "Agent API returned an error status"
            );
            Err(ExchangeError::Api {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

#[async_trait]
impl Transport for ChatClient {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat(request).await
    }

    async fn history(&self, thread_id: &str) -> Result<ConversationHistory> {
        ChatClient::history(self, thread_id).await
    }
}

#[async_trait]
impl LivenessProbe for ChatClient {
    async fn health(&self, timeout: Duration) -> Result<HealthResponse> {
        self.health_with_timeout(timeout).await
    }
}
