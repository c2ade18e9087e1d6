//! Wire types for the agent API.
//!
//! Field names follow the backend's snake_case JSON. camelCase aliases are
//! accepted on responses so either server flavour can be used.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat API Types
// =============================================================================

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message, or an encoded confirmation reply.
    pub message: String,
    /// Thread to continue. Omitted to start a new thread.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "threadId")]
    pub thread_id: Option<String>,
}

impl ChatRequest {
    /// A plain text turn.
    pub fn text(message: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            thread_id,
        }
    }

    /// A confirmation reply. Always continues an existing thread.
    pub fn confirmation(confirmed: bool, thread_id: impl Into<String>) -> Self {
        Self {
            message: ConfirmationReply { confirmed }.encode(),
            thread_id: Some(thread_id.into()),
        }
    }
}

/// Structured answer to a HITL confirmation, sent as the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationReply {
    /// Whether the user approved the action.
    pub confirmed: bool,
}

impl ConfirmationReply {
    /// Encode as the JSON text carried in [`ChatRequest::message`].
    #[must_use]
    pub fn encode(self) -> String {
        if self.confirmed {
            r#"{"confirmed":true}"#.to_string()
        } else {
            r#"{"confirmed":false}"#.to_string()
        }
    }
}

/// Success body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Thread the exchange belongs to (assigned on the first turn).
    #[serde(alias = "threadId")]
    pub thread_id: String,
    /// Assistant text, or the interrupt prompt when paused.
    pub response: String,
    /// Intent classification, e.g. `travel_planning`.
    #[serde(default)]
    pub intent: Option<String>,
    /// The graph paused and waits for a confirmation.
    #[serde(default)]
    pub interrupted: bool,
    /// Payload describing the action awaiting confirmation.
    #[serde(default, alias = "interruptData")]
    pub interrupt_data: Option<InterruptData>,
}

/// Action awaiting user approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptData {
    /// Recipient of the side effect (phone number, booking reference).
    #[serde(default)]
    pub target: Option<String>,
    /// Text that will be sent once confirmed.
    #[serde(default, alias = "draftText")]
    pub draft_text: Option<String>,
    /// Free-form question the agent asks.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human readable reason.
    pub detail: Option<String>,
}

// =============================================================================
// Health
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    /// Server status string, usually `ok`.
    #[serde(default)]
    pub status: Option<String>,
    /// Whether the agent graph finished initializing.
    #[serde(default, alias = "agentReady")]
    pub agent_ready: Option<bool>,
}

// =============================================================================
// History
// =============================================================================

/// A message in a server-side thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// `user` or `assistant`.
    pub role: String,
    /// The message content.
    pub content: String,
}

/// Body of `GET /chat/{thread_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationHistory {
    /// Thread identifier.
    #[serde(alias = "threadId")]
    pub thread_id: String,
    /// Messages in order.
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// Body of `DELETE /chat/{thread_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClearThreadResponse {
    /// Thread identifier.
    #[serde(alias = "threadId")]
    pub thread_id: String,
    /// Whether the server acknowledged the clear.
    #[serde(default)]
    pub cleared: bool,
    /// Server note.
    #[serde(default)]
    pub note: Option<String>,
}
