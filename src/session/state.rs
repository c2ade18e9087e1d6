//! Conversation session state.

use serde::{Deserialize, Serialize};

use crate::api::InterruptData;

/// Whether an exchange is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Ready to accept input.
    #[default]
    Idle,
    /// One exchange is outstanding; `epoch` is the session epoch it was
    /// issued under.
    Awaiting {
        /// Epoch tag of the outstanding request.
        epoch: u64,
    },
}

/// Action the backend paused on, waiting for the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Recipient of the action.
    pub target: String,
    /// Text that will be sent once confirmed.
    pub draft_text: String,
    /// Question asked by the agent, if any.
    pub prompt: Option<String>,
}

impl ConfirmationRequest {
    /// Build from an interrupted response. Missing fields become empty.
    #[must_use]
    pub fn from_interrupt(data: Option<InterruptData>, response_text: &str) -> Self {
        let data = data.unwrap_or_default();
        let prompt = data
            .prompt
            .or_else(|| (!response_text.trim().is_empty()).then(|| response_text.to_string()));
        Self {
            target: data.target.unwrap_or_default(),
            draft_text: data.draft_text.unwrap_or_default(),
            prompt,
        }
    }
}

/// The single conversation session of the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Backend-assigned thread, set after the first successful exchange.
    pub thread_id: Option<String>,
    /// In-flight guard.
    pub phase: Phase,
    /// The outstanding confirmation, if the last exchange was interrupted.
    pub pending_confirmation: Option<ConfirmationRequest>,
    /// Bumped on every reset; responses tagged with an older epoch are
    /// discarded.
    pub epoch: u64,
}

impl Session {
    /// A fresh session with no thread.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An exchange is outstanding.
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        matches!(self.phase, Phase::Awaiting { .. })
    }

    /// A confirmation card is waiting for the user.
    #[must_use]
    pub fn has_pending_confirmation(&self) -> bool {
        self.pending_confirmation.is_some()
    }

    /// `resolve_confirmation` would be accepted right now.
    #[must_use]
    pub fn can_resolve(&self) -> bool {
        self.thread_id.is_some() && !self.is_awaiting()
    }
}
