//! Conversation view items.
//!
//! The view is an ordered, append-only list. Items are never edited after
//! insertion; the only removals are the typing placeholder and answered
//! confirmation cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::state::ConfirmationRequest;

/// Who or what produced a view item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text the user sent.
    User,
    /// Backend reply.
    Assistant,
    /// Failed exchange.
    Error,
    /// HITL confirmation card.
    PendingConfirmation,
    /// Transient "agent is typing" placeholder.
    Typing,
}

/// One rendered entry of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewItem {
    /// Kind of item.
    pub role: Role,
    /// Text to display.
    pub text: String,
    /// Intent classification label, already humanized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Payload of a confirmation card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<ConfirmationRequest>,
}

impl ViewItem {
    fn plain(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            intent: None,
            confirmation: None,
        }
    }

    /// A user bubble.
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Role::User, text)
    }

    /// An assistant bubble with an optional raw intent (`travel_booking`).
    pub fn assistant(text: impl Into<String>, intent: Option<&str>) -> Self {
        Self {
            intent: intent.and_then(humanize_intent),
            ..Self::plain(Role::Assistant, text)
        }
    }

    /// An error bubble.
    pub fn error(text: impl Into<String>) -> Self {
        Self::plain(Role::Error, text)
    }

    /// A confirmation card.
    #[must_use]
    pub fn confirmation(request: ConfirmationRequest) -> Self {
        Self {
            text: request.prompt.clone().unwrap_or_default(),
            confirmation: Some(request),
            ..Self::plain(Role::PendingConfirmation, "")
        }
    }

    /// The typing placeholder.
    #[must_use]
    pub fn typing() -> Self {
        Self::plain(Role::Typing, "")
    }
}

/// Turn `travel_booking` into `travel booking`. Blank labels are dropped.
#[must_use]
pub fn humanize_intent(raw: &str) -> Option<String> {
    let label = raw.trim().replace('_', " ");
    (!label.is_empty()).then_some(label)
}

/// A view item with its insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The item.
    pub item: ViewItem,
    /// When it was appended.
    pub at: DateTime<Utc>,
}

/// Change applied to the view, forwarded to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    /// An entry was appended.
    Appended(Entry),
    /// Entries of this role were removed.
    Removed(Role),
    /// The view was emptied; the renderer shows the empty state.
    Cleared,
    /// The input field was emptied.
    InputCleared,
}

/// Ordered conversation view.
#[derive(Debug, Clone, Default)]
pub struct View {
    entries: Vec<Entry>,
}

impl View {
    /// An empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item stamped with the current time.
    pub fn push(&mut self, item: ViewItem) -> Entry {
        let entry = Entry {
            item,
            at: Utc::now(),
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Remove all items of `role`. Returns how many were removed.
    pub fn remove_role(&mut self, role: Role) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.item.role != role);
        before - self.entries.len()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Items in order.
    pub fn items(&self) -> impl Iterator<Item = &ViewItem> {
        self.entries.iter().map(|e| &e.item)
    }

    /// Number of items with `role`.
    #[must_use]
    pub fn count(&self, role: Role) -> usize {
        self.items().filter(|i| i.role == role).count()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No items; the empty state is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_label() {
        assert_eq!(
            humanize_intent("travel_booking").as_deref(),
            Some("travel booking")
        );
        assert_eq!(humanize_intent(" "), None);

        let item = ViewItem::assistant("Searching flights...", Some("travel_booking"));
        assert_eq!(item.intent.as_deref(), Some("travel booking"));
    }

    #[test]
    fn test_remove_role_keeps_order() {
        let mut view = View::new();
        view.push(ViewItem::user("hi"));
        view.push(ViewItem::typing());
        view.push(ViewItem::error("boom"));

        assert_eq!(view.remove_role(Role::Typing), 1);
        let roles: Vec<Role> = view.items().map(|i| i.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Error]);

        view.clear();
        assert!(view.is_empty());
    }
}
