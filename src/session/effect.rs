//! Outputs of the session state machine.

use crate::api::{ChatRequest, Transport};
use crate::session::event::Event;
use crate::session::view::ViewItem;

/// Work the controller carries out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an item to the conversation view.
    Append(ViewItem),
    /// Drop the typing placeholder.
    RemoveTyping,
    /// Drop confirmation cards.
    RemoveConfirmations,
    /// Remove every item.
    ClearView,
    /// Empty the input field.
    ClearInput,
    /// Issue one exchange to the backend.
    Request(Exchange),
}

/// A request tagged with the session epoch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Session epoch at issue time.
    pub epoch: u64,
    /// Body sent to the backend.
    pub request: ChatRequest,
}

impl Exchange {
    /// Run the request and wrap the outcome as a [`Event::Responded`].
    pub async fn execute<T: Transport + ?Sized>(self, transport: &T) -> Event {
        let result = transport.exchange(&self.request).await;
        Event::Responded {
            epoch: self.epoch,
            result,
        }
    }
}
