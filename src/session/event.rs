//! Inputs to the session state machine.

use crate::api::ChatResponse;
use crate::error::ExchangeError;

/// Something that happened to the session.
#[derive(Debug)]
pub enum Event {
    /// The user submitted text.
    Submit {
        /// Raw input, trimmed by the transition.
        text: String,
    },
    /// The user answered the confirmation card.
    Resolve {
        /// Approve or cancel.
        confirmed: bool,
    },
    /// Start over with an empty conversation.
    Reset,
    /// An exchange finished.
    Responded {
        /// Epoch the request was issued under.
        epoch: u64,
        /// Backend reply or failure.
        result: Result<ChatResponse, ExchangeError>,
    },
}
