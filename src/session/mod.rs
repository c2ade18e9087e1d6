//! Conversation session management.
//!
//! The session follows a small state machine with pure transitions: the
//! [`transition`] function maps `(Session, Event)` to the next session plus a
//! list of [`Effect`]s, and the [`Controller`] executes those effects against
//! the [`View`] and an injected [`Transport`](crate::api::Transport).
//!
//! # Architecture
//!
//! - [`Session`]: thread id, in-flight phase, outstanding confirmation
//! - [`View`]: ordered conversation items
//! - [`Controller`]: `send_message`, `resolve_confirmation`, `reset_session`
//!
//! # Example
//!
//! ```rust
//! use traveops_chat::session::{Event, Session, transition};
//!
//! let step = transition(&Session::new(), Event::Submit { text: "Hello!".into() }).unwrap();
//! assert!(step.session.is_awaiting());
//! ```

mod controller;
mod effect;
mod event;
mod state;
mod transition;
mod view;

pub use controller::{Controller, Dispatch};
pub use effect::{Effect, Exchange};
pub use event::Event;
pub use state::{ConfirmationRequest, Phase, Session};
pub use transition::{CANCELLED_LABEL, CONFIRMED_LABEL, Rejected, Step, transition};
pub use view::{Entry, Role, View, ViewChange, ViewItem, humanize_intent};
