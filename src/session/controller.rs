//! Session controller.
//!
//! Owns the [`Session`] and its [`View`], feeds events through
//! [`transition`], and executes the resulting effects.

use std::sync::Arc;

use crate::api::Transport;
use crate::session::effect::{Effect, Exchange};
use crate::session::event::Event;
use crate::session::state::Session;
use crate::session::transition::{Rejected, transition};
use crate::session::view::{Role, View, ViewChange};

/// Outcome of dispatching one event.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// View changes, in order, for the renderer.
    pub changes: Vec<ViewChange>,
    /// Exchange to run, if the event issued one.
    pub exchange: Option<Exchange>,
}

/// Drives the single conversation session.
///
/// Two ways to use it:
/// - `send_message` / `resolve_confirmation` await the exchange inline;
/// - `dispatch` returns the [`Exchange`] so an event loop can run it on its
///   own task and feed the [`Event::Responded`] back later.
#[derive(Debug)]
pub struct Controller<T: ?Sized> {
    transport: Arc<T>,
    session: Session,
    view: View,
}

impl<T: Transport + ?Sized> Controller<T> {
    /// Create a controller with an empty session.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            session: Session::new(),
            view: View::new(),
        }
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current conversation view.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Shared handle to the transport.
    pub fn transport(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    /// Apply one event and execute its local effects.
    ///
    /// A rejected event leaves the session and view untouched.
    pub fn dispatch(&mut self, event: Event) -> Result<Dispatch, Rejected> {
        let step = transition(&self.session, event)?;
        self.session = step.session;

        let mut out = Dispatch::default();
        for effect in step.effects {
            match effect {
                Effect::Append(item) => {
                    let entry = self.view.push(item);
                    out.changes.push(ViewChange::Appended(entry));
                }
                Effect::RemoveTyping => {
                    if self.view.remove_role(Role::Typing) > 0 {
                        out.changes.push(ViewChange::Removed(Role::Typing));
                    }
                }
                Effect::RemoveConfirmations => {
                    if self.view.remove_role(Role::PendingConfirmation) > 0 {
                        out.changes.push(ViewChange::Removed(Role::PendingConfirmation));
                    }
                }
                Effect::ClearView => {
                    self.view.clear();
                    out.changes.push(ViewChange::Cleared);
                }
                Effect::ClearInput => out.changes.push(ViewChange::InputCleared),
                Effect::Request(exchange) => {
                    tracing::info!(
                        name: "session.exchange.issued",
                        thread_id = ?exchange.request.thread_id,
                        epoch = exchange.epoch,
                        "Issuing exchange"
                    );
                    out.exchange = Some(exchange);
                }
            }
        }
        Ok(out)
    }

    /// Send a user message and wait for the reply.
    pub async fn send_message(&mut self, text: &str) -> Result<Vec<ViewChange>, Rejected> {
        let dispatch = self.dispatch(Event::Submit {
            text: text.to_string(),
        })?;
        self.finish(dispatch).await
    }

    /// Answer the outstanding confirmation and wait for the reply.
    pub async fn resolve_confirmation(&mut self, confirmed: bool) -> Result<Vec<ViewChange>, Rejected> {
        let dispatch = self.dispatch(Event::Resolve { confirmed })?;
        self.finish(dispatch).await
    }

    /// Forget the thread and clear the view. No network call.
    pub fn reset_session(&mut self) -> Vec<ViewChange> {
        tracing::info!(name: "session.reset", thread_id = ?self.session.thread_id, "Resetting session");
        match self.dispatch(Event::Reset) {
            Ok(dispatch) => dispatch.changes,
            Err(_) => Vec::new(),
        }
    }

    /// Feed a finished exchange back into the session.
    pub fn complete(&mut self, event: Event) -> Vec<ViewChange> {
        if let Event::Responded { result: Err(e), .. } = &event {
            tracing::warn!(
                name: "session.exchange.failed",
                error = %e,
                transport = e.is_transport(),
                "Exchange failed"
            );
        }
        match self.dispatch(event) {
            Ok(dispatch) => dispatch.changes,
            Err(rejected) => {
                tracing::debug!(name: "session.response.ignored", reason = %rejected, "Ignoring response");
                Vec::new()
            }
        }
    }

    async fn finish(&mut self, dispatch: Dispatch) -> Result<Vec<ViewChange>, Rejected> {
        let Dispatch {
            mut changes,
            exchange,
        } = dispatch;
        if let Some(exchange) = exchange {
            let transport = self.transport();
            let event = exchange.execute(transport.as_ref()).await;
            changes.extend(self.complete(event));
        }
        Ok(changes)
    }
}
