//! Pure state transitions.
//!
//! `transition` never performs I/O: it takes the current session and an
//! event and returns the next session plus the effects to run.

use thiserror::Error;

use crate::api::{ChatRequest, ChatResponse};
use crate::error::ExchangeError;
use crate::session::effect::{Effect, Exchange};
use crate::session::event::Event;
use crate::session::state::{ConfirmationRequest, Phase, Session};
use crate::session::view::ViewItem;

/// Label of the user item appended when a confirmation is approved.
pub const CONFIRMED_LABEL: &str = "confirmed";
/// Label of the user item appended when a confirmation is declined.
pub const CANCELLED_LABEL: &str = "cancelled";

/// Why an event left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    /// Input was empty after trimming.
    #[error("nothing to send")]
    Empty,
    /// An exchange is already in flight.
    #[error("still waiting for the agent")]
    Busy,
    /// Confirmation answered before any thread exists.
    #[error("no conversation to confirm")]
    NoThread,
    /// A response arrived while no exchange was outstanding.
    #[error("unexpected response")]
    Unexpected,
}

/// Result of an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Next session state.
    pub session: Session,
    /// Effects in execution order.
    pub effects: Vec<Effect>,
}

/// Compute the next session state for `event`.
pub fn transition(session: &Session, event: Event) -> Result<Step, Rejected> {
    match event {
        Event::Submit { text } => submit(session, &text),
        Event::Resolve { confirmed } => resolve(session, confirmed),
        Event::Reset => Ok(reset(session)),
        Event::Responded { epoch, result } => responded(session, epoch, result),
    }
}

fn submit(session: &Session, text: &str) -> Result<Step, Rejected> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Rejected::Empty);
    }
    if session.is_awaiting() {
        return Err(Rejected::Busy);
    }

    // Typing past a confirmation card abandons it.
    let prefix = if session.has_pending_confirmation() {
        vec![Effect::RemoveConfirmations]
    } else {
        Vec::new()
    };
    let request = ChatRequest::text(text, session.thread_id.clone());
    let mut step = issue(session, ViewItem::user(text), request, prefix);
    step.session.pending_confirmation = None;
    Ok(step)
}

fn resolve(session: &Session, confirmed: bool) -> Result<Step, Rejected> {
    if !session.can_resolve() {
        return Err(if session.is_awaiting() {
            Rejected::Busy
        } else {
            Rejected::NoThread
        });
    }
    let Some(thread_id) = session.thread_id.clone() else {
        return Err(Rejected::NoThread);
    };

    let label = if confirmed {
        CONFIRMED_LABEL
    } else {
        CANCELLED_LABEL
    };
    let request = ChatRequest::confirmation(confirmed, thread_id);
    let mut step = issue(
        session,
        ViewItem::user(label),
        request,
        vec![Effect::RemoveConfirmations],
    );
    step.session.pending_confirmation = None;
    Ok(step)
}

/// Shared tail of submit/resolve: show the user item, lock input, send.
fn issue(session: &Session, user_item: ViewItem, request: ChatRequest, mut effects: Vec<Effect>) -> Step {
    let mut next = session.clone();
    next.phase = Phase::Awaiting {
        epoch: session.epoch,
    };

    effects.extend([
        Effect::Append(user_item),
        Effect::ClearInput,
        Effect::Append(ViewItem::typing()),
        Effect::Request(Exchange {
            epoch: session.epoch,
            request,
        }),
    ]);
    Step {
        session: next,
        effects,
    }
}

fn reset(session: &Session) -> Step {
    // An outstanding request still counts as in flight until it lands; its
    // reply carries the old epoch and is dropped.
    let next = Session {
        thread_id: None,
        phase: session.phase,
        pending_confirmation: None,
        epoch: session.epoch.wrapping_add(1),
    };
    Step {
        session: next,
        effects: vec![Effect::ClearView, Effect::ClearInput],
    }
}

fn responded(
    session: &Session,
    epoch: u64,
    result: Result<ChatResponse, ExchangeError>,
) -> Result<Step, Rejected> {
    if !session.is_awaiting() {
        return Err(Rejected::Unexpected);
    }

    let mut next = session.clone();
    next.phase = Phase::Idle;

    if epoch != session.epoch {
        tracing::debug!(
            name: "session.response.stale",
            response_epoch = epoch,
            session_epoch = session.epoch,
            "Dropping response from a reset conversation"
        );
        return Ok(Step {
            session: next,
            effects: Vec::new(),
        });
    }

    let mut effects = vec![Effect::RemoveTyping];
    match result {
        Ok(response) => {
            next.thread_id = Some(response.thread_id);
            if response.interrupted {
                let request =
                    ConfirmationRequest::from_interrupt(response.interrupt_data, &response.response);
                next.pending_confirmation = Some(request.clone());
                effects.push(Effect::Append(ViewItem::confirmation(request)));
            } else {
                next.pending_confirmation = None;
                effects.push(Effect::Append(ViewItem::assistant(
                    response.response,
                    response.intent.as_deref(),
                )));
            }
        }
        Err(e) => {
            effects.push(Effect::Append(ViewItem::error(e.user_message())));
        }
    }

    Ok(Step {
        session: next,
        effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InterruptData;
    use crate::error::UNREACHABLE_MESSAGE;
    use crate::session::view::Role;

    fn submit_text(session: &Session, text: &str) -> Result<Step, Rejected> {
        transition(
            session,
            Event::Submit {
                text: text.to_string(),
            },
        )
    }

    fn reply(thread_id: &str, text: &str, intent: Option<&str>) -> ChatResponse {
        ChatResponse {
            thread_id: thread_id.to_string(),
            response: text.to_string(),
            intent: intent.map(str::to_string),
            interrupted: false,
            interrupt_data: None,
        }
    }

    fn appended(step: &Step) -> Vec<&ViewItem> {
        step.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Append(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    fn requests(step: &Step) -> Vec<&Exchange> {
        step.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Request(x) => Some(x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_blank_input_rejected() {
        let session = Session::new();
        assert_eq!(submit_text(&session, ""), Err(Rejected::Empty));
        assert_eq!(submit_text(&session, "   "), Err(Rejected::Empty));
    }

    #[test]
    fn test_submit_issues_one_request() {
        let step = submit_text(&Session::new(), "  Book a flight to Tokyo ").unwrap();

        assert!(step.session.is_awaiting());
        assert_eq!(
            step.effects,
            vec![
                Effect::Append(ViewItem::user("Book a flight to Tokyo")),
                Effect::ClearInput,
                Effect::Append(ViewItem::typing()),
                Effect::Request(Exchange {
                    epoch: 0,
                    request: ChatRequest::text("Book a flight to Tokyo", None),
                }),
            ]
        );
    }

    #[test]
    fn test_submit_rejected_while_awaiting() {
        let step = submit_text(&Session::new(), "first").unwrap();
        assert_eq!(submit_text(&step.session, "second"), Err(Rejected::Busy));
        assert_eq!(
            transition(&step.session, Event::Resolve { confirmed: true }),
            Err(Rejected::Busy)
        );
    }

    #[test]
    fn test_success_appends_assistant_and_sets_thread() {
        let awaiting = submit_text(&Session::new(), "Book a flight to Tokyo").unwrap();
        let step = transition(
            &awaiting.session,
            Event::Responded {
                epoch: 0,
                result: Ok(reply("abc123", "Searching flights...", Some("travel_booking"))),
            },
        )
        .unwrap();

        assert_eq!(step.session.thread_id.as_deref(), Some("abc123"));
        assert!(!step.session.is_awaiting());
        assert_eq!(step.effects[0], Effect::RemoveTyping);
        let items = appended(&step);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].role, Role::Assistant);
        assert_eq!(items[0].intent.as_deref(), Some("travel booking"));
    }

    #[test]
    fn test_interrupted_appends_confirmation_only() {
        let awaiting = submit_text(&Session::new(), "Text Sam I'm late").unwrap();
        let mut response = reply("abc123", "Send this message?", None);
        response.interrupted = true;
        response.interrupt_data = Some(InterruptData {
            target: Some("+15551234567".to_string()),
            draft_text: Some("Running late".to_string()),
            prompt: None,
        });

        let step = transition(
            &awaiting.session,
            Event::Responded {
                epoch: 0,
                result: Ok(response),
            },
        )
        .unwrap();

        let items = appended(&step);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].role, Role::PendingConfirmation);
        let card = items[0].confirmation.as_ref().unwrap();
        assert_eq!(card.target, "+15551234567");
        assert_eq!(card.draft_text, "Running late");
        assert!(step.session.has_pending_confirmation());
        assert!(step.session.can_resolve());
    }

    #[test]
    fn test_resolve_sends_structured_reply() {
        let session = Session {
            thread_id: Some("abc123".to_string()),
            pending_confirmation: Some(ConfirmationRequest::default()),
            ..Session::new()
        };
        let step = transition(&session, Event::Resolve { confirmed: true }).unwrap();

        assert_eq!(step.effects[0], Effect::RemoveConfirmations);
        assert_eq!(appended(&step)[0], &ViewItem::user(CONFIRMED_LABEL));
        let sent = requests(&step);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].request.message, r#"{"confirmed":true}"#);
        assert_eq!(sent[0].request.thread_id.as_deref(), Some("abc123"));
        assert!(!step.session.has_pending_confirmation());
    }

    fn interrupted(thread_id: &str) -> ChatResponse {
        let mut response = reply(thread_id, "Send this message?", None);
        response.interrupted = true;
        response
    }

    /// Runs `step` and its reply, tracking how many cards stay on screen.
    fn settle(step: Step, response: ChatResponse, cards: &mut usize) -> Session {
        for effect in &step.effects {
            if *effect == Effect::RemoveConfirmations {
                *cards = 0;
            }
        }
        let done = transition(
            &step.session,
            Event::Responded {
                epoch: step.session.epoch,
                result: Ok(response),
            },
        )
        .unwrap();
        *cards += appended(&done)
            .iter()
            .filter(|item| item.role == Role::PendingConfirmation)
            .count();
        done.session
    }

    #[test]
    fn test_text_past_card_removes_it() {
        let mut cards = 0;
        let session = settle(submit_text(&Session::new(), "Text Sam").unwrap(), interrupted("abc123"), &mut cards);
        assert_eq!(cards, 1);

        let step = submit_text(&session, "Actually, what's the weather?").unwrap();
        assert_eq!(step.effects[0], Effect::RemoveConfirmations);
        assert!(!step.session.has_pending_confirmation());
        let session = settle(step, reply("abc123", "Sunny", None), &mut cards);
        assert_eq!(cards, 0);

        let session = settle(submit_text(&session, "Text Sam again").unwrap(), interrupted("abc123"), &mut cards);
        assert_eq!(cards, 1);
        assert!(session.has_pending_confirmation());

        let session = settle(submit_text(&session, "Never mind").unwrap(), interrupted("abc123"), &mut cards);
        assert_eq!(cards, 1);
        assert!(session.has_pending_confirmation());
    }

    #[test]
    fn test_plain_submit_has_no_removal() {
        let step = submit_text(&Session::new(), "hi").unwrap();
        assert!(!step.effects.contains(&Effect::RemoveConfirmations));
    }

    #[test]
    fn test_resolve_without_thread_is_noop() {
        assert_eq!(
            transition(&Session::new(), Event::Resolve { confirmed: false }),
            Err(Rejected::NoThread)
        );
    }

    #[test]
    fn test_failure_appends_error_and_returns_idle() {
        let awaiting = submit_text(&Session::new(), "hello").unwrap();
        let step = transition(
            &awaiting.session,
            Event::Responded {
                epoch: 0,
                result: Err(ExchangeError::Api {
                    status: 503,
                    detail: None,
                }),
            },
        )
        .unwrap();

        assert!(!step.session.is_awaiting());
        assert!(step.session.thread_id.is_none());
        let items = appended(&step);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].role, Role::Error);
        assert_eq!(items[0].text, "Request failed: 503 Service Unavailable");
        assert_ne!(items[0].text, UNREACHABLE_MESSAGE);
    }

    #[test]
    fn test_reset_clears_everything() {
        let session = Session {
            thread_id: Some("abc123".to_string()),
            phase: Phase::Idle,
            pending_confirmation: Some(ConfirmationRequest::default()),
            epoch: 4,
        };
        let step = transition(&session, Event::Reset).unwrap();
        assert!(step.session.thread_id.is_none());
        assert!(!step.session.has_pending_confirmation());
        assert_eq!(step.session.epoch, 5);
        assert_eq!(step.effects, vec![Effect::ClearView, Effect::ClearInput]);
    }

    #[test]
    fn test_stale_response_after_reset_is_dropped() {
        let awaiting = submit_text(&Session::new(), "hello").unwrap();
        let after_reset = transition(&awaiting.session, Event::Reset).unwrap().session;
        assert!(after_reset.is_awaiting());

        let step = transition(
            &after_reset,
            Event::Responded {
                epoch: 0,
                result: Ok(reply("abc123", "late", None)),
            },
        )
        .unwrap();

        assert!(step.effects.is_empty());
        assert!(step.session.thread_id.is_none());
        assert!(!step.session.is_awaiting());
    }

    #[test]
    fn test_response_while_idle_is_unexpected() {
        let result = transition(
            &Session::new(),
            Event::Responded {
                epoch: 0,
                result: Ok(reply("x", "y", None)),
            },
        );
        assert_eq!(result, Err(Rejected::Unexpected));
    }
}
