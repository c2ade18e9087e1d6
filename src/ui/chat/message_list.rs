//! Rendering of conversation items.

use chrono::Local;
use colored::Colorize;

use crate::session::{ConfirmationRequest, Entry, Role, ViewChange};
use crate::ui::markdown;

/// Render one view change, or `None` when the terminal has nothing to show
/// (removals cannot un-print a line).
#[must_use]
pub fn render_change(change: &ViewChange, title: &str, suggestions: &[String]) -> Option<String> {
    match change {
        ViewChange::Appended(entry) => Some(render_entry(entry)),
        ViewChange::Cleared => Some(render_empty_state(title, suggestions)),
        ViewChange::Removed(_) | ViewChange::InputCleared => None,
    }
}

/// Render a single entry.
#[must_use]
pub fn render_entry(entry: &Entry) -> String {
    let time = entry.at.with_timezone(&Local).format("%H:%M").to_string();
    let item = &entry.item;
    match item.role {
        Role::User => format!("{} {}\n{}", "you".green().bold(), time.dimmed(), indent(&item.text)),
        Role::Assistant => {
            let mut head = format!("{} {}", "agent".bright_blue().bold(), time.dimmed());
            if let Some(intent) = &item.intent {
                head.push_str(&format!(" {}", format!("[{intent}]").magenta()));
            }
            format!("{head}\n{}", indent(&markdown::render(&item.text)))
        }
        Role::Error => format!("{} {}", "error:".red().bold(), item.text.red()),
        Role::PendingConfirmation => {
            render_confirmation(item.confirmation.as_ref(), &item.text)
        }
        Role::Typing => "agent is typing…".dimmed().italic().to_string(),
    }
}

fn render_confirmation(request: Option<&ConfirmationRequest>, prompt: &str) -> String {
    let bar = "│".yellow();
    let mut lines = vec![format!("{} {}", "┌".yellow(), "Confirmation required".yellow().bold())];
    if !prompt.trim().is_empty() {
        for line in prompt.lines() {
            lines.push(format!("{bar} {line}"));
        }
    }
    if let Some(request) = request {
        if !request.target.is_empty() {
            lines.push(format!("{bar} {} {}", "To:".bold(), request.target));
        }
        if !request.draft_text.is_empty() {
            lines.push(format!("{bar} {} {}", "Draft:".bold(), request.draft_text));
        }
    }
    lines.push(format!(
        "{} {} to confirm, {} to cancel",
        "└".yellow(),
        "/yes".bright_cyan(),
        "/no".bright_cyan()
    ));
    lines.join("\n")
}

/// Welcome text with numbered suggestions.
#[must_use]
pub fn render_empty_state(title: &str, suggestions: &[String]) -> String {
    let mut lines = vec![
        format!("Start a conversation with {title}.")
            .bright_black()
            .to_string(),
    ];
    if !suggestions.is_empty() {
        lines.push("Try one of these (/s <n> to use it):".bright_black().to_string());
        for (i, suggestion) in suggestions.iter().enumerate() {
            lines.push(format!("  {} {suggestion}", format!("{}.", i + 1).bright_cyan()));
        }
    }
    lines.join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{View, ViewItem};

    fn rendered(item: ViewItem) -> String {
        colored::control::set_override(false);
        let mut view = View::new();
        let entry = view.push(item);
        render_entry(&entry)
    }

    #[test]
    fn test_assistant_shows_intent_label() {
        let text = rendered(ViewItem::assistant("Searching **flights**...", Some("travel_booking")));
        assert!(text.contains("[travel booking]"));
        assert!(text.ends_with("  Searching flights..."));
    }

    #[test]
    fn test_confirmation_card() {
        let text = rendered(ViewItem::confirmation(ConfirmationRequest {
            target: "+15551234567".to_string(),
            draft_text: "Running late".to_string(),
            prompt: Some("Send this WhatsApp message?".to_string()),
        }));
        assert!(text.contains("Confirmation required"));
        assert!(text.contains("To: +15551234567"));
        assert!(text.contains("Draft: Running late"));
        assert!(text.contains("/yes to confirm, /no to cancel"));
    }

    #[test]
    fn test_removals_render_nothing() {
        assert!(render_change(&ViewChange::Removed(Role::Typing), "t", &[]).is_none());
        assert!(render_change(&ViewChange::InputCleared, "t", &[]).is_none());
    }

    #[test]
    fn test_empty_state_lists_suggestions() {
        colored::control::set_override(false);
        let text = render_empty_state("TraveOps", &["Plan a trip".to_string()]);
        assert!(text.contains("Start a conversation with TraveOps."));
        assert!(text.contains("1. Plan a trip"));
    }
}
