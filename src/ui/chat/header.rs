//! Chat header and status indicator.

use colored::Colorize;

use crate::liveness::Status;

/// Colored status dot with label.
#[must_use]
pub fn status_indicator(status: Status) -> String {
    let text = format!("● {}", status.label());
    match status {
        Status::Ready => text.green().to_string(),
        Status::Starting => text.yellow().to_string(),
        Status::Unreachable => text.red().to_string(),
        Status::Unknown => text.dimmed().to_string(),
    }
}

/// Title line shown at startup and on `/status`.
#[must_use]
pub fn render_header(title: &str, status: Status) -> String {
    format!("{}  {}", title.bright_magenta().bold(), status_indicator(status))
}

/// Line printed when the poller reports a new status.
#[must_use]
pub fn render_status_change(status: Status) -> String {
    format!("{} {}", "agent".dimmed(), status_indicator(status))
}
