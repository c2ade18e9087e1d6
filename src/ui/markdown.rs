//! Markdown-lite rendering for assistant replies.
//!
//! Supports `**bold**`, `*italic*` / `_italic_`, `` `code` `` and `-`/`*`
//! bullets. Everything else passes through untouched.

use std::sync::LazyLock;

use colored::Colorize;
use regex::{Captures, Regex};

static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\*([^*\s][^*\n]*)\*)|(?:\b_([^_\n]+)_\b)").expect("valid regex"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)[-*]\s+").expect("valid regex"));

/// Render `text` with terminal styling.
#[must_use]
pub fn render(text: &str) -> String {
    text.lines().map(render_line).collect::<Vec<_>>().join("\n")
}

fn render_line(line: &str) -> String {
    let line = BULLET.replace(line, "$1• ");
    let line = CODE.replace_all(&line, |c: &Captures<'_>| c[1].cyan().to_string());
    let line = BOLD.replace_all(&line, |c: &Captures<'_>| c[1].bold().to_string());
    let line = ITALIC.replace_all(&line, |c: &Captures<'_>| {
        c.get(1)
            .or_else(|| c.get(2))
            .map(|m| m.as_str().italic().to_string())
            .unwrap_or_default()
    });
    line.into_owned()
}
