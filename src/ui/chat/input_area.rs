//! Line editor and slash commands.
//!
//! The editor blocks, so it lives on its own thread. The shell asks for a
//! prompt with a [`PromptRequest`] only when the session is idle; while an
//! exchange is in flight no prompt is shown, which keeps input disabled.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use anyhow::Context as _;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Cmd, Context, Editor, EventHandler, ExternalPrinter, Helper, KeyCode, KeyEvent, Modifiers};
use tokio::sync::mpsc;

use super::shell::Printer;

/// Slash commands understood by the shell.
pub const COMMANDS: [&str; 8] = [
    "/yes", "/no", "/new", "/history", "/status", "/s", "/help", "/quit",
];

/// Parsed user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the agent.
    Send(String),
    /// Approve the pending action.
    Confirm,
    /// Decline the pending action.
    Cancel,
    /// Start a new conversation.
    Reset,
    /// Show the server-side history of the thread.
    History,
    /// Show the backend status.
    Status,
    /// Prefill the next prompt with suggestion `n` (1-based).
    Suggest(usize),
    /// List commands.
    Help,
    /// Leave.
    Quit,
    /// Unrecognized slash command.
    Unknown(String),
}

impl Command {
    /// Parse one submitted buffer.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if !trimmed.starts_with('/') {
            return Self::Send(input.to_string());
        }
        // `//text` sends `/text` literally.
        if let Some(literal) = trimmed.strip_prefix("//") {
            return Self::Send(format!("/{literal}"));
        }
        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "/yes" | "/confirm" => Self::Confirm,
            "/no" | "/cancel" => Self::Cancel,
            "/new" | "/reset" => Self::Reset,
            "/history" => Self::History,
            "/status" => Self::Status,
            "/s" | "/suggest" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n > 0 => Self::Suggest(n),
                _ => Self::Unknown(trimmed.to_string()),
            },
            "/help" | "/?" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Help text for `/help`.
#[must_use]
pub fn help_text() -> String {
    [
        ("Enter", "send message"),
        ("Alt+Enter", "insert a new line"),
        ("/yes, /no", "confirm or cancel a pending action"),
        ("/new", "start a new conversation"),
        ("/history", "show the server-side thread history"),
        ("/status", "show agent status"),
        ("/s <n>", "prefill suggestion n"),
        ("//text", "send text starting with /"),
        ("/quit", "exit"),
    ]
    .iter()
    .map(|(key, what)| format!("  {} {}", format!("{key:<12}").bright_cyan(), what.bright_black()))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Request to show a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    /// Text placed in the buffer before the cursor.
    pub initial: Option<String>,
}

/// What the editor produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A submitted buffer (may contain newlines).
    Line(String),
    /// Ctrl-C at the prompt.
    Interrupted,
    /// Ctrl-D at the prompt.
    Eof,
    /// The terminal failed.
    Failed(String),
}

/// Editor helper: completion, hints and highlighting for slash commands.
#[derive(Debug, Clone)]
struct InputHelper {
    commands: Vec<&'static str>,
}

impl InputHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.to_vec(),
        }
    }
}

impl Helper for InputHelper {}

impl Completer for InputHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(char::is_whitespace) {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: (*cmd).to_string(),
                replacement: (*cmd).to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for InputHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for InputHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for InputHelper {}

/// Adapts the editor's external printer so async output does not clobber
/// the prompt.
struct EditorPrinter<P>(P);

impl<P: ExternalPrinter + Send> Printer for EditorPrinter<P> {
    fn print(&mut self, text: String) {
        if let Err(e) = self.0.print(text) {
            tracing::warn!(name: "ui.print.failed", error = %e, "External printer failed");
        }
    }
}

fn build_editor() -> rustyline::Result<Editor<InputHelper, DefaultHistory>> {
    let mut editor = Editor::new()?;
    editor.set_helper(Some(InputHelper::new()));
    // Enter submits; a modified Enter inserts a literal line break.
    editor.bind_sequence(
        KeyEvent(KeyCode::Enter, Modifiers::ALT),
        EventHandler::Simple(Cmd::Newline),
    );
    Ok(editor)
}

/// Start the editor thread.
///
/// Returns the printer the shell must use for all output, plus the thread
/// handle. The thread exits when `requests` is closed or on Ctrl-D.
pub fn spawn(
    prompt: String,
    requests: std_mpsc::Receiver<PromptRequest>,
    events: mpsc::UnboundedSender<InputEvent>,
) -> anyhow::Result<(Box<dyn Printer>, JoinHandle<()>)> {
    let (ready_tx, ready_rx) = std_mpsc::channel::<rustyline::Result<Box<dyn Printer>>>();

    let handle = std::thread::Builder::new()
        .name("chat-input".to_string())
        .spawn(move || {
            let mut editor = match build_editor() {
                Ok(editor) => editor,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let printer: Box<dyn Printer> = match editor.create_external_printer() {
                Ok(p) => Box::new(EditorPrinter(p)),
                Err(e) => {
                    tracing::debug!(name: "ui.printer.fallback", error = %e, "Using stdout printer");
                    Box::new(super::shell::StdoutPrinter)
                }
            };
            if ready_tx.send(Ok(printer)).is_err() {
                return;
            }
            read_loop(&mut editor, &prompt, &requests, &events);
        })
        .context("failed to start input thread")?;

    let printer = ready_rx
        .recv()
        .context("input thread exited during startup")?
        .context("failed to initialize line editor")?;
    Ok((printer, handle))
}

fn read_loop(
    editor: &mut Editor<InputHelper, DefaultHistory>,
    prompt: &str,
    requests: &std_mpsc::Receiver<PromptRequest>,
    events: &mpsc::UnboundedSender<InputEvent>,
) {
    while let Ok(request) = requests.recv() {
        let read = match request.initial.as_deref() {
            Some(initial) => editor.readline_with_initial(prompt, (initial, "")),
            None => editor.readline(prompt),
        };
        let event = match read {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
            Err(ReadlineError::Eof) => InputEvent::Eof,
            Err(e) => InputEvent::Failed(e.to_string()),
        };
        let stop = matches!(event, InputEvent::Eof | InputEvent::Failed(_));
        if events.send(event).is_err() || stop {
            break;
        }
    }
}
