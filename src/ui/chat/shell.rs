//! Chat shell: the terminal event loop.
//!
//! One task owns the [`Controller`] and reacts to three sources:
//! - lines from the editor thread,
//! - finished exchanges,
//! - liveness status changes.
//!
//! Exchanges run on spawned tasks and report back through a channel, so the
//! session is only ever mutated from this loop.

use std::io::Write as _;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::{mpsc, watch};

use super::header::{render_header, render_status_change};
use super::input_area::{self, Command, InputEvent, PromptRequest, help_text};
use super::message_list::{render_change, render_empty_state};
use crate::api::Transport;
use crate::config::UiConfig;
use crate::liveness::Status;
use crate::session::{Controller, Event, Rejected, ViewChange};

/// Prompt shown by the editor.
pub const PROMPT: &str = "› ";

/// Upper bound on a `/history` fetch; the loop is blocked meanwhile.
pub const HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Sink for terminal output.
pub trait Printer: Send {
    /// Print `text` followed by a newline.
    fn print(&mut self, text: String);
}

/// Plain stdout, used when the editor cannot provide an external printer.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&mut self, text: String) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl Printer for Box<dyn Printer> {
    fn print(&mut self, text: String) {
        (**self).print(text);
    }
}

/// What the loop should do after handling an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Show a prompt, optionally prefilled.
    Prompt(Option<String>),
    /// Keep waiting; no prompt.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Session controller plus terminal rendering.
pub struct Shell<T: ?Sized, P> {
    controller: Controller<T>,
    printer: P,
    ui: UiConfig,
    status: Status,
    completions: mpsc::UnboundedSender<Event>,
}

impl<T: Transport + ?Sized, P> std::fmt::Debug for Shell<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("session", self.controller.session())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<T, P> Shell<T, P>
where
    T: Transport + ?Sized + 'static,
    P: Printer,
{
    /// Create a shell. The receiver yields finished exchanges and must be
    /// fed back through [`Shell::handle_completion`].
    pub fn new(
        controller: Controller<T>,
        printer: P,
        ui: UiConfig,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (completions, rx) = mpsc::unbounded_channel();
        let shell = Self {
            controller,
            printer,
            ui,
            status: Status::Unknown,
            completions,
        };
        (shell, rx)
    }

    /// The controller, for inspection.
    pub fn controller(&self) -> &Controller<T> {
        &self.controller
    }

    /// Header plus empty-state welcome.
    pub fn print_banner(&mut self, status: Status) {
        self.status = status;
        let header = render_header(&self.ui.title, status);
        let welcome = render_empty_state(&self.ui.title, &self.ui.suggestions);
        self.printer.print(header);
        self.printer.print(welcome);
        self.printer
            .print("Enter sends, Alt+Enter adds a line, /help lists commands.".bright_black().to_string());
    }

    /// React to one editor event.
    pub async fn handle_input(&mut self, input: InputEvent) -> Flow {
        match input {
            InputEvent::Line(line) => self.handle_command(Command::parse(&line)).await,
            InputEvent::Interrupted => {
                self.notice("Press Ctrl-D or type /quit to exit.");
                Flow::Prompt(None)
            }
            InputEvent::Eof => Flow::Quit,
            InputEvent::Failed(e) => {
                tracing::error!(name: "ui.input.failed", error = %e, "Line editor failed");
                Flow::Quit
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Send(text) => self.submit(Event::Submit { text }),
            Command::Confirm => self.submit(Event::Resolve { confirmed: true }),
            Command::Cancel => self.submit(Event::Resolve { confirmed: false }),
            Command::Reset => {
                let changes = self.controller.reset_session();
                self.render(&changes);
                Flow::Prompt(None)
            }
            Command::History => {
                self.print_history().await;
                Flow::Prompt(None)
            }
            Command::Status => {
                let header = render_header(&self.ui.title, self.status);
                self.printer.print(header);
                Flow::Prompt(None)
            }
            Command::Suggest(n) => match self.ui.suggestions.get(n - 1) {
                Some(suggestion) => Flow::Prompt(Some(suggestion.clone())),
                None => {
                    self.notice(&format!("No suggestion #{n}."));
                    Flow::Prompt(None)
                }
            },
            Command::Help => {
                self.printer.print(help_text());
                Flow::Prompt(None)
            }
            Command::Quit => Flow::Quit,
            Command::Unknown(cmd) => {
                self.notice(&format!("Unknown command {cmd}. Type /help for a list."));
                Flow::Prompt(None)
            }
        }
    }

    fn submit(&mut self, event: Event) -> Flow {
        match self.controller.dispatch(event) {
            Ok(dispatch) => {
                self.render(&dispatch.changes);
                match dispatch.exchange {
                    Some(exchange) => {
                        let transport = self.controller.transport();
                        let completions = self.completions.clone();
                        tokio::spawn(async move {
                            let event = exchange.execute(transport.as_ref()).await;
                            let _ = completions.send(event);
                        });
                        Flow::Continue
                    }
                    None => Flow::Prompt(None),
                }
            }
            Err(Rejected::Empty) => Flow::Prompt(None),
            Err(Rejected::Busy) => {
                self.notice("Still waiting for the agent.");
                Flow::Continue
            }
            Err(Rejected::NoThread) => {
                self.notice("There is nothing to confirm yet.");
                Flow::Prompt(None)
            }
            Err(Rejected::Unexpected) => Flow::Prompt(None),
        }
    }

    /// Apply a finished exchange and re-enable input.
    pub fn handle_completion(&mut self, event: Event) -> Flow {
        let changes = self.controller.complete(event);
        self.render(&changes);
        if self.controller.session().is_awaiting() {
            Flow::Continue
        } else {
            Flow::Prompt(None)
        }
    }

    /// Show a liveness change.
    pub fn handle_status(&mut self, status: Status) {
        if status != self.status {
            self.status = status;
            self.printer.print(render_status_change(status));
        }
    }

    async fn print_history(&mut self) {
        let Some(thread_id) = self.controller.session().thread_id.clone() else {
            self.notice("No conversation yet.");
            return;
        };
        let transport = self.controller.transport();
        let Ok(fetched) = tokio::time::timeout(HISTORY_TIMEOUT, transport.history(&thread_id)).await else {
            tracing::warn!(name: "ui.history.timeout", thread_id = %thread_id, "History fetch timed out");
            self.printer.print(format!("{} {}", "error:".red().bold(), "History request timed out.".red()));
            return;
        };
        match fetched {
            Ok(history) => {
                let mut lines = vec![format!("History of thread {}", history.thread_id).bright_black().to_string()];
                for message in &history.messages {
                    lines.push(format!("  {}: {}", format!("{:>9}", message.role).bold(), message.content));
                }
                if history.messages.is_empty() {
                    lines.push("  (empty)".bright_black().to_string());
                }
                self.printer.print(lines.join("\n"));
            }
            Err(e) => {
                tracing::warn!(name: "ui.history.failed", thread_id = %thread_id, error = %e, "History fetch failed");
                self.printer.print(format!("{} {}", "error:".red().bold(), e.user_message().red()));
            }
        }
    }

    fn render(&mut self, changes: &[ViewChange]) {
        for change in changes {
            if let Some(text) = render_change(change, &self.ui.title, &self.ui.suggestions) {
                self.printer.print(text);
            }
        }
    }

    fn notice(&mut self, text: &str) {
        self.printer.print(text.bright_black().to_string());
    }
}

/// Run the interactive chat until the user quits.
pub async fn run<T>(
    controller: Controller<T>,
    ui: UiConfig,
    mut status_rx: watch::Receiver<Status>,
) -> anyhow::Result<()>
where
    T: Transport + ?Sized + 'static,
{
    let (prompt_tx, prompt_rx) = std_mpsc::channel::<PromptRequest>();
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<InputEvent>();
    let (printer, _input_thread) = input_area::spawn(PROMPT.to_string(), prompt_rx, input_tx)?;

    let (mut shell, mut completions) = Shell::new(controller, printer, ui);
    let initial = *status_rx.borrow_and_update();
    shell.print_banner(initial);
    prompt_tx.send(PromptRequest::default())?;

    loop {
        let flow = tokio::select! {
            Some(input) = input_rx.recv() => shell.handle_input(input).await,
            Some(event) = completions.recv() => shell.handle_completion(event),
            Ok(()) = status_rx.changed() => {
                let status = *status_rx.borrow_and_update();
                shell.handle_status(status);
                Flow::Continue
            }
            else => Flow::Quit,
        };

        match flow {
            Flow::Prompt(initial) => {
                if prompt_tx.send(PromptRequest { initial }).is_err() {
                    break;
                }
            }
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }

    tracing::info!(name: "ui.shell.exit", "Chat shell exiting");
    shell.printer.print("Goodbye!".bright_green().to_string());
    Ok(())
}
