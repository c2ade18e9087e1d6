//! Chat-specific terminal components.
//!
//! The layout mirrors a chat widget: a header with the agent status, the
//! message list, the input area, and the shell tying them together.

mod header;
mod input_area;
mod message_list;
mod shell;

pub use header::{render_header, render_status_change, status_indicator};
pub use input_area::{COMMANDS, Command, InputEvent, PromptRequest, help_text};
pub use message_list::{render_change, render_empty_state, render_entry};
pub use shell::{Flow, PROMPT, Printer, Shell, StdoutPrinter, run};
