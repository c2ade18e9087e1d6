//! Terminal user interface.
//!
//! # Structure
//!
//! - [`chat`]: header, message list, input area and the event loop
//! - [`markdown`]: markdown-lite styling for assistant replies

pub mod chat;
pub mod markdown;
