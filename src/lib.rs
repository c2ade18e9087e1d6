//! TraveOps chat client
//!
//! A terminal chat client for the TraveOps agent API. It keeps one
//! conversation thread, sends user messages to the backend, and renders the
//! agent's reply or a human-in-the-loop confirmation card.
//!
//! # Architecture
//!
//! - **Session**: pure state machine plus a controller with an injectable transport
//! - **API**: `reqwest` client for `/chat` and `/health`
//! - **Liveness**: background poller feeding a status indicator
//! - **UI**: line editor and colored terminal rendering
//!
//! # Modules
//!
//! - [`api`]: wire types and HTTP client
//! - [`session`]: conversation state, transitions and controller
//! - [`liveness`]: backend health polling
//! - [`ui`]: terminal shell
//! - [`config`]: layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod api;
pub mod config;
pub mod error;
pub mod liveness;
pub mod session;
pub mod telemetry;
pub mod ui;

pub use error::{ExchangeError, Result};
