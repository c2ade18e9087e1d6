//! TraveOps chat client
//!
//! Entry point for the terminal chat.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use traveops_chat::api::ChatClient;
use traveops_chat::config::AppConfig;
use traveops_chat::liveness;
use traveops_chat::session::Controller;
use traveops_chat::{telemetry, ui};

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = telemetry::init(&config.logging) {
        eprintln!("Failed to open log file {}: {e}", config.logging.file);
        std::process::exit(2);
    }

    if let Err(e) = run(config).await {
        tracing::error!(name: "app.failed", error = ?e, "Chat client failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    if !config.ui.color {
        colored::control::set_override(false);
    }

    let client = match config.request_timeout() {
        Some(timeout) => ChatClient::with_timeout(&config.backend.base_url, timeout),
        None => ChatClient::new(&config.backend.base_url),
    }
    .context("invalid backend URL")?;
    let client = Arc::new(client);

    info!(
        name: "app.config.loaded",
        base_url = %client.base_url(),
        poll_interval_secs = config.liveness.interval_secs,
        "Configuration loaded"
    );

    let (status_rx, _poller) = liveness::spawn_poller(Arc::clone(&client), config.poller_settings());
    let controller = Controller::new(client);

    ui::chat::run(controller, config.ui, status_rx).await
}
