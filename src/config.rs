use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::liveness::PollerSettings;

/// Env prefix for layered settings, e.g. `TRAVEOPS_BACKEND__BASE_URL`.
pub const ENV_PREFIX: &str = "TRAVEOPS";

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_NAME: &str = "traveops-chat";

const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "Plan a trip from Kathmandu to Pokhara next week under NPR 30,000",
    "Remind me to check in for my flight tomorrow at 7am",
    "Send a WhatsApp to +9779800000000 saying I'm running late",
    "Write a short caption for my Everest base camp photo",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Agent API base URL
    #[arg(long, env = "AGENT_URL")]
    pub base_url: Option<String>,

    /// Seconds between liveness probes
    #[arg(long, env = "POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Write logs to stderr instead of the log file
    #[arg(long, env = "LOG_STDERR")]
    pub log_stderr: Option<bool>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR_OUTPUT")]
    pub no_color: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub liveness: LivenessConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Unset means exchanges wait as long as the transport does.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LivenessConfig {
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub title: String,
    pub suggestions: Vec<String>,
    pub color: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub file: String,
    pub stderr: bool,
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("backend.base_url", "http://localhost:8000")?
            .set_default("liveness.interval_secs", 15)?
            .set_default("liveness.timeout_secs", 5)?
            .set_default("ui.title", "TraveOps Assistant")?
            .set_default("ui.suggestions", DEFAULT_SUGGESTIONS.to_vec())?
            .set_default("ui.color", true)?
            .set_default("logging.file", "traveops-chat.log")?
            .set_default("logging.stderr", false)?
            .set_default("logging.filter", "info")?;

        // Explicit file must exist; the cwd fallback is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        // E.g. TRAVEOPS_BACKEND__BASE_URL=http://10.0.0.5:8000
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(";")
                .with_list_parse_key("ui.suggestions"),
        );

        // CLI flags (and their env twins) win over everything.
        if let Some(url) = cli.base_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(secs) = cli.poll_interval_secs {
            builder = builder.set_override("liveness.interval_secs", secs)?;
        }
        if let Some(stderr) = cli.log_stderr {
            builder = builder.set_override("logging.stderr", stderr)?;
        }
        if let Some(no_color) = cli.no_color {
            builder = builder.set_override("ui.color", !no_color)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "backend.base_url cannot be empty".to_string(),
            ));
        }
        if self.liveness.interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "liveness.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeout applied to chat exchanges, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.backend.request_timeout_secs.map(Duration::from_secs)
    }

    /// Settings for the liveness poller.
    #[must_use]
    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            interval: Duration::from_secs(self.liveness.interval_secs),
            timeout: Duration::from_secs(self.liveness.timeout_secs.max(1)),
        }
    }
}
