use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use traveops_chat::config::AppConfig;

const BIN: &str = "traveops-chat";

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("CONFIG_FILE");
        env::remove_var("AGENT_URL");
        env::remove_var("POLL_INTERVAL_SECS");
        env::remove_var("LOG_STDERR");
        env::remove_var("NO_COLOR_OUTPUT");
        env::remove_var("TRAVEOPS_BACKEND__BASE_URL");
        env::remove_var("TRAVEOPS_LIVENESS__INTERVAL_SECS");
        env::remove_var("TRAVEOPS_UI__SUGGESTIONS");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args([BIN]).expect("defaults should load");
    assert_eq!(config.backend.base_url, "http://localhost:8000");
    assert_eq!(config.backend.request_timeout_secs, None);
    assert_eq!(config.liveness.interval_secs, 15);
    assert_eq!(config.poller_settings().interval, Duration::from_secs(15));
    assert_eq!(config.ui.suggestions.len(), 4);
    assert!(config.ui.color);
    assert!(!config.logging.stderr);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("TRAVEOPS_BACKEND__BASE_URL", "http://10.0.0.5:9000");
        env::set_var("TRAVEOPS_LIVENESS__INTERVAL_SECS", "30");
        env::set_var("TRAVEOPS_UI__SUGGESTIONS", "Book a flight;Set a reminder");
    }

    let config = AppConfig::load_from_args([BIN]).expect("Failed to load config");
    assert_eq!(config.backend.base_url, "http://10.0.0.5:9000");
    assert_eq!(config.liveness.interval_secs, 30);
    assert_eq!(config.ui.suggestions, vec!["Book a flight", "Set a reminder"]);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("TRAVEOPS_BACKEND__BASE_URL", "http://from-env:8000");
    }

    let config = AppConfig::load_from_args([
        BIN,
        "--base-url",
        "http://from-cli:8000",
        "--poll-interval-secs",
        "3",
        "--no-color",
        "true",
    ])
    .expect("Failed to load config");
    assert_eq!(config.backend.base_url, "http://from-cli:8000");
    assert_eq!(config.liveness.interval_secs, 3);
    assert!(!config.ui.color);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chat.yaml");
    fs::write(
        &path,
        r#"
backend:
  base_url: "http://agent.internal:8080"
  request_timeout_secs: 120
ui:
  title: "Trip Desk"
    "#,
    )
    .expect("Failed to write temp config");

    let config = AppConfig::load_from_args([BIN, "--config", path.to_str().unwrap()])
        .expect("Failed to load config from file");
    assert_eq!(config.backend.base_url, "http://agent.internal:8080");
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
    assert_eq!(config.ui.title, "Trip Desk");
    // Untouched sections keep their defaults.
    assert_eq!(config.liveness.timeout_secs, 5);
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();
    let result = AppConfig::load_from_args([BIN, "--config", "/nonexistent/traveops.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_zero_interval_rejected() {
    clear_env_vars();
    let result = AppConfig::load_from_args([BIN, "--poll-interval-secs", "0"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let cwd_path = "traveops-chat.yaml";
    fs::write(
        cwd_path,
        r#"
backend:
  base_url: "http://cwd-agent:8000"
    "#,
    )
    .expect("Failed to write ./traveops-chat.yaml");

    let result = AppConfig::load_from_args([BIN]);

    fs::remove_file(cwd_path).unwrap();

    let config = result.expect("Failed to load config");
    assert_eq!(config.backend.base_url, "http://cwd-agent:8000");
}
