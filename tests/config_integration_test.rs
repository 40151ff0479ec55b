//! Integration tests for configuration loading and validation
//!
//! Tests that touch process environment variables hold `ENV_MUTEX`.

use mongodbatlas::config::{load_config, ProviderConfig, DEFAULT_BASE_URL};
use mongodbatlas::core::poll::PollSettings;
use mongodbatlas::domain::ProviderError;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ATLAS_VARS: [&str; 5] = [
    "MONGODB_ATLAS_PUBLIC_KEY",
    "MONGODB_ATLAS_PRIVATE_KEY",
    "MONGODB_ATLAS_ACCESS_TOKEN",
    "MONGODB_ATLAS_BASE_URL",
    "MONGODB_ATLAS_LOG_LEVEL",
];

fn cleanup_env_vars() {
    for var in ATLAS_VARS {
        std::env::remove_var(var);
    }
    std::env::remove_var("TEST_ATLAS_PRIVATE_KEY");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[atlas]
base_url = "https://cloud-qa.mongodb.com/"
public_key = "abcdefgh"
private_key = "11111111-2222-3333-4444-555555555555"
timeout_seconds = 120

[atlas.retry]
max_retries = 5
initial_delay_ms = 200
max_delay_ms = 5000
backoff_multiplier = 1.5

[polling]
interval_scale = 0.25
max_interval_seconds = 15

[logging]
local_enabled = true
local_path = "/var/log/mongodbatlas"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.atlas.base_url, "https://cloud-qa.mongodb.com/");
    assert_eq!(config.atlas.public_key.as_deref(), Some("abcdefgh"));
    assert_eq!(config.atlas.timeout_seconds, 120);
    assert_eq!(config.atlas.retry.max_retries, 5);
    assert_eq!(config.logging.local_rotation, "hourly");

    let polling = PollSettings::from_config(&config);
    assert_eq!(polling.scale(Duration::from_secs(60)), Duration::from_secs(15));
    assert_eq!(polling.scale(Duration::from_secs(20)), Duration::from_secs(5));
    assert_eq!(polling.backoff.initial, Duration::from_millis(200));
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[atlas]
access_token = "service-account-token"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.atlas.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.polling.interval_scale, 1.0);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_substitution_in_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_ATLAS_PRIVATE_KEY", "substituted-private-key");

    let file = write_config(
        r#"
[atlas]
public_key = "abcdefgh"
private_key = "${TEST_ATLAS_PRIVATE_KEY}"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.atlas.private_key.as_ref().unwrap().expose_secret().to_string(),
        "substituted-private-key"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[atlas]
public_key = "abcdefgh"
private_key = "${TEST_ATLAS_PRIVATE_KEY}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));
    assert!(err.to_string().contains("TEST_ATLAS_PRIVATE_KEY"));
}

#[test]
fn test_env_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("MONGODB_ATLAS_BASE_URL", "http://localhost:9000/");
    std::env::set_var("MONGODB_ATLAS_LOG_LEVEL", "WARN");

    let file = write_config(
        r#"
[application]
log_level = "debug"

[atlas]
base_url = "https://cloud.mongodb.com/"
public_key = "abcdefgh"
private_key = "11111111-2222-3333-4444-555555555555"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.atlas.base_url, "http://localhost:9000/");
    assert_eq!(config.application.log_level, "warn");

    cleanup_env_vars();
}

#[test]
fn test_from_env_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    assert!(ProviderConfig::from_env().is_err());

    std::env::set_var("MONGODB_ATLAS_PUBLIC_KEY", "abcdefgh");
    std::env::set_var("MONGODB_ATLAS_PRIVATE_KEY", "11111111-2222-3333-4444-555555555555");

    let config = ProviderConfig::from_env().unwrap();
    assert_eq!(config.atlas.public_key.as_deref(), Some("abcdefgh"));
    assert_eq!(config.atlas.base_url, DEFAULT_BASE_URL);

    cleanup_env_vars();
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        "[atlas]\naccess_token = \"t\"\n[logging]\nlocal_rotation = \"size\"\n",
        "[atlas]\naccess_token = \"t\"\n[atlas.retry]\nmax_retries = 50\n",
        "[atlas]\naccess_token = \"t\"\n[application]\nlog_level = \"verbose\"\n",
        "[atlas]\npublic_key = \"abcdefgh\"\n",
        "[atlas]\naccess_token = \"t\"\nbase_url = \"cloud.mongodb.com\"\n",
    ];

    for contents in cases {
        let file = write_config(contents);
        assert!(
            load_config(file.path()).is_err(),
            "expected rejection of:\n{contents}"
        );
    }
}
