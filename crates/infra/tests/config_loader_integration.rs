//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and the
//! environment.

use std::io::Write;

use calpurge_domain::{CalPurgeError, PurgeConfig};
use calpurge_infra::config::{self, ConfigLoader};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tempfile::{NamedTempFile, TempDir};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const VARS: [&str; 8] = [
    "CALPURGE_CONFIG",
    "CALPURGE_MAX_CONCURRENT",
    "CALPURGE_DELETE_DELAY_MS",
    "CALPURGE_PAGE_DELAY_MS",
    "CALPURGE_MAX_EVENTS",
    "GOOGLE_CREDENTIALS",
    "CLIENT_ID",
    "TENANT_ID",
];

fn clean_env() {
    for key in VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_config_file_named_by_env_var() {
    let _guard = ENV_LOCK.lock();
    clean_env();

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "max_concurrent_deletes = 2\ndelete_delay_ms = 100\ntimezone = \"UTC\"").unwrap();
    std::env::set_var("CALPURGE_CONFIG", file.path());

    let config = ConfigLoader::new().load().unwrap();
    assert_eq!(config.max_concurrent_deletes, 2);
    assert_eq!(config.delete_delay_ms, 100);
    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.max_events, 9500);

    clean_env();
}

#[test]
fn test_found_json_file() {
    let _guard = ENV_LOCK.lock();
    clean_env();

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("calpurge.json"), r#"{"page_delay_ms": 0}"#).unwrap();

    let config = ConfigLoader::new().with_search_dir(dir.path()).load().unwrap();
    assert_eq!(config.page_delay_ms, 0);
    assert_eq!(config.delete_delay_ms, PurgeConfig::default().delete_delay_ms);
}

#[test]
fn test_toml_preferred_over_json() {
    let _guard = ENV_LOCK.lock();
    clean_env();

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("calpurge.toml"), "max_events = 10").unwrap();
    std::fs::write(dir.path().join("calpurge.json"), r#"{"max_events": 20}"#).unwrap();

    assert_eq!(config::find_config_path(dir.path()), Some(dir.path().join("calpurge.toml")));
    assert_eq!(ConfigLoader::new().with_search_dir(dir.path()).load().unwrap().max_events, 10);
}

#[test]
fn test_invalid_toml_is_a_config_error() {
    let _guard = ENV_LOCK.lock();
    clean_env();

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "max_events = \"many\"").unwrap();

    let err = ConfigLoader::new().with_file(file.path()).load().unwrap_err();
    assert!(matches!(err, CalPurgeError::Config(_)), "got {err:?}");
}

#[test]
fn test_zero_max_events_is_rejected() {
    let _guard = ENV_LOCK.lock();
    clean_env();
    std::env::set_var("CALPURGE_MAX_EVENTS", "0");

    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::new().with_search_dir(dir.path()).load().unwrap_err();
    assert!(matches!(err, CalPurgeError::Config(_)));

    clean_env();
}

#[test]
fn test_google_secrets_from_env_path_in_web_layout() {
    let _guard = ENV_LOCK.lock();
    clean_env();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"web": {{"client_id": "web-id", "client_secret": "web-secret",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token"}}}}"#
    )
    .unwrap();
    std::env::set_var("GOOGLE_CREDENTIALS", file.path());

    let secrets = config::load_google_secrets(None).unwrap();
    assert_eq!(secrets.client_id, "web-id");
    assert_eq!(secrets.client_secret, "web-secret");

    clean_env();
}

#[test]
fn test_microsoft_credentials_from_env_skip_prompt() {
    let _guard = ENV_LOCK.lock();
    clean_env();
    std::env::set_var("CLIENT_ID", "app");
    std::env::set_var("TENANT_ID", "organizations");

    let creds =
        config::load_microsoft_credentials(|label| panic!("unexpected prompt: {label}")).unwrap();
    assert_eq!(creds.client_id, "app");
    assert_eq!(creds.tenant_id, "organizations");

    clean_env();
}
