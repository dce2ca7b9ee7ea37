//! Configuration loader
//!
//! Loads the purge configuration and provider credentials.
//!
//! ## Loading Strategy
//! 1. Start from [`PurgeConfig::default`]
//! 2. Overlay a config file: an explicit path, then `CALPURGE_CONFIG`, then
//!    `calpurge.toml` / `calpurge.json` in the search directory
//! 3. Apply environment overrides
//! 4. Validate
//!
//! ## Environment Variables
//! - `CALPURGE_CONFIG`: Config file path
//! - `CALPURGE_MAX_CONCURRENT`: Delete requests in flight
//! - `CALPURGE_DELETE_DELAY_MS`: Pause after each delete attempt
//! - `CALPURGE_PAGE_DELAY_MS`: Pause between page fetches
//! - `CALPURGE_MAX_EVENTS`: Enumeration cap
//! - `CLIENT_ID`, `TENANT_ID`: Microsoft app registration
//! - `GOOGLE_CREDENTIALS`: Google client secrets file

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calpurge_domain::constants::GOOGLE_CREDENTIALS_FILE;
use calpurge_domain::{
    CalPurgeError, GoogleClientSecrets, MicrosoftCredentials, PurgeConfig, Result,
};
use serde::Deserialize;

use crate::errors::InfraError;

pub const CONFIG_PATH_VAR: &str = "CALPURGE_CONFIG";
pub const MAX_CONCURRENT_VAR: &str = "CALPURGE_MAX_CONCURRENT";
pub const DELETE_DELAY_VAR: &str = "CALPURGE_DELETE_DELAY_MS";
pub const PAGE_DELAY_VAR: &str = "CALPURGE_PAGE_DELAY_MS";
pub const MAX_EVENTS_VAR: &str = "CALPURGE_MAX_EVENTS";
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
pub const TENANT_ID_VAR: &str = "TENANT_ID";
pub const GOOGLE_CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS";

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Layered loader for [`PurgeConfig`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    search_dir: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader probing the current working directory
    pub fn new() -> Self {
        Self { file: None, search_dir: None }
    }

    /// Use this file instead of probing. It must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Search this directory instead of the working directory
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Load, overlay and validate the configuration
    ///
    /// # Errors
    /// Returns `CalPurgeError::Config` if:
    /// - An explicitly named file does not exist
    /// - The file format is invalid
    /// - An override is not a number
    /// - The result fails validation
    pub fn load(&self) -> Result<PurgeConfig> {
        let mut config = match self.config_file()? {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                PurgeConfig::default()
            }
        };

        apply_env_overrides(&mut config)?;
        config.validate()?;

        tracing::debug!(
            max_concurrent = config.max_concurrent_deletes,
            delete_delay_ms = config.delete_delay_ms,
            page_delay_ms = config.page_delay_ms,
            max_events = config.max_events,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn config_file(&self) -> Result<Option<PathBuf>> {
        let explicit = self.file.clone().or_else(|| env_opt(CONFIG_PATH_VAR).map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CalPurgeError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let dir = match &self.search_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|e| CalPurgeError::Config(format!("No working directory: {e}")))?,
        };
        Ok(find_config_path(&dir))
    }
}

/// Load configuration from a file
///
/// Missing keys keep their defaults.
fn load_from_file(path: &Path) -> Result<PurgeConfig> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CalPurgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<PurgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(CalPurgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search a directory for `calpurge.toml`, then `calpurge.json`
pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    [dir.join("calpurge.toml"), dir.join("calpurge.json")]
        .into_iter()
        .find(|path| path.exists())
}

fn apply_env_overrides(config: &mut PurgeConfig) -> Result<()> {
    if let Some(value) = env_parse(MAX_CONCURRENT_VAR)? {
        config.max_concurrent_deletes = value;
    }
    if let Some(value) = env_parse(DELETE_DELAY_VAR)? {
        config.delete_delay_ms = value;
    }
    if let Some(value) = env_parse(PAGE_DELAY_VAR)? {
        config.page_delay_ms = value;
    }
    if let Some(value) = env_parse(MAX_EVENTS_VAR)? {
        config.max_events = value;
    }
    Ok(())
}

/// Microsoft app registration from `CLIENT_ID` / `TENANT_ID`
///
/// `prompt` is asked for each missing value with a label such as
/// `"Enter client ID"`. Blank values are rejected.
///
/// # Errors
/// Returns `CalPurgeError::Config` when a value is blank or the prompt fails.
pub fn load_microsoft_credentials<P>(mut prompt: P) -> Result<MicrosoftCredentials>
where
    P: FnMut(&str) -> Result<String>,
{
    let mut value = |key: &str, label: &str| -> Result<String> {
        let raw = match env_opt(key) {
            Some(v) => v,
            None => prompt(label)?,
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CalPurgeError::Config(format!("{key} is required")));
        }
        Ok(trimmed.to_string())
    };

    let client_id = value(CLIENT_ID_VAR, "Enter client ID")?;
    let tenant_id = value(TENANT_ID_VAR, "Enter tenant ID")?;
    Ok(MicrosoftCredentials { client_id, tenant_id })
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecretsEntry>,
    web: Option<ClientSecretsEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsEntry {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_auth_uri")]
    auth_uri: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Google client secrets
///
/// Reads `path`, else `GOOGLE_CREDENTIALS`, else `credentials.json`. Both the
/// `installed` and the `web` layouts are accepted.
///
/// # Errors
/// Returns `CalPurgeError::Config` when the file is missing or malformed.
pub fn load_google_secrets(path: Option<PathBuf>) -> Result<GoogleClientSecrets> {
    let path = path
        .or_else(|| env_opt(GOOGLE_CREDENTIALS_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(GOOGLE_CREDENTIALS_FILE));

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        CalPurgeError::Config(format!("Cannot read Google client secrets {}: {e}", path.display()))
    })?;

    let file: ClientSecretsFile =
        serde_json::from_str(&contents).map_err(|e| CalPurgeError::from(InfraError::from(e)))?;

    let entry = file.installed.or(file.web).ok_or_else(|| {
        CalPurgeError::Config(format!(
            "{} has neither an \"installed\" nor a \"web\" section",
            path.display()
        ))
    })?;

    Ok(GoogleClientSecrets {
        client_id: entry.client_id,
        client_secret: entry.client_secret,
        auth_uri: entry.auth_uri,
        token_uri: entry.token_uri,
    })
}

/// Non-empty environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CalPurgeError::Config(format!("Invalid {key} value '{raw}': {e}")))
        })
        .transpose()
}
