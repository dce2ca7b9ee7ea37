//! Configuration structures
//!
//! Tuning knobs for the purge pipeline plus the provider credential shapes.
//! Loading (files, environment, prompts) lives in the infrastructure crate.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TIMEZONE, DELETE_DELAY_MS, GOOGLE_TOKEN_CACHE_FILE, MAX_CONCURRENT_DELETES,
    MAX_ENUMERATED_EVENTS, MICROSOFT_TOKEN_CACHE_FILE, PAGE_DELAY_MS,
};
use crate::errors::{CalPurgeError, Result};

/// Purge pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeConfig {
    /// Upper bound on delete requests in flight at once.
    pub max_concurrent_deletes: usize,
    /// Pause after each delete attempt, before its slot is released.
    pub delete_delay_ms: u64,
    /// Pause between consecutive page fetches.
    pub page_delay_ms: u64,
    /// Enumeration cap.
    pub max_events: usize,
    /// IANA timezone used when `--timezone` is not given.
    pub timezone: String,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deletes: MAX_CONCURRENT_DELETES,
            delete_delay_ms: DELETE_DELAY_MS,
            page_delay_ms: PAGE_DELAY_MS,
            max_events: MAX_ENUMERATED_EVENTS,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl PurgeConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_deletes == 0 {
            return Err(CalPurgeError::Config(
                "max_concurrent_deletes must be greater than 0".into(),
            ));
        }
        if self.max_events == 0 {
            return Err(CalPurgeError::Config("max_events must be greater than 0".into()));
        }
        if self.timezone.trim().is_empty() {
            return Err(CalPurgeError::Config("timezone must not be empty".into()));
        }
        Ok(())
    }

    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Calendar backend to purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Microsoft,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Microsoft => "microsoft",
            Self::Google => "google",
        }
    }

    /// File the provider's credential cache is kept in unless overridden.
    pub fn default_token_cache(&self) -> &'static str {
        match self {
            Self::Microsoft => MICROSOFT_TOKEN_CACHE_FILE,
            Self::Google => GOOGLE_TOKEN_CACHE_FILE,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CalPurgeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "microsoft" | "msgraph" | "outlook" => Ok(Self::Microsoft),
            "google" | "gcal" => Ok(Self::Google),
            other => Err(CalPurgeError::Config(format!("unknown provider: {other}"))),
        }
    }
}

/// Public-client registration used by the Microsoft device-code flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicrosoftCredentials {
    pub client_id: String,
    pub tenant_id: String,
}

/// Installed-app client secrets for Google OAuth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}
