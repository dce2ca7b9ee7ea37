//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for calpurge
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalPurgeError {
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Error fetching calendar events: {status} {body}")]
    Enumeration { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a fatal error, used for exit codes and log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Enumeration,
    Internal,
}

impl CalPurgeError {
    /// Category of this error.
    ///
    /// Transport failures and missing resources only reach the caller while
    /// listing events, so they are grouped with enumeration failures.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTimezone(_)
            | Self::InvalidDateFormat(_)
            | Self::Config(_)
            | Self::InvalidInput(_) => ErrorCategory::Configuration,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Enumeration { .. } | Self::Network(_) | Self::NotFound(_) => {
                ErrorCategory::Enumeration
            }
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidTimezone(_) => "invalid_timezone",
            Self::InvalidDateFormat(_) => "invalid_date_format",
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Enumeration { .. } => "enumeration",
            Self::Network(_) => "network",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for calpurge operations
pub type Result<T> = std::result::Result<T, CalPurgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_error_display_carries_status_and_body() {
        let err = CalPurgeError::Enumeration { status: 403, body: "forbidden".into() };
        assert_eq!(err.to_string(), "Error fetching calendar events: 403 forbidden");
        assert_eq!(err.category(), ErrorCategory::Enumeration);
    }

    #[test]
    fn configuration_variants_share_a_category() {
        for err in [
            CalPurgeError::InvalidTimezone("Mars/Olympus".into()),
            CalPurgeError::InvalidDateFormat("2023-13-40 99:99".into()),
            CalPurgeError::Config("CLIENT_ID missing".into()),
            CalPurgeError::InvalidInput("start after end".into()),
        ] {
            assert_eq!(err.category(), ErrorCategory::Configuration, "{err}");
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = CalPurgeError::Auth("device code expired".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Auth");
        assert_eq!(json["message"], "device code expired");
    }
}
