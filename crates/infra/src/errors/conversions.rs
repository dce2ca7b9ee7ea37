//! Conversions from external infrastructure errors into domain errors.

use std::io::ErrorKind;

use calpurge_domain::CalPurgeError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalPurgeError);

impl From<InfraError> for CalPurgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalPurgeError> for InfraError {
    fn from(value: CalPurgeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalPurgeError {
    fn into_calpurge(self) -> CalPurgeError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalPurgeError */
/* -------------------------------------------------------------------------- */

impl IntoCalPurgeError for HttpError {
    fn into_calpurge(self) -> CalPurgeError {
        if self.is_timeout() {
            return CalPurgeError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalPurgeError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CalPurgeError::Auth(message),
                404 => CalPurgeError::NotFound(message),
                400..=499 => CalPurgeError::InvalidInput(message),
                _ => CalPurgeError::Network(message),
            };
        }

        if self.is_decode() {
            return CalPurgeError::Internal(format!("malformed response body: {self}"));
        }

        CalPurgeError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_calpurge())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → CalPurgeError */
/* -------------------------------------------------------------------------- */

impl IntoCalPurgeError for std::io::Error {
    fn into_calpurge(self) -> CalPurgeError {
        match self.kind() {
            ErrorKind::NotFound => CalPurgeError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                CalPurgeError::Config(format!("permission denied: {self}"))
            }
            _ => CalPurgeError::Internal(format!("I/O error: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_calpurge())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → CalPurgeError */
/* -------------------------------------------------------------------------- */

impl IntoCalPurgeError for serde_json::Error {
    fn into_calpurge(self) -> CalPurgeError {
        CalPurgeError::Config(format!("invalid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_calpurge())
    }
}

impl IntoCalPurgeError for toml::de::Error {
    fn into_calpurge(self) -> CalPurgeError {
        CalPurgeError::Config(format!("invalid TOML: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_calpurge())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
