//! OAuth 2.0 types and structures
//!
//! Token sets, token endpoint responses, provider endpoint configuration and
//! the RFC 6749 error body.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth 2.0 access and refresh tokens with metadata
///
/// This is also the on-disk shape of the credential cache, so every field
/// added here must stay optional or defaulted to keep old caches readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token attached to API calls
    pub access_token: String,

    /// Refresh token for obtaining new access tokens without a prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" for the providers we talk to)
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Access token lifetime in seconds, as issued
    #[serde(default)]
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC), computed when the token was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenSet {
    /// Create a new `TokenSet`, deriving `expires_at` from `expires_in`
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold. Tokens without an expiry never expire.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::seconds(threshold_seconds);
                Utc::now() + threshold >= expires_at
            }
            None => false,
        }
    }

    /// Seconds until expiration, if an expiry is known
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Whether a refresh token is available
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Carry the previous refresh token forward when a refresh response omits
    /// one. Google only issues a refresh token on the first consent.
    #[must_use]
    pub fn inherit_refresh_token(mut self, previous: Option<&str>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.map(str::to_string);
        }
        self
    }
}

/// OAuth token response from an authorization server (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// Endpoints and client identity for one OAuth provider
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Full authorization endpoint URL
    pub authorization_endpoint: String,

    /// Full token endpoint URL
    pub token_endpoint: String,

    /// OAuth client ID
    pub client_id: String,

    /// Client secret, for installed-app clients that are issued one
    pub client_secret: Option<String>,

    /// Redirect URI (loopback for the installed-app flow)
    pub redirect_uri: String,

    /// Scopes to request
    pub scopes: Vec<String>,

    /// Extra query parameters appended to the authorization URL
    pub extra_authorize_params: Vec<(String, String)>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: String::new(),
            scopes,
            extra_authorize_params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    #[must_use]
    pub fn with_authorize_param(mut self, key: &str, value: &str) -> Self {
        self.extra_authorize_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Scopes as a space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// OAuth error response from an authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl OAuthError {
    /// Build an error for a response body that was not an RFC 6749 error
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            error: format!("http_{status}"),
            error_description: if body.is_empty() { None } else { Some(body.to_string()) },
        }
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
