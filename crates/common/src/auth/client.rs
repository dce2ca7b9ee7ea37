//! OAuth 2.0 client for the token endpoint
//!
//! Builds PKCE authorization URLs, exchanges authorization codes and refresh
//! tokens, and posts arbitrary grants (the device-code flow polls through
//! [`OAuthClient::request_token`]).

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use super::pkce::{validate_state, PKCEChallenge};
use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};

/// Error type for OAuth client operations
#[derive(Debug)]
pub enum OAuthClientError {
    /// HTTP request failed
    RequestFailed(reqwest::Error),

    /// OAuth server returned an error
    OAuthError(OAuthError),

    /// State parameter mismatch (CSRF attack detected)
    StateMismatch { expected: String, received: String },

    /// Failed to parse response
    ParseError(String),

    /// No refresh token available
    NoRefreshToken,

    /// Invalid configuration
    ConfigError(String),

    /// The user declined, or the interactive flow was abandoned
    Interaction(String),
}

impl OAuthClientError {
    /// RFC 6749 error code, when the server sent one
    #[must_use]
    pub fn oauth_code(&self) -> Option<&str> {
        match self {
            Self::OAuthError(e) => Some(e.error.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for OAuthClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::OAuthError(e) => write!(f, "OAuth error: {e}"),
            Self::StateMismatch { expected, received } => {
                write!(f, "State mismatch (CSRF): expected {expected}, received {received}")
            }
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::Interaction(msg) => write!(f, "Authorization not completed: {msg}"),
        }
    }
}

impl std::error::Error for OAuthClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestFailed(e) => Some(e),
            Self::OAuthError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OAuthClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// OAuth 2.0 client with PKCE support
///
/// Works against any RFC 6749 token endpoint; the endpoints come from
/// [`OAuthConfig`] so tests can point it at a mock server.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
    current_challenge: Arc<Mutex<Option<PKCEChallenge>>>,
}

impl OAuthClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_http_client(config, client)
    }

    /// Reuse an existing `reqwest::Client`
    #[must_use]
    pub fn with_http_client(config: OAuthConfig, client: Client) -> Self {
        Self { config, client, current_challenge: Arc::new(Mutex::new(None)) }
    }

    /// Build the browser authorization URL for a fresh PKCE challenge
    ///
    /// Returns `(url, state)`. The challenge is kept until
    /// [`exchange_code_for_tokens`](Self::exchange_code_for_tokens) consumes it.
    pub async fn generate_authorization_url(&self) -> Result<(String, String), OAuthClientError> {
        if self.config.redirect_uri.is_empty() {
            return Err(OAuthClientError::ConfigError("redirect_uri is not set".to_string()));
        }

        let challenge = PKCEChallenge::generate();
        let state = challenge.state.clone();

        let mut params = vec![
            ("response_type".to_string(), "code".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("scope".to_string(), self.config.scope_string()),
            ("state".to_string(), state.clone()),
            ("code_challenge".to_string(), challenge.code_challenge.clone()),
            ("code_challenge_method".to_string(), challenge.challenge_method().to_string()),
        ];
        params.extend(self.config.extra_authorize_params.iter().cloned());

        *self.current_challenge.lock().await = Some(challenge);

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.config.authorization_endpoint.contains('?') { '&' } else { '?' };
        Ok((format!("{}{separator}{query_string}", self.config.authorization_endpoint), state))
    }

    /// Exchange the authorization code from the redirect for tokens
    ///
    /// # Errors
    /// `StateMismatch` when the callback state differs from the one issued,
    /// `ConfigError` when no authorization URL was generated first, plus any
    /// token endpoint failure.
    pub async fn exchange_code_for_tokens(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let challenge =
            self.current_challenge.lock().await.take().ok_or_else(|| {
                OAuthClientError::ConfigError("No PKCE challenge found".to_string())
            })?;

        if !validate_state(&challenge.state, state) {
            return Err(OAuthClientError::StateMismatch {
                expected: challenge.state,
                received: state.to_string(),
            });
        }

        self.request_token(vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("redirect_uri".to_string(), self.config.redirect_uri.clone()),
            ("code_verifier".to_string(), challenge.code_verifier),
        ])
        .await
    }

    /// Obtain a new access token from a refresh token
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let tokens = self
            .request_token(vec![
                ("grant_type".to_string(), "refresh_token".to_string()),
                ("refresh_token".to_string(), refresh_token.to_string()),
                ("scope".to_string(), self.config.scope_string()),
            ])
            .await?;

        Ok(tokens.inherit_refresh_token(Some(refresh_token)))
    }

    /// POST a grant to the token endpoint
    ///
    /// `client_id` (and `client_secret` when configured) are appended. Error
    /// bodies are parsed as RFC 6749 errors so callers can branch on the
    /// code, e.g. `authorization_pending` while polling a device code.
    pub async fn request_token(
        &self,
        mut params: Vec<(String, String)>,
    ) -> Result<TokenSet, OAuthClientError> {
        params.push(("client_id".to_string(), self.config.client_id.clone()));
        if let Some(secret) = &self.config.client_secret {
            params.push(("client_secret".to_string(), secret.clone()));
        }

        let response = self.client.post(&self.config.token_endpoint).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = serde_json::from_str::<OAuthError>(&body)
                .unwrap_or_else(|_| OAuthError::from_status(status.as_u16(), &body));
            debug!(status = status.as_u16(), error = %error.error, "token endpoint returned an error");
            return Err(OAuthClientError::OAuthError(error));
        }

        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        Ok(token_response.into())
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Underlying HTTP client, for endpoints outside the token exchange
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }
}
