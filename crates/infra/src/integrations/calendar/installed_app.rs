//! Google installed-app sign-in: browser consent with a loopback redirect

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calpurge_common::auth::{OAuthClient, OAuthClientError, OAuthConfig, OAuthFlow, TokenSet};
use calpurge_domain::GoogleClientSecrets;
use tracing::{info, warn};

use super::oauth::OAuthCallbackServer;

pub const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

type OnAuthorize = Arc<dyn Fn(&str) + Send + Sync>;

/// Installed-app OAuth flow for Google Calendar
///
/// Each interactive sign-in binds a fresh loopback server, hands the
/// authorization URL to `on_authorize` (which opens or prints it), and
/// exchanges the returned code with PKCE and the client secret.
pub struct GoogleInstalledAppFlow {
    secrets: GoogleClientSecrets,
    http: reqwest::Client,
    on_authorize: OnAuthorize,
    callback_timeout: Duration,
}

impl GoogleInstalledAppFlow {
    pub fn new<A>(secrets: GoogleClientSecrets, http: reqwest::Client, on_authorize: A) -> Self
    where
        A: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            secrets,
            http,
            on_authorize: Arc::new(on_authorize),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }

    /// How long to wait for the browser redirect
    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    fn oauth_client(&self, redirect_uri: Option<String>) -> OAuthClient {
        let mut config = OAuthConfig::new(
            &self.secrets.auth_uri,
            &self.secrets.token_uri,
            &self.secrets.client_id,
            vec![GOOGLE_CALENDAR_SCOPE.to_string()],
        )
        .with_client_secret(&self.secrets.client_secret)
        .with_authorize_param("access_type", "offline");

        if let Some(uri) = redirect_uri {
            config = config.with_redirect_uri(uri);
        }

        OAuthClient::with_http_client(config, self.http.clone())
    }
}

#[async_trait]
impl OAuthFlow for GoogleInstalledAppFlow {
    async fn acquire(&self) -> Result<TokenSet, OAuthClientError> {
        let server = OAuthCallbackServer::start()
            .await
            .map_err(|e| OAuthClientError::Interaction(e.to_string()))?;

        let client = self.oauth_client(Some(server.redirect_uri()));
        let (url, state) = client.generate_authorization_url().await?;
        server.set_expected_state(state.clone());

        (self.on_authorize)(&url);

        let code = server
            .wait_for_code(self.callback_timeout)
            .await
            .map_err(|e| OAuthClientError::Interaction(e.to_string()))?;

        let tokens = client.exchange_code_for_tokens(&code, &state).await?;

        if let Err(e) = server.shutdown().await {
            warn!(error = %e, "OAuth callback server did not shut down cleanly");
        }

        info!("Browser sign-in completed");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        self.oauth_client(None).refresh_access_token(refresh_token).await
    }
}
