//! Microsoft identity platform device-code flow (RFC 8628)
//!
//! The user is shown a short code and a URL, signs in on any device, and
//! this side polls the token endpoint until the grant completes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calpurge_common::auth::{
    OAuthClient, OAuthClientError, OAuthConfig, OAuthError, OAuthFlow, TokenSet,
};
use calpurge_domain::MicrosoftCredentials;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

pub const MICROSOFT_LOGIN_BASE: &str = "https://login.microsoftonline.com";
pub const MICROSOFT_SCOPES: [&str; 2] = ["Calendars.ReadWrite", "offline_access"];

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);
const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Device authorization response
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    #[serde(alias = "verification_url")]
    pub verification_uri: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DeviceCode {
    /// Instruction to show the user, as worded by the server when it sent one
    pub fn instructions(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
                self.verification_uri, self.user_code
            )
        })
    }
}

type Prompt = Arc<dyn Fn(&DeviceCode) + Send + Sync>;

/// Device-code sign-in for Microsoft Graph
pub struct MicrosoftDeviceCodeFlow {
    client: OAuthClient,
    device_code_endpoint: String,
    prompt: Prompt,
    slow_down_step: Duration,
}

impl MicrosoftDeviceCodeFlow {
    /// Flow against `https://login.microsoftonline.com/{tenant}`
    ///
    /// `prompt` receives the device code once per interactive sign-in.
    pub fn new<P>(credentials: &MicrosoftCredentials, http: reqwest::Client, prompt: P) -> Self
    where
        P: Fn(&DeviceCode) + Send + Sync + 'static,
    {
        Self::with_authority(
            &format!("{MICROSOFT_LOGIN_BASE}/{}", credentials.tenant_id),
            &credentials.client_id,
            http,
            prompt,
        )
    }

    /// Flow against an arbitrary authority, e.g. a mock server
    pub fn with_authority<P>(
        authority: &str,
        client_id: &str,
        http: reqwest::Client,
        prompt: P,
    ) -> Self
    where
        P: Fn(&DeviceCode) + Send + Sync + 'static,
    {
        let authority = authority.trim_end_matches('/');
        let config = OAuthConfig::new(
            format!("{authority}/oauth2/v2.0/authorize"),
            format!("{authority}/oauth2/v2.0/token"),
            client_id,
            MICROSOFT_SCOPES.iter().map(ToString::to_string).collect(),
        );

        Self {
            client: OAuthClient::with_http_client(config, http),
            device_code_endpoint: format!("{authority}/oauth2/v2.0/devicecode"),
            prompt: Arc::new(prompt),
            slow_down_step: SLOW_DOWN_STEP,
        }
    }

    /// How much `slow_down` lengthens the polling interval
    pub fn with_slow_down_step(mut self, step: Duration) -> Self {
        self.slow_down_step = step;
        self
    }

    /// Request a device code
    ///
    /// # Errors
    /// Any non-success answer, parsed as an RFC 6749 error when possible
    pub async fn request_device_code(&self) -> Result<DeviceCode, OAuthClientError> {
        let scope = self.client.config().scope_string();
        let params =
            [("client_id", self.client.config().client_id.as_str()), ("scope", scope.as_str())];

        let response =
            self.client.http().post(&self.device_code_endpoint).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = serde_json::from_str::<OAuthError>(&body)
                .unwrap_or_else(|_| OAuthError::from_status(status.as_u16(), &body));
            return Err(OAuthClientError::OAuthError(error));
        }

        serde_json::from_str(&body).map_err(|e| {
            OAuthClientError::ParseError(format!("Failed to obtain device code: {e}"))
        })
    }

    /// Poll the token endpoint until the user finishes, declines or the code
    /// expires
    pub async fn poll_for_tokens(&self, code: &DeviceCode) -> Result<TokenSet, OAuthClientError> {
        let deadline = Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval.unwrap_or(DEFAULT_INTERVAL_SECS));

        loop {
            if Instant::now() >= deadline {
                return Err(OAuthClientError::Interaction("device code expired".into()));
            }

            sleep(interval).await;

            let error = match self
                .client
                .request_token(vec![
                    ("grant_type".to_string(), DEVICE_CODE_GRANT.to_string()),
                    ("device_code".to_string(), code.device_code.clone()),
                ])
                .await
            {
                Ok(tokens) => return Ok(tokens),
                Err(error) => error,
            };

            match error.oauth_code() {
                Some("authorization_pending") => {
                    debug!("Waiting for the user to finish signing in");
                }
                Some("slow_down") => {
                    interval += self.slow_down_step;
                    debug!(interval = ?interval, "Slowing down device-code polling");
                }
                Some("authorization_declined" | "access_denied") => {
                    return Err(OAuthClientError::Interaction("sign-in was declined".into()));
                }
                Some("expired_token" | "expired") => {
                    return Err(OAuthClientError::Interaction("device code expired".into()));
                }
                Some("bad_verification_code") => {
                    return Err(OAuthClientError::Interaction(
                        "device code was not recognized".into(),
                    ));
                }
                _ => return Err(error),
            }
        }
    }
}

#[async_trait]
impl OAuthFlow for MicrosoftDeviceCodeFlow {
    async fn acquire(&self) -> Result<TokenSet, OAuthClientError> {
        let code = self.request_device_code().await?;
        (self.prompt)(&code);
        let tokens = self.poll_for_tokens(&code).await?;
        info!("Device-code sign-in completed");
        Ok(tokens)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        self.client.refresh_access_token(refresh_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_fall_back_to_uri_and_code() {
        let code: DeviceCode = serde_json::from_str(
            r#"{"device_code":"dc","user_code":"ABCD-EFGH",
                "verification_uri":"https://microsoft.com/devicelogin","expires_in":900}"#,
        )
        .unwrap();

        let text = code.instructions();
        assert!(text.contains("https://microsoft.com/devicelogin"));
        assert!(text.contains("ABCD-EFGH"));
        assert_eq!(code.interval, None);
    }

    #[test]
    fn endpoints_follow_the_tenant_authority() {
        let creds =
            MicrosoftCredentials { client_id: "app".into(), tenant_id: "contoso".into() };
        let flow = MicrosoftDeviceCodeFlow::new(&creds, reqwest::Client::new(), |_| {});

        assert_eq!(
            flow.device_code_endpoint,
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/devicecode"
        );
        assert_eq!(
            flow.client.config().token_endpoint,
            "https://login.microsoftonline.com/contoso/oauth2/v2.0/token"
        );
        assert_eq!(flow.client.config().scope_string(), "Calendars.ReadWrite offline_access");
    }
}
