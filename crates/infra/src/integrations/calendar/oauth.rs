//! Loopback OAuth plumbing shared by the calendar sign-in flows.
//!
//! The callback server receives the browser redirect of the installed-app
//! flow. The mapping functions turn OAuth toolkit errors into domain errors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use calpurge_common::auth::{OAuthClientError, TokenManagerError};
use calpurge_domain::{CalPurgeError, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

const CALLBACK_PATH: &str = "/callback";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the browser redirect carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Code(String),
    /// The provider redirected with `error=...`, e.g. `access_denied`
    Denied(String),
}

/// Loopback HTTP server that receives OAuth redirect callbacks.
pub struct OAuthCallbackServer {
    port: u16,
    result: Arc<Mutex<Option<CallbackResult>>>,
    expected_state: Arc<Mutex<Option<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl OAuthCallbackServer {
    /// Start the loopback server on an ephemeral port.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|err| {
            CalPurgeError::Auth(format!("failed to bind OAuth loopback server: {err}"))
        })?;

        let port = listener
            .local_addr()
            .map_err(|err| CalPurgeError::Auth(format!("failed to determine port: {err}")))?
            .port();

        let result = Arc::new(Mutex::new(None));
        let expected_state = Arc::new(Mutex::new(None));

        let result_clone = Arc::clone(&result);
        let expected_state_clone = Arc::clone(&expected_state);

        let app = Router::new().route(
            CALLBACK_PATH,
            get(move |query: Query<HashMap<String, String>>| {
                handle_oauth_callback(
                    query,
                    Arc::clone(&result_clone),
                    Arc::clone(&expected_state_clone),
                )
            }),
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("OAuth callback server error: {}", err);
            }
        });

        debug!(port, "OAuth callback server listening");

        Ok(Self {
            port,
            result,
            expected_state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Redirect URI used in the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{CALLBACK_PATH}", self.port)
    }

    /// Configure expected OAuth state for CSRF validation.
    pub fn set_expected_state(&self, state: String) {
        *self.expected_state.lock() = Some(state);
    }

    /// Await the OAuth callback with a timeout.
    ///
    /// Redirects whose state does not match are answered with an error page
    /// and otherwise ignored.
    pub async fn wait_for_code(&self, timeout: Duration) -> Result<String> {
        if self.expected_state.lock().is_none() {
            return Err(CalPurgeError::Config("OAuth expected state not configured".to_string()));
        }

        let deadline = Instant::now() + timeout;

        loop {
            let received = self.result.lock().clone();
            match received {
                Some(CallbackResult::Code(code)) => return Ok(code),
                Some(CallbackResult::Denied(reason)) => {
                    return Err(CalPurgeError::Auth(format!("authorization denied: {reason}")));
                }
                None => {}
            }

            if Instant::now() > deadline {
                return Err(CalPurgeError::Auth(
                    "OAuth callback timeout waiting for authorization code".into(),
                ));
            }

            sleep(POLL_INTERVAL).await;
        }
    }

    /// Shut down the loopback server gracefully.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    return Err(CalPurgeError::Internal(format!(
                        "OAuth callback server panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Drop for OAuthCallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                handle.abort();
            }
        }
    }
}

async fn handle_oauth_callback(
    Query(params): Query<HashMap<String, String>>,
    result: Arc<Mutex<Option<CallbackResult>>>,
    expected_state: Arc<Mutex<Option<String>>>,
) -> Html<&'static str> {
    let expected = expected_state.lock().clone();
    let state_matches = matches!(
        (params.get("state"), expected.as_ref()),
        (Some(state), Some(expected)) if state == expected
    );

    if !state_matches {
        warn!("Ignoring OAuth callback with unexpected state");
        return Html(FAILURE_PAGE);
    }

    if let Some(code) = params.get("code") {
        *result.lock() = Some(CallbackResult::Code(code.clone()));
        return Html(SUCCESS_PAGE);
    }

    let reason = params.get("error").cloned().unwrap_or_else(|| "no code returned".to_string());
    *result.lock() = Some(CallbackResult::Denied(reason));
    Html(FAILURE_PAGE)
}

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Complete</title></head>
<body><h1>Authorization Successful</h1><p>You can close this window and return to calpurge.</p></body>
</html>"#;

const FAILURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Authorization Failed</title></head>
<body><h1>Authorization Failed</h1><p>Invalid or unexpected callback parameters.</p></body>
</html>"#;

/// Map a token manager failure into the domain error
pub fn map_token_manager_error(err: TokenManagerError) -> CalPurgeError {
    match err {
        TokenManagerError::OAuthError(inner) => map_oauth_client_error(inner),
        TokenManagerError::StoreError(msg) => CalPurgeError::Auth(format!("token cache: {msg}")),
    }
}

/// Map an OAuth toolkit failure into the domain error
///
/// Only configuration problems keep their own category; every other failure
/// means no credential could be obtained.
pub fn map_oauth_client_error(err: OAuthClientError) -> CalPurgeError {
    match err {
        OAuthClientError::ConfigError(msg) => CalPurgeError::Config(msg),
        OAuthClientError::OAuthError(e) => CalPurgeError::Auth(e.to_string()),
        OAuthClientError::RequestFailed(e) => {
            CalPurgeError::Auth(format!("token endpoint unreachable: {e}"))
        }
        other => CalPurgeError::Auth(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use calpurge_common::auth::OAuthError;

    use super::*;

    async fn get(url: &str) -> String {
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get(url)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivers_code_for_matching_state() {
        let server = OAuthCallbackServer::start().await.unwrap();
        server.set_expected_state("abc".into());

        let page = get(&format!("{}?code=the-code&state=abc", server.redirect_uri())).await;
        assert!(page.contains("Authorization Successful"));

        let code = server.wait_for_code(Duration::from_secs(2)).await.unwrap();
        assert_eq!(code, "the-code");
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn ignores_wrong_state_and_times_out() {
        let server = OAuthCallbackServer::start().await.unwrap();
        server.set_expected_state("abc".into());

        let page = get(&format!("{}?code=stolen&state=evil", server.redirect_uri())).await;
        assert!(page.contains("Authorization Failed"));

        let err = server.wait_for_code(Duration::from_millis(250)).await.unwrap_err();
        assert!(matches!(err, CalPurgeError::Auth(msg) if msg.contains("timeout")));
    }

    #[tokio::test]
    async fn provider_error_redirect_is_a_denial() {
        let server = OAuthCallbackServer::start().await.unwrap();
        server.set_expected_state("abc".into());

        get(&format!("{}?error=access_denied&state=abc", server.redirect_uri())).await;

        let err = server.wait_for_code(Duration::from_secs(2)).await.unwrap_err();
        assert_eq!(err, CalPurgeError::Auth("authorization denied: access_denied".into()));
    }

    #[tokio::test]
    async fn waiting_without_state_is_a_config_error() {
        let server = OAuthCallbackServer::start().await.unwrap();
        let err = server.wait_for_code(Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, CalPurgeError::Config(_)));
    }

    #[test]
    fn oauth_errors_map_to_auth_except_configuration() {
        let denied = OAuthClientError::OAuthError(OAuthError {
            error: "invalid_grant".into(),
            error_description: Some("Token has been expired or revoked.".into()),
        });
        assert!(matches!(map_oauth_client_error(denied), CalPurgeError::Auth(msg) if msg.contains("invalid_grant")));

        let config = OAuthClientError::ConfigError("redirect_uri is not set".into());
        assert!(matches!(map_oauth_client_error(config), CalPurgeError::Config(_)));

        let store = TokenManagerError::StoreError("disk full".into());
        assert!(matches!(map_token_manager_error(store), CalPurgeError::Auth(_)));
    }
}
