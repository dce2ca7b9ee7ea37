//! Token manager with refresh-or-acquire semantics
//!
//! Manages the credential lifecycle for a single run:
//! - Load the cache once at startup
//! - Hand out the cached token while it is valid
//! - Refresh silently when it is about to expire, falling back to the
//!   interactive flow when refresh is impossible or rejected
//! - Persist only when the cached state actually changed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::client::OAuthClientError;
use super::traits::{OAuthFlow, TokenStore};
use super::types::TokenSet;

/// Error type for token manager operations
#[derive(Debug)]
pub enum TokenManagerError {
    /// Token store operation failed
    StoreError(String),

    /// OAuth operation failed
    OAuthError(OAuthClientError),
}

impl std::fmt::Display for TokenManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreError(e) => write!(f, "Token cache error: {e}"),
            Self::OAuthError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for TokenManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OAuthError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OAuthClientError> for TokenManagerError {
    fn from(err: OAuthClientError) -> Self {
        Self::OAuthError(err)
    }
}

impl From<String> for TokenManagerError {
    fn from(err: String) -> Self {
        Self::StoreError(err)
    }
}

/// Owns the credential cache for one provider
///
/// Acquisition is single-flight: concurrent callers that find the token
/// expired wait for one refresh (or one interactive prompt) instead of each
/// starting their own.
pub struct TokenManager<F: OAuthFlow + 'static, S: TokenStore + 'static> {
    flow: Arc<F>,
    store: Arc<S>,
    current_tokens: RwLock<Option<TokenSet>>,
    acquire_lock: Mutex<()>,
    state_changed: AtomicBool,
    refresh_threshold_seconds: i64,
}

impl<F: OAuthFlow + 'static, S: TokenStore + 'static> TokenManager<F, S> {
    /// # Arguments
    /// * `flow` - Interactive flow and refresh grant for the provider
    /// * `store` - Credential cache
    /// * `refresh_threshold_seconds` - Treat tokens as expired this many
    ///   seconds early (300 = 5 min)
    #[must_use]
    pub fn new(flow: F, store: Arc<S>, refresh_threshold_seconds: i64) -> Self {
        Self {
            flow: Arc::new(flow),
            store,
            current_tokens: RwLock::new(None),
            acquire_lock: Mutex::new(()),
            state_changed: AtomicBool::new(false),
            refresh_threshold_seconds,
        }
    }

    /// Load the credential cache
    ///
    /// Returns `true` when cached tokens were found. An unreadable cache is
    /// logged and treated as empty so the interactive flow can replace it.
    pub async fn initialize(&self) -> bool {
        match self.store.load().await {
            Ok(Some(tokens)) => {
                *self.current_tokens.write().await = Some(tokens);
                info!("Token manager initialized with cached tokens");
                true
            }
            Ok(None) => {
                debug!("No cached tokens found");
                false
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token cache");
                false
            }
        }
    }

    /// Current access token, refreshed or re-acquired when needed
    ///
    /// # Errors
    /// Returns error if both refresh and the interactive flow fail
    pub async fn access_token(&self) -> Result<String, TokenManagerError> {
        if let Some(token) = self.valid_access_token().await {
            return Ok(token);
        }

        let _guard = self.acquire_lock.lock().await;

        // Another caller may have finished while we waited.
        if let Some(token) = self.valid_access_token().await {
            return Ok(token);
        }

        let refresh_token = {
            let tokens = self.current_tokens.read().await;
            tokens.as_ref().filter(|t| t.can_refresh()).and_then(|t| t.refresh_token.clone())
        };

        if let Some(refresh_token) = refresh_token {
            match self.flow.refresh(&refresh_token).await {
                Ok(tokens) => {
                    info!("Refreshed access token");
                    return Ok(self.replace_tokens(tokens).await);
                }
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, starting interactive sign-in");
                }
            }
        }

        let tokens = self.flow.acquire().await?;
        info!("Acquired new tokens");
        Ok(self.replace_tokens(tokens).await)
    }

    async fn valid_access_token(&self) -> Option<String> {
        let tokens = self.current_tokens.read().await;
        tokens
            .as_ref()
            .filter(|t| !t.is_expired(self.refresh_threshold_seconds))
            .map(|t| t.access_token.clone())
    }

    async fn replace_tokens(&self, tokens: TokenSet) -> String {
        let access_token = tokens.access_token.clone();
        *self.current_tokens.write().await = Some(tokens);
        self.state_changed.store(true, Ordering::SeqCst);
        access_token
    }

    /// Whether the in-memory tokens differ from what was loaded or last saved
    #[must_use]
    pub fn has_state_changed(&self) -> bool {
        self.state_changed.load(Ordering::SeqCst)
    }

    /// Write the cache if its state changed
    ///
    /// Returns `true` when a write happened.
    ///
    /// # Errors
    /// Returns error if the store rejects the write
    pub async fn persist(&self) -> Result<bool, TokenManagerError> {
        if !self.has_state_changed() {
            return Ok(false);
        }

        let tokens = self.current_tokens.read().await.clone();
        let Some(tokens) = tokens else {
            return Ok(false);
        };

        self.store.save(&tokens).await?;
        self.state_changed.store(false, Ordering::SeqCst);
        debug!("Token cache written");
        Ok(true)
    }

    /// Current token set, without refresh
    pub async fn tokens(&self) -> Option<TokenSet> {
        self.current_tokens.read().await.clone()
    }

    /// Remove the cache and forget in-memory tokens
    ///
    /// # Errors
    /// Returns error if the store cannot remove the cache
    pub async fn clear(&self) -> Result<(), TokenManagerError> {
        self.store.clear().await?;
        *self.current_tokens.write().await = None;
        self.state_changed.store(false, Ordering::SeqCst);
        info!("Token cache cleared");
        Ok(())
    }

    #[must_use]
    pub fn refresh_threshold(&self) -> i64 {
        self.refresh_threshold_seconds
    }
}
