//! Traits for interactive OAuth flows and credential persistence
//!
//! These traits let [`TokenManager`](super::TokenManager) be driven by a
//! scripted flow and an in-memory store in tests.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::types::TokenSet;

/// One provider's way of obtaining tokens
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    /// Run the interactive flow (device code, browser loopback) from scratch
    ///
    /// # Errors
    /// Returns error if the user declines, the flow expires or the token
    /// endpoint rejects the grant
    async fn acquire(&self) -> Result<TokenSet, OAuthClientError>;

    /// Obtain a new access token without user interaction
    ///
    /// # Errors
    /// Returns error if the refresh token is invalid, revoked or expired
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError>;
}

/// Persistence for the credential cache
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the cached tokens; `Ok(None)` when nothing is cached yet
    ///
    /// # Errors
    /// Returns error if the cache exists but cannot be read or parsed
    async fn load(&self) -> Result<Option<TokenSet>, String>;

    /// Replace the cached tokens
    ///
    /// # Errors
    /// Returns error if the cache cannot be written
    async fn save(&self, tokens: &TokenSet) -> Result<(), String>;

    /// Remove the cache. Removing a cache that does not exist succeeds.
    ///
    /// # Errors
    /// Returns error if the cache exists but cannot be removed
    async fn clear(&self) -> Result<(), String>;
}
