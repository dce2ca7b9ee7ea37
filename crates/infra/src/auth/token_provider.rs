//! Bearer credentials for the provider adapters

use std::sync::Arc;

use async_trait::async_trait;
use calpurge_common::auth::{OAuthFlow, TokenManager, TokenStore};
use calpurge_core::TokenProvider;
use calpurge_domain::constants::TOKEN_REFRESH_THRESHOLD_SECS;
use calpurge_domain::Result;
use tracing::warn;

use crate::integrations::calendar::map_token_manager_error;

/// `TokenProvider` backed by a [`TokenManager`]
///
/// The cache is written right after a token is refreshed or acquired, so a
/// run that later fails still keeps the new credential.
pub struct OAuthTokenProvider<F: OAuthFlow + 'static, S: TokenStore + 'static> {
    manager: TokenManager<F, S>,
}

impl<F: OAuthFlow + 'static, S: TokenStore + 'static> OAuthTokenProvider<F, S> {
    pub fn new(flow: F, store: Arc<S>) -> Self {
        Self { manager: TokenManager::new(flow, store, TOKEN_REFRESH_THRESHOLD_SECS) }
    }

    /// Load the credential cache; `true` when cached tokens were found
    pub async fn initialize(&self) -> bool {
        self.manager.initialize().await
    }

    pub fn manager(&self) -> &TokenManager<F, S> {
        &self.manager
    }
}

#[async_trait]
impl<F: OAuthFlow + 'static, S: TokenStore + 'static> TokenProvider for OAuthTokenProvider<F, S> {
    async fn access_token(&self) -> Result<String> {
        let token = self.manager.access_token().await.map_err(map_token_manager_error)?;

        if let Err(e) = self.manager.persist().await {
            warn!(error = %e, "Could not write the token cache");
        }

        Ok(token)
    }
}
