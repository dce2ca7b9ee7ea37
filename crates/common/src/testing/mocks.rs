//! In-memory doubles for the auth traits

#![allow(clippy::missing_errors_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{OAuthClientError, OAuthFlow, TokenSet, TokenStore};

type Script = Arc<Mutex<VecDeque<Result<TokenSet, OAuthClientError>>>>;

/// Token store that keeps the cache in memory and counts writes
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenSet>>,
    load_error: Option<String>,
    saves: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self { tokens: Mutex::new(Some(tokens)), ..Self::default() }
    }

    /// A store whose `load` always fails, like a corrupt cache file
    pub fn failing_load(message: &str) -> Self {
        Self { load_error: Some(message.to_string()), ..Self::default() }
    }

    pub fn stored(&self) -> Option<TokenSet> {
        self.tokens.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenSet>, String> {
        if let Some(message) = &self.load_error {
            return Err(message.clone());
        }
        Ok(self.tokens.lock().clone())
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), String> {
        *self.tokens.lock() = Some(tokens.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        *self.tokens.lock() = None;
        Ok(())
    }
}

/// OAuth flow that replays queued results
///
/// Unscripted calls fail with [`OAuthClientError::Interaction`]. Clones share
/// the same script and counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOAuthFlow {
    acquire_script: Script,
    refresh_script: Script,
    acquire_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl ScriptedOAuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_acquire(self, result: Result<TokenSet, OAuthClientError>) -> Self {
        self.acquire_script.lock().push_back(result);
        self
    }

    #[must_use]
    pub fn with_refresh(self, result: Result<TokenSet, OAuthClientError>) -> Self {
        self.refresh_script.lock().push_back(result);
        self
    }

    /// Sleep before answering, to widen race windows in concurrency tests
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    async fn replay(&self, script: &Script, what: &str) -> Result<TokenSet, OAuthClientError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(OAuthClientError::Interaction(format!("no scripted {what}"))))
    }
}

#[async_trait]
impl OAuthFlow for ScriptedOAuthFlow {
    async fn acquire(&self) -> Result<TokenSet, OAuthClientError> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        self.replay(&self.acquire_script, "acquire").await
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.replay(&self.refresh_script, "refresh").await
    }
}
