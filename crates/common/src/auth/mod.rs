//! OAuth 2.0 toolkit
//!
//! Provider-neutral building blocks for the calendar sign-in flows. The
//! provider specifics (device-code polling, the loopback callback server,
//! where the cache lives on disk) sit in the infra crate behind the
//! [`OAuthFlow`] and [`TokenStore`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  TokenManager    │  load → valid? → refresh → interactive flow → persist
//! └────────┬─────────┘
//!          │
//!          ├──► OAuthFlow    (device code, installed-app loopback)
//!          │       └──► OAuthClient  (token endpoint, PKCE URL)
//!          │
//!          └──► TokenStore   (credential cache)
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenSet`, `TokenResponse`, `OAuthConfig`, `OAuthError`
//! - **[`pkce`]**: PKCE challenge generation and state validation
//! - **[`client`]**: token endpoint client
//! - **[`traits`]**: `OAuthFlow` and `TokenStore`
//! - **[`token_manager`]**: cache lifecycle and single-flight acquisition

pub mod client;
pub mod pkce;
pub mod token_manager;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, validate_state};
pub use pkce::PKCEChallenge;
pub use token_manager::{TokenManager, TokenManagerError};
pub use traits::{OAuthFlow, TokenStore};
pub use types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};
