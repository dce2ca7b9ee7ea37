//! Testing utilities
//!
//! - **[`mocks`]**: in-memory [`TokenStore`](crate::auth::TokenStore) and a
//!   scripted [`OAuthFlow`](crate::auth::OAuthFlow)
//!
//! Enabled by the `test-utils` feature; downstream crates pull it in as a
//! dev-dependency.

pub mod mocks;

pub use mocks::{MemoryTokenStore, ScriptedOAuthFlow};
