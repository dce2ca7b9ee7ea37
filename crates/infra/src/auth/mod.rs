//! Credential cache and token provider
//!
//! - **[`file_store`]**: `TokenStore` backed by a JSON file
//! - **[`token_provider`]**: core `TokenProvider` port over a `TokenManager`

pub mod file_store;
pub mod token_provider;

pub use file_store::FileTokenStore;
pub use token_provider::OAuthTokenProvider;
