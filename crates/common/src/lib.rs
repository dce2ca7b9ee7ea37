//! Modular common utilities shared across calpurge crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: serde/thiserror based building blocks
//! - `runtime`: async infrastructure (resilience: bulkhead, throttle)
//! - `platform`: OAuth 2.0 toolkit (tokens, PKCE, client, token manager)
//! - `observability`: tracing instrumentation (pulled in by `runtime`)
//! - `test-utils`: in-memory doubles for the auth traits

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "platform", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{OAuthFlow, TokenManager, TokenSet, TokenStore};
#[cfg(feature = "runtime")]
pub use resilience::{Bulkhead, FixedDelay, NoDelay, Throttle};
