//! # calpurge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client and error conversions
//! - Configuration and credential loading
//! - Calendar provider adapters (Microsoft Graph, Google Calendar)
//! - OAuth sign-in flows and the on-disk token cache
//!
//! ## Architecture
//! - Implements traits defined in `calpurge-core`
//! - Depends on `calpurge-common`, `calpurge-domain` and `calpurge-core`
//! - Contains all "impure" code (network, file system)

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use auth::{FileTokenStore, OAuthTokenProvider};
pub use config::ConfigLoader;
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::{
    CalendarSelection, DeviceCode, GoogleCalendarProvider, GoogleInstalledAppFlow,
    MicrosoftCalendarProvider, MicrosoftDeviceCodeFlow,
};
