//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Time window input
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const DEFAULT_TIMEZONE: &str = "Europe/Helsinki";

// Enumeration
pub const MAX_ENUMERATED_EVENTS: usize = 9500;
pub const PAGE_DELAY_MS: u64 = 50;

// Deletion
pub const MAX_CONCURRENT_DELETES: usize = 3;
pub const DELETE_DELAY_MS: u64 = 50;
pub const DELETED_STATUS: u16 = 204;

// Credentials
pub const MICROSOFT_TOKEN_CACHE_FILE: &str = "token_cache.bin";
pub const GOOGLE_TOKEN_CACHE_FILE: &str = "token.json";
pub const GOOGLE_CREDENTIALS_FILE: &str = "credentials.json";
pub const TOKEN_REFRESH_THRESHOLD_SECS: i64 = 300;

// Google calendar selection
pub const PRIMARY_CALENDAR_ID: &str = "primary";
