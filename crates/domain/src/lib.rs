//! # calpurge Domain
//!
//! Business domain types and models for calpurge.
//!
//! This crate contains:
//! - Time window, event and deletion outcome types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//! - Time window resolution (local wall clock to UTC)
//!
//! ## Architecture
//! - No dependencies on other calpurge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::time_window::{resolve_time_window, TimeWindowResolver};
