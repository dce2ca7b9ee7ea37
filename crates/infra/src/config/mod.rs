//! Configuration loading and management
//!
//! This module provides utilities for loading the purge configuration and
//! provider credentials from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{
    load_google_secrets, load_microsoft_credentials, find_config_path, ConfigLoader,
};
