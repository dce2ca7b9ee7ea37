//! # calpurge CLI
//!
//! Command line layer - argument parsing, wiring and console output.
//!
//! This crate contains:
//! - The `calpurge` argument model
//! - Commands (purge, clean)
//! - Application context (config, HTTP client, credential cache)
//! - Logging setup and console output
//!
//! ## Architecture
//! - Depends on `domain`, `common`, `core`, and `infra`
//! - Wires the provider adapters into the core purge pipeline

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

pub use cli::Cli;
pub use commands::{dispatch, Outcome};
pub use context::AppContext;
