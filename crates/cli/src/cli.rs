//! Argument model for the `calpurge` binary

use std::path::PathBuf;

use calpurge_domain::constants::PRIMARY_CALENDAR_ID;
use calpurge_domain::{CalPurgeError, ProviderKind, Result};
use clap::Parser;

/// Delete every calendar event inside a time window.
#[derive(Debug, Clone, Parser)]
#[command(name = "calpurge", version, about)]
pub struct Cli {
    /// Calendar backend: microsoft or google
    #[arg(long, default_value = "microsoft", value_parser = parse_provider)]
    pub provider: ProviderKind,

    /// Window start, local wall clock "YYYY-MM-DD HH:MM"
    #[arg(long)]
    pub start: Option<String>,

    /// Window end, local wall clock "YYYY-MM-DD HH:MM"
    #[arg(long)]
    pub end: Option<String>,

    /// IANA timezone of --start and --end [default: from config, else Europe/Helsinki]
    #[arg(long)]
    pub timezone: Option<String>,

    /// Google calendar name; unknown names fall back to the primary calendar
    #[arg(long, default_value = PRIMARY_CALENDAR_ID)]
    pub calendar: String,

    /// Remove the cached credential and exit
    #[arg(long, conflicts_with_all = ["start", "end", "dry_run"])]
    pub clean: bool,

    /// Credential cache file [default: token_cache.bin or token.json]
    #[arg(long, value_name = "PATH")]
    pub token_cache: Option<PathBuf>,

    /// Config file (TOML or JSON)
    #[arg(long, value_name = "PATH", env = "CALPURGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Google client secrets file [default: credentials.json]
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// List the events that would be deleted, delete nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with status 2 when any deletion failed
    #[arg(long)]
    pub strict: bool,

    /// Debug logging unless CALPURGE_LOG / RUST_LOG say otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Both window bounds, or a configuration error
    pub fn window_bounds(&self) -> Result<(&str, &str)> {
        match (self.start.as_deref(), self.end.as_deref()) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(CalPurgeError::Config(
                "--start and --end are required unless --clean is specified".into(),
            )),
        }
    }

    /// `--token-cache`, else the provider's default file
    pub fn token_cache_path(&self) -> PathBuf {
        self.token_cache
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.provider.default_token_cache()))
    }
}

fn parse_provider(value: &str) -> std::result::Result<ProviderKind, String> {
    value.parse().map_err(|e: CalPurgeError| e.to_string())
}
