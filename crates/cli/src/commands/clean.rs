//! `--clean`: forget the cached credential

use calpurge_common::auth::TokenStore;
use calpurge_domain::{CalPurgeError, Result};
use calpurge_infra::FileTokenStore;
use tracing::info;

use super::Outcome;
use crate::cli::Cli;
use crate::utils::console;

pub async fn run(cli: &Cli) -> Result<Outcome> {
    let path = cli.token_cache_path();
    FileTokenStore::new(&path).clear().await.map_err(CalPurgeError::Config)?;

    info!(provider = %cli.provider, path = %path.display(), "Token cache removed");
    console::say("Token cache cleaned.");
    Ok(Outcome::Cleaned)
}
