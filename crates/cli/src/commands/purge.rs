//! Default command: resolve the window, sign in, enumerate and delete

use std::sync::Arc;

use calpurge_core::{PurgeMode, PurgeService};
use calpurge_domain::{resolve_time_window, Result};
use tracing::{info, instrument};

use super::Outcome;
use crate::cli::Cli;
use crate::context::AppContext;
use crate::utils::console::{self, ConsoleObserver};

#[instrument(skip_all, fields(provider = %cli.provider, dry_run = cli.dry_run))]
pub async fn run(cli: &Cli) -> Result<Outcome> {
    let (start, end) = cli.window_bounds()?;
    let context = AppContext::new(cli)?;

    // Bad input fails here, before any credential is touched
    let window = resolve_time_window(start, end, context.timezone(cli))?;
    info!(%window, "Resolved time window");

    let tokens = context.token_provider().await?;
    let client = context.calendar_client(Arc::clone(&tokens), &cli.calendar).await?;

    let mode = if cli.dry_run { PurgeMode::DryRun } else { PurgeMode::Delete };
    let service = PurgeService::new(client, tokens, &context.config)
        .with_observer(Arc::new(ConsoleObserver::stdout(mode)));

    let run = service.run(&window, mode).await?;

    let Some(report) = run.report else {
        return Ok(Outcome::Listed { found: run.batch.len() });
    };

    let summary = report.summary();
    console::say(summary);
    Ok(Outcome::Purged { deleted: summary.deleted, failed: summary.failed })
}
