//! calpurge - bulk deletion of calendar events
//!
//! Main entry point for the command line tool.

use std::process::ExitCode;

use calpurge_cli::utils::{console, logging};
use calpurge_cli::{commands, Cli};
use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(commands::EXIT_FATAL)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    logging::init(cli.verbose);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let strict = cli.strict;
    match commands::dispatch(cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_status(strict)),
        Err(err) => {
            console::error(&err);
            ExitCode::from(commands::EXIT_FATAL)
        }
    }
}
