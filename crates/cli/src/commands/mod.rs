//! Commands behind the `calpurge` binary

pub mod clean;
pub mod purge;

use calpurge_domain::Result;

use crate::cli::Cli;

/// Configuration, authentication or enumeration error
pub const EXIT_FATAL: u8 = 1;
/// `--strict` and at least one deletion failed
pub const EXIT_DELETE_FAILURES: u8 = 2;

/// How a successful invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Cleaned,
    Listed { found: usize },
    Purged { deleted: usize, failed: usize },
}

impl Outcome {
    /// Per-event failures only change the status under `--strict`
    pub fn exit_status(&self, strict: bool) -> u8 {
        match self {
            Self::Purged { failed, .. } if strict && *failed > 0 => EXIT_DELETE_FAILURES,
            _ => 0,
        }
    }
}

/// Run the command selected by the flags
pub async fn dispatch(cli: Cli) -> Result<Outcome> {
    if cli.clean {
        clean::run(&cli).await
    } else {
        purge::run(&cli).await
    }
}
