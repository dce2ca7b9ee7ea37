//! User-facing console output and prompts

use std::fmt::Display;
use std::io::{self, Write};

use anyhow::Context;
use calpurge_core::{PurgeMode, PurgeObserver};
use calpurge_domain::{CalPurgeError, EventBatch, EventRef, PurgeOutcome, Result};
use parking_lot::Mutex;

/// Write one line to stdout
///
/// A closed stdout (e.g. `calpurge ... | head`) is ignored.
pub fn say(line: impl Display) {
    let _ = writeln!(io::stdout().lock(), "{line}");
}

/// Write a fatal error to stderr
pub fn error(err: &CalPurgeError) {
    super::logging::log_fatal(err);
    let _ = writeln!(io::stderr().lock(), "{err}");
}

/// Ask for a value on the terminal
///
/// # Errors
/// `CalPurgeError::Config` when there is no terminal to ask on.
pub fn prompt(label: &str) -> Result<String> {
    read_input(label).map_err(|e| CalPurgeError::Config(format!("{e:#}")))
}

fn read_input(label: &str) -> anyhow::Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("could not read \"{label}\" from the terminal"))
}

/// `PurgeObserver` printing progress lines
///
/// Per-event lines are written as each delete completes, so their order
/// follows completion, not enumeration.
pub struct ConsoleObserver {
    mode: PurgeMode,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    pub fn stdout(mode: PurgeMode) -> Self {
        Self::with_writer(mode, Box::new(io::stdout()))
    }

    pub fn with_writer(mode: PurgeMode, out: Box<dyn Write + Send>) -> Self {
        Self { mode, out: Mutex::new(out) }
    }

    fn line(&self, line: impl Display) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

impl PurgeObserver for ConsoleObserver {
    fn on_enumerated(&self, batch: &EventBatch) {
        match self.mode {
            PurgeMode::Delete => self.line(format_args!("Found {} events to delete.", batch.len())),
            PurgeMode::DryRun => {
                self.line(format_args!("Found {} events (dry run, nothing is deleted).", batch.len()));
                for event in batch.iter() {
                    self.line(format_args!("  {}", event.describe()));
                }
            }
        }

        if batch.is_truncated() {
            self.line(format_args!(
                "Listing stopped after {} events; run again to purge the rest.",
                batch.len()
            ));
        }
    }

    fn on_outcome(&self, event: &EventRef, outcome: &PurgeOutcome) {
        match outcome {
            PurgeOutcome::Deleted => self.line(format_args!("Deleted event {}", event.id)),
            PurgeOutcome::Failed { reason, status: Some(status) } => {
                self.line(format_args!("Could not delete event {}: {status} {reason}", event.id));
            }
            PurgeOutcome::Failed { reason, status: None } => {
                self.line(format_args!("Could not delete event {}: {reason}", event.id));
            }
        }
    }
}
