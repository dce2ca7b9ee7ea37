//! Tracing subscriber setup
//!
//! Diagnostics go to stderr; stdout is reserved for the lines the user asked
//! for (device-code instructions, per-event results, the summary).

use calpurge_domain::CalPurgeError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `calpurge_infra=debug`
pub const LOG_VAR: &str = "CALPURGE_LOG";
/// `json` switches to the JSON formatter
pub const LOG_FORMAT_VAR: &str = "CALPURGE_LOG_FORMAT";

const FALLBACK_LOG_VAR: &str = "RUST_LOG";

/// Build the filter from `CALPURGE_LOG`, then `RUST_LOG`, then the default
/// level (`warn`, or `debug` when verbose).
///
/// Unparseable directives fall through to the next source.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };

    [LOG_VAR, FALLBACK_LOG_VAR]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Install the global subscriber
///
/// A second call is a no-op.
pub fn init(verbose: bool) {
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json { builder.json().try_init() } else { builder.compact().try_init() };
    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Record a fatal error with its stable label
#[inline]
pub fn log_fatal(error: &CalPurgeError) {
    debug!(kind = error.label(), category = ?error.category(), error = %error, "Run aborted");
}
