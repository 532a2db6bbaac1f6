//! Structured logging with `tracing`.
//!
//! Components log under fixed targets so output can be filtered with
//! `RUST_LOG`:
//!
//! - [`SEARCH`]: primary pass progress and executor retries
//! - [`SEARCH_EXTRA`]: extra-query phase
//! - [`SUGGESTIONS`] / [`TRENDS`]: upstream query sources
//! - [`SURFACES`]: browser surface recovery
//!
//! [`init_subscriber`] installs the process-wide subscriber;
//! [`test_utils::capture_logs`] captures events in memory for assertions.

pub mod test_utils;

pub use test_utils::{CapturedLogs, capture_logs};

/// Target for primary-pass search events.
pub const SEARCH: &str = "sortie::search";
/// Target for extra-phase search events.
pub const SEARCH_EXTRA: &str = "sortie::search::extra";
/// Target for suggestion lookups.
pub const SUGGESTIONS: &str = "sortie::suggestions";
/// Target for trending-topic lookups.
pub const TRENDS: &str = "sortie::trends";
/// Target for surface (tab) recovery.
pub const SURFACES: &str = "sortie::surfaces";

/// Initialize the global tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `level`. With `json` set, events are
/// written as JSON lines instead of the compact human format. Subsequent
/// calls are no-ops.
pub fn init_subscriber(level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails if a global subscriber is already set
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn", false);
        init_subscriber("debug", true);
    }

    #[test]
    fn targets_share_prefix() {
        for target in [SEARCH, SEARCH_EXTRA, SUGGESTIONS, TRENDS, SURFACES] {
            assert!(target.starts_with("sortie::"));
        }
    }
}
