//! Process-wide log subscriber.
//!
//! The processor crates log through the `log` facade; the subscriber
//! installed here bridges those records into `tracing`.

use tracing_subscriber::EnvFilter;

/// Env var that overrides the configured level (`EnvFilter` syntax).
pub const LOG_ENV: &str = "NUTRISYNC_LOG";

/// Build the filter: `NUTRISYNC_LOG` first, then `level`, then `info`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the fmt subscriber. Returns `false` when one was already set.
pub fn init_logging(level: &str) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level, "logging initialised");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_noop() {
        let _ = init_logging("debug");
        assert!(!init_logging("debug"));
        log::info!(target: "nutrisync::dropbox", "bridged record");
    }

    #[test]
    fn bad_level_falls_back() {
        let filter = build_filter("not a [valid filter");
        assert!(!filter.to_string().is_empty());
    }
}
