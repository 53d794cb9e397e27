//! `administrare_log`: process-wide `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Default filter directive when neither `RUST_LOG` nor a level is given.
pub const C_LOG_LEVEL_DEFAULT: &str = "info";

/// Build the filter: `RUST_LOG` wins, then `level`, then [`C_LOG_LEVEL_DEFAULT`].
pub fn derive_env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(C_LOG_LEVEL_DEFAULT)))
        .unwrap_or_else(|_| EnvFilter::new(C_LOG_LEVEL_DEFAULT))
}

/// Install a stderr fmt subscriber.
///
/// Returns `false` when a global subscriber is already installed.
pub fn init_logging(level: Option<&str>) -> bool {
    fmt()
        .with_env_filter(derive_env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
