//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "RPCHAT_LOG";

/// Install the global subscriber. Diagnostics go to stderr without
/// timestamps so they sit cleanly between shell lines; the level comes from
/// `RPCHAT_LOG` and defaults to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
