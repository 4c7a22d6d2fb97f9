//! Tracing subscriber setup for hosts that do not install their own.

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "warn";
const DEBUG_FILTER: &str = "debug";

/// Filter directive derived from the environment: debug mode wins over an
/// explicit filter, which wins over the default.
#[must_use]
pub fn filter_directive(config: &EnvConfig) -> &str {
    if config.debug {
        DEBUG_FILTER
    } else {
        config.log_filter.as_deref().unwrap_or(DEFAULT_FILTER)
    }
}

/// Installs a global fmt subscriber. Returns `false` when one is already set.
pub fn init_logging(config: &EnvConfig) -> bool {
    let filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
