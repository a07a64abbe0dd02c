//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::config::CoreConfig;

static INIT: Once = Once::new();

/// Install the global fmt subscriber. Safe to call more than once; only the
/// first call has any effect, and an already-installed subscriber is kept.
pub fn init_logging(config: &CoreConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(&config.log_filter)
            .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::info!("medfo-core v{} logging initialised", env!("CARGO_PKG_VERSION"));
        }
    });
}
