//! Tracing/log initialization for embedding shells and test harnesses.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global tracing subscriber and the `log` bridge.
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if tracing_log::LogTracer::init().is_err() {
            // A logger is already installed; keep it.
            return;
        }

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
