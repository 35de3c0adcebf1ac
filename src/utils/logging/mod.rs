//! Logging utilities
//!
//! Structured logging setup built on `tracing`. The resolver emits one event
//! per expansion step, so scans of large tenants can be followed live with
//! `RUST_LOG=permiscan=debug`.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "permiscan=info";

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise falls back to
/// [`DEFAULT_LOG_FILTER`]. Safe to call more than once; later calls are
/// no-ops so tests can initialize independently.
pub fn init_logging() {
    init_logging_with_filter(DEFAULT_LOG_FILTER);
}

/// Initialize the global tracing subscriber with an explicit fallback filter.
pub fn init_logging_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
