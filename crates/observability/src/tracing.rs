//! Tracing/logging initialization.
//!
//! JSON lines filtered by `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Like [`init`], without timestamps: the log service adds ingestion time.
pub fn init_for_lambda() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .without_time()
        .with_target(false)
        .with_current_span(false)
        .try_init();
}
