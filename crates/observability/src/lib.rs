//! Tracing setup shared by the synth binary and the function handlers.

/// Initialize process-wide tracing for the definition pass.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize tracing inside a function runtime.
pub fn init_for_lambda() {
    tracing::init_for_lambda();
}

/// Tracing configuration (filters, layers).
pub mod tracing;
