//! Tracing setup helpers.

use tracing_subscriber::EnvFilter;

/// Initializes a global tracing subscriber honoring `RUST_LOG`.
///
/// Defaults to `info` when the environment sets no filter. Safe to call
/// more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
