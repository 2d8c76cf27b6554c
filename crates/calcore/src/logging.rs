//! Tracing-subscriber bootstrap for binaries and test harnesses embedding
//! the calendar libraries.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading its filter from
/// `RUST_LOG`, falling back to `default_level` when unset.
///
/// Calling this more than once per process is a no-op after the first
/// call; `tracing`'s global dispatcher can only be set once.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
