//! Tracing subscriber setup for console diagnostics.
//!
//! Generated script text goes to stdout; all diagnostics go to stderr so the
//! output stays pipeable. The verbose flag widens the default filter to
//! `debug`; `RUST_LOG` overrides both.

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Safe to call once per process; a second call is a no-op because the
/// global default is already set.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
