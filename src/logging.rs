//! Diagnostic logging setup.
//!
//! Log lines go to stderr. The filter comes from `RUST_LOG` and defaults to
//! `info` for this crate.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// Calling this twice is harmless; the second call keeps the first subscriber.
pub fn init() {
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build the filter from an optional directive string, falling back to the default.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
