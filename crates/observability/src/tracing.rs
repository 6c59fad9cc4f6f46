//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered through `RUST_LOG` when it is set.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is absent or unparsable.
pub const DEFAULT_FILTER: &str = "info,tower_http=info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
