//! Tracing initialization
//!
//! The library itself only emits `tracing` events. Applications and tests
//! that want them on stderr install a subscriber through one of these
//! helpers. Filtering follows `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human readable subscriber.
///
/// Safe to call multiple times (subsequent calls are no-ops). Returns
/// whether this call installed the subscriber.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(true).try_init().is_ok()
}

/// Install a JSON subscriber with timestamps.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_tracing_json() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}
