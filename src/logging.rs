//! Log subscriber setup.
//!
//! rivet only emits `tracing` events; installing a subscriber is the
//! application's call. [`init`] is the one-liner for services that want the
//! usual `fmt` output filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies
/// (for example `"info"` or `"rivet=debug,info"`). Fails if a global
/// subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
}
