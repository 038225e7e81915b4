//! Logging setup for the binary
//!
//! Logs go to stderr so that reports written to stdout stay machine-readable.
//! `RUST_LOG` takes precedence over the level passed on the command line.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// A second call is ignored, which keeps tests that go through `main`'s
/// setup path from failing.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
