//! Logging initialization for the command-line tool

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is not set
fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        // Release builds default to INFO to avoid excessive logs.
        "info"
    }
}

/// Install a formatted stderr subscriber filtered by `RUST_LOG`
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized");
}
