//! Logging and tracing initialization.
//!
//! The level is controlled by `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=stillwater=debug,tower_http=debug,sqlx=warn cargo run
//! ```
//!
//! Call exactly one of the `init_*` functions, once, before building the
//! [`App`](crate::App). A second call panics because the global subscriber
//! is already set.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Initialize logging using the format named in the config
/// (`pretty`, `json`, anything else is compact).
pub fn init_from_config(config: &Config) {
    match config.log_format.as_str() {
        "pretty" => init_logging_pretty(),
        "json" => init_logging_json(),
        _ => init_logging(),
    }
}

/// Compact single-line output.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Readable multi-line output with spans, for development.
pub fn init_logging_pretty() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true),
        )
        .init();
}

/// JSON lines for log aggregation in production.
pub fn init_logging_json() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
