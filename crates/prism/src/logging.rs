//! Logging initialization.
//!
//! Structured logging via the `tracing` ecosystem. Logs go to stderr so that
//! stdout stays free for report output; `RUST_LOG` overrides the configured
//! level.

use prism_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem from config, with CLI overrides.
///
/// `--verbose` forces debug level; `--json-logs` forces JSON output.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let default_level = if verbose { "debug" } else { config.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_logs || config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
