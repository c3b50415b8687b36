// Logging module - Diagnostic tracing setup
use crate::domain::error::{SerialFlowError, SerialFlowResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for `level`, falling back to `info` for unknown names.
pub fn filter_directive(level: &str) -> String {
    let level = match level.to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    format!("serialflow={},warn", level)
}

/// Initialize logging system. `RUST_LOG` takes precedence over `level`.
///
/// Diagnostics go to stderr; stdout carries the session transcript.
pub fn init_logging(level: &str) -> SerialFlowResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init()
        .map_err(|e| SerialFlowError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("SerialFlow logging system initialized");
    Ok(())
}
