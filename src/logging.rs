//! Subscriber setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! caller's choice. Logs go to stderr so stdout carries nothing but the
//! command's JSON output.

use crate::config::{LogFormat, LoggingSettings};
use crate::error::{ConfigError, ConfigResult};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
pub fn env_filter(settings: &LoggingSettings) -> ConfigResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Invalid(format!("Invalid log level '{}': {}", settings.level, e)))
}

/// Install the global subscriber. Call once, before any work.
pub fn init_logging(settings: &LoggingSettings) -> ConfigResult<()> {
    let filter = env_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match settings.format {
        LogFormat::Json => builder.with_target(false).json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| ConfigError::Invalid(format!("Logging already initialized: {}", e)))?;

    tracing::debug!(format = ?settings.format, "logging initialized");
    Ok(())
}
