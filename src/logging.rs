//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: console output filtered by
//! `RUST_LOG` (falling back to the configured level), plus an optional daily
//! rolling log file written through a non-blocking appender.

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{BridgeError, Result};

/// File name prefix for the rolling log file.
const LOG_FILE_PREFIX: &str = "joy-motor-bridge.log";

/// Parses the configured level.
fn parse_level(config: &LoggingConfig) -> Result<Level> {
    config
        .level
        .parse::<Level>()
        .map_err(|_| BridgeError::Logging(format!("invalid log level '{}'", config.level)))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. It is `None` when file output is disabled.
///
/// # Errors
///
/// Returns `Logging` if the level is invalid or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = parse_level(config)?;

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = if config.directory.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.directory, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| BridgeError::Logging(e.to_string()))?;

    Ok(guard)
}
