//! Subscriber setup
//!
//! Human-readable events go to stderr. With `logging.local_enabled`, a second
//! layer writes JSON lines to `<local_path>/couchcopy.log`, rotated daily or
//! hourly.
//!
//! ```no_run
//! use couchcopy::config::LoggingConfig;
//! use couchcopy::logging::init_logging;
//!
//! let _guard = init_logging("debug", &LoggingConfig::default()).expect("logging");
//! tracing::debug!("ready");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{CopyError, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_NAME: &str = "couchcopy.log";

/// Keeps the background file writer alive; dropping it flushes pending lines
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the `couchcopy=<level>` default filter.
/// Fails if the level is unknown, the log directory cannot be created, or a
/// subscriber is already installed.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter(level));

    let (file, file_guard) = if config.local_enabled {
        let (writer, guard) = file_writer(config)?;
        let layer = fmt::layer()
            .json()
            .with_thread_ids(true)
            .with_writer(writer)
            .with_filter(env_filter(level));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| CopyError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::debug!(%level, file = config.local_enabled, "Logging initialized");
    Ok(LoggingGuard { _file: file_guard })
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("couchcopy={level}")))
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        CopyError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::new(
        rotation(&config.local_rotation),
        &config.local_path,
        LOG_FILE_NAME,
    );
    Ok(tracing_appender::non_blocking(appender))
}

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(CopyError::Configuration(format!(
            "Invalid log level '{level}' (expected trace, debug, info, warn or error)"
        ))),
    }
}
