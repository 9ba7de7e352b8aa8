//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console logs on stderr
//! - Configurable log levels (`--log-level`, `RUST_LOG`)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use couchcopy::logging::init_logging;
//! use couchcopy::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a flushed bulk batch
///
/// # Example
///
/// ```no_run
/// use couchcopy::log_batch_flushed;
///
/// log_batch_flushed!(3, 5000, 15000);
/// ```
#[macro_export]
macro_rules! log_batch_flushed {
    ($batch:expr, $size:expr, $delivered:expr) => {
        tracing::debug!(
            batch = $batch,
            size = $size,
            delivered = $delivered,
            "Flushed batch"
        );
    };
}

/// Log an error with its kind and context
///
/// # Example
///
/// ```no_run
/// use couchcopy::log_error_with_context;
/// use couchcopy::domain::CopyError;
///
/// let error = CopyError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            kind = $error.kind(),
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
