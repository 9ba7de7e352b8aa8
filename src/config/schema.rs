//! Configuration schema types
//!
//! This module defines the configuration structure for couchcopy. Every
//! section has defaults, so an empty TOML file (or no file at all) is a valid
//! starting point that CLI flags complete.

use crate::domain::Address;
use serde::{Deserialize, Serialize};

/// Main couchcopy configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyConfig {
    /// What to copy and where
    #[serde(default)]
    pub transfer: TransferConfig,

    /// HTTP client settings for remote sources and destinations
    #[serde(default)]
    pub http: HttpConfig,

    /// Terminal progress reporting
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CopyConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.transfer.validate()?;
        self.http.validate()?;
        self.progress.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Run configuration: immutable for the duration of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Source address: CouchDB export URL (e.g. `.../_all_docs?include_docs=true`) or file path
    #[serde(default)]
    pub input: String,

    /// Destination address: CouchDB database URL or file path
    #[serde(default)]
    pub output: String,

    /// Documents per bulk request, also the transfer channel capacity
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,

    /// Write one document per line to a local file instead of uploading
    #[serde(default)]
    pub flatten: bool,
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        Address::new(self.input.clone()).map_err(|e| format!("transfer.input: {e}"))?;
        let output =
            Address::new(self.output.clone()).map_err(|e| format!("transfer.output: {e}"))?;

        if self.bulk_size == 0 {
            return Err("transfer.bulk_size must be > 0".to_string());
        }

        if self.flatten && output.is_url() {
            return Err(format!(
                "Cannot flatten to a remote output ({output}); flatten writes a local file"
            ));
        }

        Ok(())
    }

    /// Parsed source address
    pub fn input_address(&self) -> Result<Address, String> {
        Address::new(self.input.clone())
    }

    /// Parsed destination address
    pub fn output_address(&self) -> Result<Address, String> {
        Address::new(self.output.clone())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            bulk_size: default_bulk_size(),
            flatten: false,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for a single `_bulk_docs` request, in seconds.
    /// Not applied to the source download, which may stream for hours.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// TLS certificate verification
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl HttpConfig {
    fn validate(&self) -> Result<(), String> {
        if self.request_timeout_seconds == 0 {
            return Err("http.request_timeout_seconds must be > 0".to_string());
        }
        if self.connect_timeout_seconds == 0 {
            return Err("http.connect_timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// Progress reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Show live progress on the terminal
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Refresh period in milliseconds
    #[serde(default = "default_progress_interval_ms")]
    pub interval_ms: u64,
}

impl ProgressConfig {
    fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("progress.interval_ms must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_progress_interval_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_bulk_size() -> usize {
    5000
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_seconds() -> u64 {
    300
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_progress_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
