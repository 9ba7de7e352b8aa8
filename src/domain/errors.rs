//! Domain error types
//!
//! This module defines the error hierarchy for couchcopy.
//! Every variant is fatal to a run; the CLI maps each kind to an exit code.
//! Errors don't expose third-party types.

use thiserror::Error;

/// Main couchcopy error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Invalid configuration or flag combination, detected before the pipeline starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source stream could not be opened or read
    #[error("Source error: {0}")]
    Source(String),

    /// The source stream does not have the expected `{"total_rows": N, "rows": [...]}` shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A destination write failed or returned a non-success status
    #[error("Transport error: {}", format_transport(.status, .address, .message))]
    Transport {
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Destination address (credentials redacted)
        address: String,
        /// Response body or underlying cause
        message: String,
    },

    /// Writing to a local destination file failed
    #[error("Destination write error: {0}")]
    DestinationWrite(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

fn format_transport(status: &Option<u16>, address: &str, message: &str) -> String {
    match status {
        Some(status) => format!("{status}, {address}, {message}"),
        None => format!("{address}, {message}"),
    }
}

impl CopyError {
    /// Creates a transport error for a non-success HTTP response
    pub fn transport_status(
        status: u16,
        address: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        CopyError::Transport {
            status: Some(status),
            address: address.into(),
            message: body.into(),
        }
    }

    /// Creates a transport error for a failed connection or request
    pub fn transport(address: impl Into<String>, message: impl Into<String>) -> Self {
        CopyError::Transport {
            status: None,
            address: address.into(),
            message: message.into(),
        }
    }

    /// Short name of the error kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            CopyError::Configuration(_) => "configuration",
            CopyError::Source(_) => "source",
            CopyError::MalformedInput(_) => "malformed_input",
            CopyError::Transport { .. } => "transport",
            CopyError::DestinationWrite(_) => "destination_write",
            CopyError::Serialization(_) => "serialization",
            CopyError::Io(_) => "io",
            CopyError::Other(_) => "other",
        }
    }

    /// Process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            CopyError::Configuration(_) => 2,
            CopyError::Source(_) | CopyError::MalformedInput(_) => 3,
            CopyError::Transport { .. } => 4,
            _ => 5,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CopyError {
    fn from(err: std::io::Error) -> Self {
        CopyError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CopyError {
    fn from(err: serde_json::Error) -> Self {
        CopyError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CopyError {
    fn from(err: toml::de::Error) -> Self {
        CopyError::Configuration(format!("TOML parse error: {err}"))
    }
}
