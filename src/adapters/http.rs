//! HTTP client construction
//!
//! Two clients are built from the same [`HttpConfig`]: one for bulk writes,
//! bounded by a per-request timeout, and one for source downloads, which only
//! bounds the connection phase because an export body may stream for hours.

use crate::config::HttpConfig;
use crate::domain::{CopyError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

fn base_builder(config: &HttpConfig) -> ClientBuilder {
    let mut builder = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .user_agent(concat!("couchcopy/", env!("CARGO_PKG_VERSION")));

    if !config.tls_verify {
        tracing::warn!("TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
}

/// Client for `_bulk_docs` requests
pub fn bulk_client(config: &HttpConfig) -> Result<Client> {
    base_builder(config)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| CopyError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Client for streaming source downloads
pub fn source_client(config: &HttpConfig) -> Result<Client> {
    base_builder(config)
        .build()
        .map_err(|e| CopyError::Configuration(format!("Failed to build HTTP client: {e}")))
}
