//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for couchcopy using clap.

pub mod commands;
pub mod progress;

use crate::config::{load_config, CopyConfig};
use crate::domain::Result;
use clap::{CommandFactory, Parser};
use std::path::Path;

/// couchcopy - Stream documents between CouchDB databases and files
#[derive(Parser, Debug)]
#[command(name = "couchcopy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "COUCHCOPY_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "COUCHCOPY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Transfer arguments
    #[command(flatten)]
    pub copy: commands::copy::CopyArgs,
}

impl Cli {
    /// Build the run configuration: defaults, then the file, then
    /// `COUCHCOPY_*` variables, then flags
    pub fn resolve_config(&self) -> Result<CopyConfig> {
        let mut config = load_config(self.config.as_deref().map(Path::new))?;
        self.copy.apply(&mut config);
        Ok(config)
    }

    /// Print usage to stderr
    pub fn print_usage() {
        let _ = Self::command().write_help(&mut std::io::stderr());
    }
}
