//! Configuration loader with TOML parsing and environment variable overrides
//!
//! Precedence, lowest to highest: built-in defaults, TOML file, `COUCHCOPY_*`
//! environment variables, command-line flags (applied by the CLI).

use super::schema::CopyConfig;
use crate::domain::errors::CopyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from an optional TOML file
///
/// This function:
/// 1. Reads the TOML file, if one is given
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CopyConfig
/// 4. Applies environment variable overrides (COUCHCOPY_* prefix)
///
/// Validation is left to the caller so command-line flags can be merged first.
///
/// # Errors
///
/// Returns an error if:
/// - A file is given but cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
///
/// # Examples
///
/// ```no_run
/// use couchcopy::config::loader::load_config;
/// use std::path::Path;
///
/// let config = load_config(Some(Path::new("couchcopy.toml"))).expect("Failed to load config");
/// ```
pub fn load_config(path: Option<&Path>) -> Result<CopyConfig> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => CopyConfig::default(),
    };

    apply_env_overrides(&mut config)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<CopyConfig> {
    if !path.exists() {
        return Err(CopyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CopyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: CopyConfig = toml::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CopyError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CopyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using COUCHCOPY_* prefix
///
/// Environment variables follow the pattern: COUCHCOPY_<SECTION>_<KEY>,
/// except for the transfer section whose keys are used bare
/// (COUCHCOPY_INPUT, COUCHCOPY_OUTPUT, COUCHCOPY_BULK_SIZE, COUCHCOPY_FLATTEN).
fn apply_env_overrides(config: &mut CopyConfig) -> Result<()> {
    // Transfer overrides
    if let Ok(val) = std::env::var("COUCHCOPY_INPUT") {
        config.transfer.input = val;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_OUTPUT") {
        config.transfer.output = val;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_BULK_SIZE") {
        config.transfer.bulk_size = parse_env("COUCHCOPY_BULK_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_FLATTEN") {
        config.transfer.flatten = parse_env("COUCHCOPY_FLATTEN", &val)?;
    }

    // HTTP overrides
    if let Ok(val) = std::env::var("COUCHCOPY_HTTP_REQUEST_TIMEOUT_SECONDS") {
        config.http.request_timeout_seconds =
            parse_env("COUCHCOPY_HTTP_REQUEST_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_HTTP_CONNECT_TIMEOUT_SECONDS") {
        config.http.connect_timeout_seconds =
            parse_env("COUCHCOPY_HTTP_CONNECT_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_HTTP_TLS_VERIFY") {
        config.http.tls_verify = parse_env("COUCHCOPY_HTTP_TLS_VERIFY", &val)?;
    }

    // Progress overrides
    if let Ok(val) = std::env::var("COUCHCOPY_PROGRESS_ENABLED") {
        config.progress.enabled = parse_env("COUCHCOPY_PROGRESS_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_PROGRESS_INTERVAL_MS") {
        config.progress.interval_ms = parse_env("COUCHCOPY_PROGRESS_INTERVAL_MS", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("COUCHCOPY_LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("COUCHCOPY_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("COUCHCOPY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CopyError::Configuration(format!("Invalid value for {name}: '{value}'"))
    })
}
