//! Integration tests for logging initialization

use couchcopy::config::LoggingConfig;
use couchcopy::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_file_logging_initializes_once() {
    let dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        local_enabled: true,
        local_path: dir.path().to_string_lossy().to_string(),
        ..Default::default()
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(documents = 3, "Logging integration test");
    drop(guard);

    assert!(dir.path().exists());
}

#[test]
fn test_invalid_level_is_rejected() {
    let result = init_logging("verbose", &LoggingConfig::default());
    assert!(result.is_err());
}
