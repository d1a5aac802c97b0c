//! Integration tests for logging setup
//!
//! The global subscriber can only be installed once per process, so this
//! file holds a single initializing test.

use courtsync::config::LoggingConfig;
use courtsync::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert!(!config.console_json);
}

#[test]
fn test_file_logging_creates_directory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        console_json: false,
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(table = "players", "Sync started");
    drop(guard);

    assert!(log_path.exists());
    let files: Vec<_> = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();
    assert!(files
        .iter()
        .any(|f| f.file_name().to_string_lossy().starts_with("courtsync.log")));
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let err = init_logging("verbose", &LoggingConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}
