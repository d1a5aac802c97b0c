//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable or JSON console output
//! - optional JSON file logging with rotation
//! - helper macros for events the pipeline emits repeatedly
//!
//! # Example
//!
//! ```no_run
//! use courtsync::logging::init_logging;
//! use courtsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "players", "Sync started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a retry attempt of a provider request
///
/// # Example
///
/// ```no_run
/// use courtsync::log_retry_attempt;
///
/// log_retry_attempt!("players.json", 1, 3, 2000_u64, "503 - Service Unavailable");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($endpoint:expr, $attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            endpoint = %$endpoint,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying provider request"
        );
    };
}

/// Log the terminal outcome of a sync or archive run
///
/// # Example
///
/// ```no_run
/// use courtsync::log_sync_outcome;
/// use courtsync::core::sync::SyncRecord;
///
/// let record = SyncRecord::new("players");
/// log_sync_outcome!(&record);
/// ```
#[macro_export]
macro_rules! log_sync_outcome {
    ($record:expr) => {
        tracing::info!(
            table = %$record.table_name,
            run_id = %$record.run_id,
            status = %$record.status,
            processed = $record.records_processed,
            created = $record.records_created,
            updated = $record.records_updated,
            errors = $record.records_errors,
            duration_ms = $record.duration_ms,
            "Sync finished"
        );
    };
}

/// Log a row that was skipped during an upsert batch
#[macro_export]
macro_rules! log_row_failure {
    ($failure:expr) => {
        tracing::warn!(
            table = %$failure.table,
            key = ?$failure.key,
            referential = $failure.referential,
            error = %$failure.message,
            "Row skipped"
        );
    };
}
