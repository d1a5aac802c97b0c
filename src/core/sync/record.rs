//! Sync run records
//!
//! A [`SyncRecord`] tracks one entity-type run from `PENDING` through
//! `RUNNING` to a terminal status and is appended to `data_sync_logs`
//! whatever the outcome.

use crate::domain::SyncError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Sync run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    Pending,
    Running,
    Success,
    Partial,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "PENDING",
            SyncStatus::Running => "RUNNING",
            SyncStatus::Success => "SUCCESS",
            SyncStatus::Partial => "PARTIAL",
            SyncStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(SyncStatus::Pending),
            "RUNNING" => Some(SyncStatus::Running),
            "SUCCESS" => Some(SyncStatus::Success),
            "PARTIAL" => Some(SyncStatus::Partial),
            "FAILED" => Some(SyncStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncStatus::Success | SyncStatus::Partial | SyncStatus::Failed
        )
    }

    /// Outcome of a run that processed `total` records with `errors` failures
    pub fn classify(total: u64, errors: u64) -> Self {
        if errors == 0 {
            SyncStatus::Success
        } else if errors < total {
            SyncStatus::Partial
        } else {
            SyncStatus::Failed
        }
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-table counts a finished run reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub errors: u64,
}

/// One row of the `data_sync_logs` audit trail
///
/// # Examples
///
/// ```
/// use courtsync::core::sync::{RunCounts, SyncRecord, SyncStatus};
/// use std::time::Duration;
///
/// let mut record = SyncRecord::new("players");
/// record.mark_running();
/// record.finish(
///     RunCounts { processed: 10, created: 4, updated: 5, errors: 1 },
///     Duration::from_millis(850),
/// );
///
/// assert_eq!(record.status, SyncStatus::Partial);
/// assert_eq!(record.duration_ms, 850);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub run_id: Uuid,
    pub table_name: String,
    pub sync_timestamp: DateTime<Utc>,
    pub records_processed: u64,
    pub records_created: u64,
    pub records_updated: u64,
    pub records_errors: u64,
    pub duration_ms: u64,
    pub status: SyncStatus,
    pub error_message: Option<String>,
}

impl SyncRecord {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            table_name: table_name.into(),
            sync_timestamp: Utc::now(),
            records_processed: 0,
            records_created: 0,
            records_updated: 0,
            records_errors: 0,
            duration_ms: 0,
            status: SyncStatus::Pending,
            error_message: None,
        }
    }

    /// Shares a run id across the records of one composite run
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// `PENDING -> RUNNING`; stamps the start time
    pub fn mark_running(&mut self) {
        if self.status != SyncStatus::Pending {
            tracing::warn!(table = %self.table_name, status = %self.status, "Sync run started twice");
            return;
        }
        self.sync_timestamp = Utc::now();
        self.status = SyncStatus::Running;
    }

    /// `RUNNING -> SUCCESS | PARTIAL | FAILED` from the run's counts
    pub fn finish(&mut self, counts: RunCounts, duration: Duration) {
        if self.status.is_terminal() {
            tracing::warn!(table = %self.table_name, status = %self.status, "Sync run already finished");
            return;
        }
        self.records_processed = counts.processed;
        self.records_created = counts.created;
        self.records_updated = counts.updated;
        self.records_errors = counts.errors;
        self.duration_ms = duration.as_millis() as u64;
        self.status = SyncStatus::classify(counts.processed, counts.errors);
    }

    /// `RUNNING -> FAILED` after a hard failure; counts are zeroed
    pub fn fail(&mut self, error: &SyncError, duration: Duration) {
        if self.status.is_terminal() {
            tracing::warn!(table = %self.table_name, status = %self.status, "Sync run already finished");
            return;
        }
        self.records_processed = 0;
        self.records_created = 0;
        self.records_updated = 0;
        self.records_errors = 0;
        self.duration_ms = duration.as_millis() as u64;
        self.status = SyncStatus::Failed;
        self.error_message = Some(format!("[{}] {}", error.kind(), error));
    }

    pub fn is_successful(&self) -> bool {
        self.status == SyncStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10, 0, SyncStatus::Success ; "no errors")]
    #[test_case(0, 0, SyncStatus::Success ; "empty batch")]
    #[test_case(10, 1, SyncStatus::Partial ; "one error")]
    #[test_case(10, 9, SyncStatus::Partial ; "one survivor")]
    #[test_case(10, 10, SyncStatus::Failed ; "all errors")]
    fn test_classify(total: u64, errors: u64, expected: SyncStatus) {
        assert_eq!(SyncStatus::classify(total, errors), expected);
    }

    #[test]
    fn test_lifecycle_success() {
        let mut record = SyncRecord::new("games");
        assert_eq!(record.status, SyncStatus::Pending);

        record.mark_running();
        assert_eq!(record.status, SyncStatus::Running);

        record.finish(
            RunCounts {
                processed: 3,
                created: 3,
                updated: 0,
                errors: 0,
            },
            Duration::from_millis(12),
        );
        assert!(record.is_successful());
        assert_eq!(record.records_created, 3);
    }

    #[test]
    fn test_hard_failure_zeroes_counts() {
        let mut record = SyncRecord::new("injuries");
        record.mark_running();
        record.fail(
            &SyncError::Validation("players missing".to_string()),
            Duration::from_millis(5),
        );

        assert_eq!(record.status, SyncStatus::Failed);
        assert_eq!(record.records_processed, 0);
        assert!(record
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("[validation]"));
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let mut record = SyncRecord::new("players");
        record.mark_running();
        record.fail(&SyncError::Connectivity("down".into()), Duration::ZERO);
        record.finish(
            RunCounts {
                processed: 1,
                created: 1,
                updated: 0,
                errors: 0,
            },
            Duration::ZERO,
        );
        assert_eq!(record.status, SyncStatus::Failed);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            SyncStatus::Pending,
            SyncStatus::Running,
            SyncStatus::Success,
            SyncStatus::Partial,
            SyncStatus::Failed,
        ] {
            assert_eq!(SyncStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_string(&SyncStatus::Partial).unwrap(),
            "\"PARTIAL\""
        );
    }
}
