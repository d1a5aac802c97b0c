//! Composite sync reporting

use super::record::{SyncRecord, SyncStatus};
use crate::domain::SyncError;
use std::time::Duration;
use uuid::Uuid;

/// One entity-type run inside a composite sync
#[derive(Debug, Clone)]
pub enum EntityOutcome {
    /// The run reached a terminal status and its counts are known
    Completed(SyncRecord),
    /// The run threw before it could be counted
    Failed {
        table: String,
        kind: &'static str,
        message: String,
    },
}

impl EntityOutcome {
    pub fn failed(table: impl Into<String>, error: &SyncError) -> Self {
        EntityOutcome::Failed {
            table: table.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        match self {
            EntityOutcome::Completed(record) => &record.table_name,
            EntityOutcome::Failed { table, .. } => table,
        }
    }

    pub fn status(&self) -> SyncStatus {
        match self {
            EntityOutcome::Completed(record) => record.status,
            EntityOutcome::Failed { .. } => SyncStatus::Failed,
        }
    }
}

/// Result of `sync_all`, `sync_today` or a date-range sync
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Run id shared by every audit record of this composite run
    pub run_id: Uuid,
    pub outcomes: Vec<EntityOutcome>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn push(&mut self, outcome: EntityOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn records(&self) -> impl Iterator<Item = &SyncRecord> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            EntityOutcome::Completed(record) => Some(record),
            EntityOutcome::Failed { .. } => None,
        })
    }

    pub fn total_created(&self) -> u64 {
        self.records().map(|r| r.records_created).sum()
    }

    pub fn total_updated(&self) -> u64 {
        self.records().map(|r| r.records_updated).sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.records().map(|r| r.records_errors).sum()
    }

    /// First failure kind, if any entity threw
    pub fn first_failure_kind(&self) -> Option<&'static str> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            EntityOutcome::Failed { kind, .. } => Some(*kind),
            EntityOutcome::Completed(_) => None,
        })
    }

    /// Overall status across entities
    ///
    /// `SUCCESS` only when every entity succeeded, `FAILED` when none
    /// produced a usable row, `PARTIAL` otherwise.
    pub fn status(&self) -> SyncStatus {
        if self.outcomes.is_empty() {
            return SyncStatus::Success;
        }
        let statuses: Vec<SyncStatus> = self.outcomes.iter().map(EntityOutcome::status).collect();
        if statuses.iter().all(|s| *s == SyncStatus::Success) {
            SyncStatus::Success
        } else if statuses.iter().all(|s| *s == SyncStatus::Failed) {
            SyncStatus::Failed
        } else {
            SyncStatus::Partial
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            status = %self.status(),
            entities = self.outcomes.len(),
            created = self.total_created(),
            updated = self.total_updated(),
            errors = self.total_errors(),
            duration_ms = self.duration.as_millis() as u64,
            "Sync run completed"
        );

        for outcome in &self.outcomes {
            if let EntityOutcome::Failed {
                table,
                kind,
                message,
            } = outcome
            {
                tracing::warn!(table = %table, kind = %kind, error = %message, "Entity sync failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::RunCounts;

    fn completed(table: &str, processed: u64, errors: u64) -> EntityOutcome {
        let mut record = SyncRecord::new(table);
        record.mark_running();
        record.finish(
            RunCounts {
                processed,
                created: processed - errors,
                updated: 0,
                errors,
            },
            Duration::from_millis(5),
        );
        EntityOutcome::Completed(record)
    }

    #[test]
    fn test_empty_report_is_successful() {
        assert_eq!(SyncReport::new(Uuid::new_v4()).status(), SyncStatus::Success);
    }

    #[test]
    fn test_mixed_outcomes_are_partial() {
        let mut report = SyncReport::new(Uuid::new_v4());
        report.push(completed("players", 10, 0));
        report.push(EntityOutcome::failed(
            "games",
            &SyncError::Validation("games array missing".to_string()),
        ));

        assert_eq!(report.status(), SyncStatus::Partial);
        assert_eq!(report.total_created(), 10);
        assert_eq!(report.first_failure_kind(), Some("validation"));
    }

    #[test]
    fn test_all_failed() {
        let mut report = SyncReport::new(Uuid::new_v4());
        report.push(completed("players", 3, 3));
        report.push(EntityOutcome::failed(
            "games",
            &SyncError::Connectivity("refused".to_string()),
        ));
        assert_eq!(report.status(), SyncStatus::Failed);
        assert_eq!(report.total_errors(), 3);
    }
}
