use crate::adapters::database::SportsStore;
use crate::core::sync::SyncRecord;
use crate::domain::Result;
use std::sync::Arc;

/// Reads and appends `data_sync_logs` rows
#[derive(Clone)]
pub struct SyncAuditLog {
    store: Arc<dyn SportsStore>,
}

impl SyncAuditLog {
    pub fn new(store: Arc<dyn SportsStore>) -> Self {
        Self { store }
    }

    /// Appends a terminal run record
    pub async fn append(&self, record: &SyncRecord) -> Result<()> {
        if !record.status.is_terminal() {
            tracing::warn!(
                table = %record.table_name,
                status = %record.status,
                "Appending a sync record that has not finished"
            );
        }
        self.store.append_sync_record(record).await
    }

    /// Appends a record; a storage failure is logged, never returned
    ///
    /// Used on the error path, where the original failure must be the one
    /// the caller sees.
    pub async fn append_or_warn(&self, record: &SyncRecord) {
        if let Err(e) = self.append(record).await {
            tracing::warn!(
                table = %record.table_name,
                run_id = %record.run_id,
                error = %e,
                "Failed to write sync audit record"
            );
        }
    }

    /// Newest records first
    pub async fn recent(&self, limit: usize) -> Result<Vec<SyncRecord>> {
        self.store.recent_sync_records(limit).await
    }
}
