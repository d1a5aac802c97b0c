//! PostgreSQL row models
//!
//! Column-level mapping for `data_sync_logs`. Entity tables are read and
//! written as JSONB and need no dedicated models.

use crate::core::sync::{SyncRecord, SyncStatus};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

/// One `data_sync_logs` row as stored
#[derive(Debug, Clone)]
pub struct PostgreSQLSyncLog {
    pub run_id: Uuid,
    pub table_name: String,
    pub sync_timestamp: DateTime<Utc>,
    pub records_processed: i64,
    pub records_created: i64,
    pub records_updated: i64,
    pub records_errors: i64,
    pub duration_ms: i64,
    pub status: String,
    pub error_message: Option<String>,
}

impl PostgreSQLSyncLog {
    pub fn from_domain(record: &SyncRecord) -> Self {
        Self {
            run_id: record.run_id,
            table_name: record.table_name.clone(),
            sync_timestamp: record.sync_timestamp,
            records_processed: record.records_processed as i64,
            records_created: record.records_created as i64,
            records_updated: record.records_updated as i64,
            records_errors: record.records_errors as i64,
            duration_ms: record.duration_ms as i64,
            status: record.status.as_str().to_string(),
            error_message: record.error_message.clone(),
        }
    }

    pub fn from_row(row: &Row) -> Self {
        Self {
            run_id: row.get("run_id"),
            table_name: row.get("table_name"),
            sync_timestamp: row.get("sync_timestamp"),
            records_processed: row.get("records_processed"),
            records_created: row.get("records_created"),
            records_updated: row.get("records_updated"),
            records_errors: row.get("records_errors"),
            duration_ms: row.get("duration_ms"),
            status: row.get("status"),
            error_message: row.get("error_message"),
        }
    }

    /// Unknown status strings read back as `FAILED`
    pub fn to_domain(&self) -> SyncRecord {
        SyncRecord {
            run_id: self.run_id,
            table_name: self.table_name.clone(),
            sync_timestamp: self.sync_timestamp,
            records_processed: self.records_processed.max(0) as u64,
            records_created: self.records_created.max(0) as u64,
            records_updated: self.records_updated.max(0) as u64,
            records_errors: self.records_errors.max(0) as u64,
            duration_ms: self.duration_ms.max(0) as u64,
            status: SyncStatus::parse(&self.status).unwrap_or(SyncStatus::Failed),
            error_message: self.error_message.clone(),
        }
    }
}
