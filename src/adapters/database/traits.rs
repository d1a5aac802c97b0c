//! Storage abstraction traits
//!
//! Backends work on serialized rows addressed by [`Table`] and [`NaturalKey`].
//! Record types, validation and counting live above this layer in
//! [`crate::core::storage`].

use crate::core::sync::SyncRecord;
use crate::domain::{NaturalKey, Result, SeasonWindow, Table};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// What an upsert did to the target row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// An existing row was left as it was
    Unchanged,
}

/// What an archive insert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveInsert {
    Inserted,
    /// A row for this key and season was archived earlier and is left untouched
    AlreadyArchived,
}

/// A live row selected for archival
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRow {
    pub key: NaturalKey,
    /// Full live row, bookkeeping columns included
    pub data: serde_json::Value,
}

/// Row count and `created_at` range of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStats {
    pub table: String,
    pub total_records: i64,
    pub oldest_record: Option<DateTime<Utc>>,
    pub newest_record: Option<DateTime<Utc>>,
}

impl TableStats {
    pub fn empty(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            total_records: 0,
            oldest_record: None,
            newest_record: None,
        }
    }
}

/// Origin of a row read through a `v_all_*` view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Current,
    Archived,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Current => "current",
            DataSource::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "current" => Some(DataSource::Current),
            "archived" => Some(DataSource::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from a `v_all_*` union view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub data_source: DataSource,
    /// `None` for live rows
    pub season_year: Option<i32>,
    pub data: serde_json::Value,
}

/// Storage backend for the sync and archival pipeline
///
/// Implementations must make `upsert_row` atomic per row and must never
/// delete live rows.
#[async_trait]
pub trait SportsStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn test_connection(&self) -> Result<()>;

    /// Creates tables and views when missing
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts `row` or fully replaces the row with the same key
    async fn upsert_row(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &serde_json::Value,
    ) -> Result<UpsertOutcome>;

    /// Inserts `row` only when no row has the same key; never touches an existing row
    async fn insert_row_if_absent(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &serde_json::Value,
    ) -> Result<UpsertOutcome>;

    async fn row_exists(&self, table: Table, key: &NaturalKey) -> Result<bool>;

    /// Looks up a team by its stored (canonical) abbreviation
    async fn find_team_id_by_abbreviation(&self, abbreviation: &str) -> Result<Option<i64>>;

    /// Appends one row to `data_sync_logs`
    async fn append_sync_record(&self, record: &SyncRecord) -> Result<()>;

    /// Most recent `data_sync_logs` rows, newest first
    async fn recent_sync_records(&self, limit: usize) -> Result<Vec<SyncRecord>>;

    /// Live rows of `table` that belong to the season
    async fn season_rows(&self, table: Table, window: &SeasonWindow) -> Result<Vec<SeasonRow>>;

    /// Copies one live row into `archive_<table>`
    async fn insert_archive_row(
        &self,
        table: Table,
        season_year: i32,
        archived_at: DateTime<Utc>,
        row: &SeasonRow,
    ) -> Result<ArchiveInsert>;

    /// Count and `created_at` range for a live or archive table
    async fn table_stats(&self, table_name: &str) -> Result<TableStats>;

    /// Reads `v_all_<table>`, optionally restricted to one archived season
    async fn view_rows(&self, table: Table, season_year: Option<i32>) -> Result<Vec<ViewRow>>;

    /// Releases backend resources; further calls may fail
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_round_trip() {
        for source in [DataSource::Current, DataSource::Archived] {
            assert_eq!(DataSource::parse(source.as_str()), Some(source));
        }
        assert!(DataSource::parse("live").is_none());
    }

    #[test]
    fn test_empty_stats() {
        let stats = TableStats::empty("archive_games");
        assert_eq!(stats.total_records, 0);
        assert!(stats.oldest_record.is_none());
    }
}
