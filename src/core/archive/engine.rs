//! Season archival
//!
//! Copies the live rows of one season into the `archive_<table>` tables,
//! stamped with `season_year` and `archived_at`. Live rows are never deleted;
//! the `v_all_<table>` views expose both sides tagged by `data_source`.

use crate::adapters::database::{ArchiveInsert, SportsStore, TableStats, ViewRow};
use crate::core::audit::SyncAuditLog;
use crate::core::sync::{RunCounts, SyncRecord, SyncStatus};
use crate::domain::{Result, SeasonWindow, SyncError, Table};
use crate::log_sync_outcome;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Outcome of archiving one table for one season
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveTally {
    pub table: Table,
    /// Rows copied in this run
    pub archived: u64,
    /// Rows already present in the archive for this season
    pub skipped: u64,
    /// Rows that failed to copy
    pub errors: u64,
    /// Set when the table could not be read at all
    pub failure: Option<String>,
}

impl ArchiveTally {
    fn new(table: Table) -> Self {
        Self {
            table,
            archived: 0,
            skipped: 0,
            errors: 0,
            failure: None,
        }
    }

    pub fn selected(&self) -> u64 {
        self.archived + self.skipped + self.errors
    }

    fn counts(&self) -> RunCounts {
        RunCounts {
            processed: self.selected(),
            created: self.archived,
            updated: 0,
            errors: self.errors,
        }
    }
}

/// Result of [`ArchivalEngine::archive_season`]
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub season_year: i32,
    pub tables: Vec<ArchiveTally>,
    pub duration: Duration,
}

impl ArchiveReport {
    pub fn total_archived(&self) -> u64 {
        self.tables.iter().map(|t| t.archived).sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.tables.iter().map(|t| t.errors).sum()
    }

    /// True when a table failed outright or any row failed to copy
    pub fn has_failures(&self) -> bool {
        self.tables
            .iter()
            .any(|t| t.errors > 0 || t.failure.is_some())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            season_year = self.season_year,
            tables = self.tables.len(),
            archived = self.total_archived(),
            errors = self.total_errors(),
            duration_ms = self.duration.as_millis() as u64,
            "Season archival completed"
        );
    }
}

/// Archive status of one live table and its archive counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivalStatus {
    pub live: TableStats,
    pub archive: TableStats,
}

/// Copy-based season archival
pub struct ArchivalEngine {
    store: Arc<dyn SportsStore>,
    audit: SyncAuditLog,
    tables: Vec<Table>,
}

impl ArchivalEngine {
    /// Engine over the given tables, processed in [`Table::ALL`] order
    pub fn new(store: Arc<dyn SportsStore>, tables: Vec<Table>) -> Self {
        let tables = Table::ALL
            .into_iter()
            .filter(|table| tables.contains(table))
            .collect();
        Self {
            audit: SyncAuditLog::new(Arc::clone(&store)),
            store,
            tables,
        }
    }

    /// Engine over every archivable table
    pub fn for_all_tables(store: Arc<dyn SportsStore>) -> Self {
        Self::new(store, Table::ALL.to_vec())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Copies the season's live rows into the archive tables
    ///
    /// A row that fails to copy is counted and the table carries on. A table
    /// whose rows cannot be selected is reported as failed and the next table
    /// is processed. Rows already archived for the season are left as they are.
    pub async fn archive_season(&self, season_year: i32) -> Result<ArchiveReport> {
        let window = SeasonWindow::for_year(season_year).ok_or_else(|| {
            SyncError::Validation(format!("season year {season_year} is out of range"))
        })?;
        self.store
            .test_connection()
            .await
            .map_err(|e| SyncError::Connectivity(e.to_string()))?;

        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let archived_at = Utc::now();
        let mut tallies = Vec::with_capacity(self.tables.len());

        tracing::info!(
            season_year,
            season = %window.label(),
            start = %window.start,
            end = %window.end,
            "Starting season archival"
        );

        for table in &self.tables {
            let table_started = Instant::now();
            let mut record = SyncRecord::new(table.archive_name()).with_run_id(run_id);
            record.mark_running();

            let tally = self.archive_table(*table, &window, archived_at).await;

            match &tally.failure {
                Some(message) => {
                    let error = SyncError::Archive(message.clone());
                    record.fail(&error, table_started.elapsed());
                }
                None => {
                    record.finish(tally.counts(), table_started.elapsed());
                    if record.status != SyncStatus::Success {
                        record.error_message =
                            Some(format!("{} row(s) failed to archive", tally.errors));
                    }
                }
            }
            self.audit.append_or_warn(&record).await;
            log_sync_outcome!(record);

            tallies.push(tally);
        }

        let report = ArchiveReport {
            season_year,
            tables: tallies,
            duration: started.elapsed(),
        };
        report.log_summary();
        Ok(report)
    }

    async fn archive_table(
        &self,
        table: Table,
        window: &SeasonWindow,
        archived_at: chrono::DateTime<Utc>,
    ) -> ArchiveTally {
        let mut tally = ArchiveTally::new(table);

        let rows = match self.store.season_rows(table, window).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(table = %table, error = %e, "Failed to select season rows");
                tally.failure = Some(e.to_string());
                return tally;
            }
        };

        tracing::debug!(table = %table, rows = rows.len(), "Selected rows for archival");

        for row in &rows {
            match self
                .store
                .insert_archive_row(table, window.season_year, archived_at, row)
                .await
            {
                Ok(ArchiveInsert::Inserted) => tally.archived += 1,
                Ok(ArchiveInsert::AlreadyArchived) => tally.skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        table = %table,
                        key = %row.key,
                        error = %e,
                        "Failed to archive row"
                    );
                    tally.errors += 1;
                }
            }
        }

        tally
    }

    /// Row counts and `created_at` ranges for each live and archive table
    ///
    /// A table that cannot be queried reports zero rows instead of failing
    /// the whole status.
    pub async fn get_archival_status(&self) -> Vec<ArchivalStatus> {
        let mut statuses = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            let live = self.stats_or_empty(table.name()).await;
            let archive = self.stats_or_empty(&table.archive_name()).await;
            statuses.push(ArchivalStatus { live, archive });
        }
        statuses
    }

    async fn stats_or_empty(&self, table_name: &str) -> TableStats {
        match self.store.table_stats(table_name).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(table = %table_name, error = %e, "Failed to read table stats");
                TableStats::empty(table_name)
            }
        }
    }

    /// Rows of `v_all_<table>`, optionally restricted to one archived season
    pub async fn view_rows(&self, table: Table, season_year: Option<i32>) -> Result<Vec<ViewRow>> {
        self.store.view_rows(table, season_year).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::DataSource;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::NaturalKey;
    use serde_json::json;

    async fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let rows = [
            (Table::Teams, NaturalKey::single(1_i64), json!({"id": 1, "abbreviation": "BOS"})),
            (Table::Teams, NaturalKey::single(2_i64), json!({"id": 2, "abbreviation": "LAL"})),
            (Table::Teams, NaturalKey::single(3_i64), json!({"id": 3, "abbreviation": "UTA"})),
            (
                Table::Players,
                NaturalKey::single(10_i64),
                json!({"id": 10, "first_name": "Jaylen", "last_name": "Brown", "current_team_id": 1}),
            ),
            (
                Table::Players,
                NaturalKey::single(11_i64),
                json!({"id": 11, "first_name": "Lauri", "last_name": "Markkanen", "current_team_id": 3}),
            ),
            (
                Table::Games,
                NaturalKey::single(100_i64),
                json!({"id": 100, "game_date": "2024-02-01", "home_team_id": 1, "away_team_id": 2, "season": "2023-24"}),
            ),
            (
                Table::Games,
                NaturalKey::single(200_i64),
                json!({"id": 200, "game_date": "2024-11-01", "home_team_id": 3, "away_team_id": 2, "season": "2024-25"}),
            ),
            (
                Table::PlayerGameLogs,
                NaturalKey::composite([10_i64, 100_i64]),
                json!({"player_id": 10, "game_id": 100, "points": 30}),
            ),
            (
                Table::PlayerGameLogs,
                NaturalKey::composite([11_i64, 200_i64]),
                json!({"player_id": 11, "game_id": 200, "points": 25}),
            ),
        ];
        for (table, key, row) in rows {
            store.upsert_row(table, &key, &row).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_archive_season_copies_without_deleting() {
        let store = seeded().await;
        let engine = ArchivalEngine::for_all_tables(store.clone());

        let report = engine.archive_season(2023).await.unwrap();

        let tally = |table: Table| report.tables.iter().find(|t| t.table == table).unwrap();
        assert_eq!(tally(Table::Games).archived, 1);
        assert_eq!(tally(Table::PlayerGameLogs).archived, 1);
        assert_eq!(tally(Table::Teams).archived, 2);
        assert_eq!(tally(Table::Players).archived, 1);
        assert_eq!(store.row_count(Table::Games), 2);
        assert_eq!(store.archive_count(Table::Games), 1);

        let audit = SyncAuditLog::new(store.clone()).recent(20).await.unwrap();
        assert_eq!(audit.len(), Table::ALL.len());
        assert!(audit.iter().all(|r| r.table_name.starts_with("archive_")));
    }

    #[tokio::test]
    async fn test_rearchiving_skips_existing_rows() {
        let store = seeded().await;
        let engine = ArchivalEngine::new(store.clone(), vec![Table::Games]);

        engine.archive_season(2023).await.unwrap();
        let second = engine.archive_season(2023).await.unwrap();

        assert_eq!(second.tables.len(), 1);
        assert_eq!(second.tables[0].archived, 0);
        assert_eq!(second.tables[0].skipped, 1);
        assert_eq!(store.archive_count(Table::Games), 1);
    }

    #[tokio::test]
    async fn test_row_failure_does_not_stop_the_table() {
        let store = seeded().await;
        store.fail_writes_for(Table::Teams, NaturalKey::single(1_i64));
        let engine = ArchivalEngine::new(store.clone(), vec![Table::Teams]);

        let report = engine.archive_season(2023).await.unwrap();

        assert_eq!(report.tables[0].archived, 1);
        assert_eq!(report.tables[0].errors, 1);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_view_tags_archived_rows() {
        let store = seeded().await;
        let engine = ArchivalEngine::for_all_tables(store.clone());
        engine.archive_season(2023).await.unwrap();

        let rows = engine.view_rows(Table::Games, Some(2023)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].data_source, DataSource::Archived);
        assert_eq!(rows[0].season_year, Some(2023));
        assert_eq!(rows[0].data["id"], 100);

        let all = engine.view_rows(Table::Games, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(
            all.iter()
                .filter(|r| r.data_source == DataSource::Current)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_status_reports_live_and_archive_tables() {
        let store = seeded().await;
        let engine = ArchivalEngine::new(store.clone(), vec![Table::Games, Table::Teams]);
        engine.archive_season(2023).await.unwrap();

        let status = engine.get_archival_status().await;
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].live.table, "teams");
        assert_eq!(status[1].live.total_records, 2);
        assert_eq!(status[1].archive.table, "archive_games");
        assert_eq!(status[1].archive.total_records, 1);
    }

    #[tokio::test]
    async fn test_status_of_unreachable_store_is_zeroed() {
        let store = seeded().await;
        store.set_reachable(false);
        let engine = ArchivalEngine::new(store, vec![Table::Games]);

        let status = engine.get_archival_status().await;
        assert_eq!(status[0].live, TableStats::empty("games"));
        assert_eq!(status[0].archive, TableStats::empty("archive_games"));
    }

    #[tokio::test]
    async fn test_out_of_range_season_is_rejected() {
        let engine = ArchivalEngine::for_all_tables(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            engine.archive_season(i32::MAX).await,
            Err(SyncError::Validation(_))
        ));
    }
}
