//! Sync orchestrator - sequences fetch, transform and store per entity type
//!
//! Each entity-type run is timed, classified and written to the audit trail
//! whatever its outcome. Hard failures (transport, validation, connectivity)
//! are re-thrown after the audit record is written so composite runs can
//! decide whether to continue.

use super::record::{SyncRecord, SyncStatus};
use super::report::{EntityOutcome, SyncReport};
use crate::adapters::database::SportsStore;
use crate::adapters::provider::{QueryParams, RateLimitedApiClient};
use crate::config::{SyncConfig, SyncEntity};
use crate::core::audit::SyncAuditLog;
use crate::core::storage::{UpsertStorageEngine, UpsertTally};
use crate::core::transform::{
    transform_daily_dfs, transform_dfs_projections, transform_game_logs, transform_games,
    transform_injuries, transform_lineup, transform_players, Transformed,
};
use crate::domain::{Result, StoredRecord, SyncError, Table, Team};
use crate::log_sync_outcome;
use chrono::{NaiveDate, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Entities of the daily pipeline run by [`SyncOrchestrator::sync_today`], in order
pub const DAY_PIPELINE: [SyncEntity; 5] = [
    SyncEntity::Games,
    SyncEntity::GameLogs,
    SyncEntity::Injuries,
    SyncEntity::DfsProjections,
    SyncEntity::DailyDfs,
];

/// Sync orchestrator
///
/// Runs are strictly sequential: every entity type is fetched, transformed and
/// stored before the next one starts, so parents land before their children.
///
/// # Example
///
/// ```no_run
/// use courtsync::adapters::database::create_store;
/// use courtsync::adapters::provider::RateLimitedApiClient;
/// use courtsync::config::load_config;
/// use courtsync::core::sync::SyncOrchestrator;
/// use std::sync::Arc;
///
/// # async fn example() -> courtsync::domain::Result<()> {
/// let config = load_config("courtsync.toml")?;
/// let client = Arc::new(RateLimitedApiClient::new(&config.provider)?);
/// let store = create_store(&config)?;
///
/// let orchestrator = SyncOrchestrator::new(client, store, config.sync.clone());
/// let record = orchestrator.sync_players().await?;
/// println!("{} players created", record.records_created);
/// # Ok(())
/// # }
/// ```
pub struct SyncOrchestrator {
    client: Arc<RateLimitedApiClient>,
    engine: UpsertStorageEngine,
    audit: SyncAuditLog,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        client: Arc<RateLimitedApiClient>,
        store: Arc<dyn SportsStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            client,
            engine: UpsertStorageEngine::new(Arc::clone(&store)),
            audit: SyncAuditLog::new(store),
            config,
        }
    }

    pub fn engine(&self) -> &UpsertStorageEngine {
        &self.engine
    }

    pub fn audit(&self) -> &SyncAuditLog {
        &self.audit
    }

    pub async fn sync_players(&self) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::Players, Utc::now().date_naive(), Uuid::new_v4())
            .await
    }

    pub async fn sync_games(&self, date: NaiveDate) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::Games, date, Uuid::new_v4()).await
    }

    pub async fn sync_game_logs(&self, date: NaiveDate) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::GameLogs, date, Uuid::new_v4())
            .await
    }

    pub async fn sync_injuries(&self) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::Injuries, Utc::now().date_naive(), Uuid::new_v4())
            .await
    }

    pub async fn sync_dfs_projections(&self, date: NaiveDate) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::DfsProjections, date, Uuid::new_v4())
            .await
    }

    pub async fn sync_daily_dfs(&self, date: NaiveDate) -> Result<SyncRecord> {
        self.run_entity(SyncEntity::DailyDfs, date, Uuid::new_v4())
            .await
    }

    /// Expected and actual lineups of one game
    pub async fn sync_lineup(&self, game_id: i64) -> Result<SyncRecord> {
        let params = QueryParams::new();
        self.sync_entity(
            Uuid::new_v4(),
            self.client.fetch_lineup(game_id, &params),
            transform_lineup,
        )
        .await
    }

    /// Games for every day of `start..=end`, pausing between days
    pub async fn sync_games_range(&self, start: NaiveDate, end: NaiveDate) -> Result<SyncReport> {
        if start > end {
            return Err(SyncError::Validation(format!(
                "date range start {start} is after end {end}"
            )));
        }

        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut report = SyncReport::new(run_id);
        let delay = self.client.inter_page_delay();

        for (index, date) in start.iter_days().take_while(|d| *d <= end).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.run_entity(SyncEntity::Games, date, run_id).await {
                Ok(record) => report.push(EntityOutcome::Completed(record)),
                Err(e) => {
                    report.push(EntityOutcome::failed(Table::Games.name(), &e));
                    if !self.config.continue_on_error {
                        break;
                    }
                }
            }
        }

        let report = report.with_duration(started.elapsed());
        report.log_summary();
        Ok(report)
    }

    /// Runs the configured entity sequence for `date`
    ///
    /// Failures are captured in the report. With `continue_on_error` off the
    /// sequence stops at the first failure.
    pub async fn sync_all(&self, date: NaiveDate) -> SyncReport {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut report = SyncReport::new(run_id);

        tracing::info!(
            run_id = %run_id,
            date = %date,
            entities = ?self.config.entities,
            "Starting sync run"
        );

        for entity in &self.config.entities {
            match self.run_entity(*entity, date, run_id).await {
                Ok(record) => report.push(EntityOutcome::Completed(record)),
                Err(e) => {
                    report.push(EntityOutcome::failed(entity.table().name(), &e));
                    if !self.config.continue_on_error {
                        tracing::warn!(entity = ?entity, "Stopping sync run after failure");
                        break;
                    }
                }
            }
        }

        let report = report.with_duration(started.elapsed());
        report.log_summary();
        report
    }

    /// Daily pipeline for today's UTC date
    pub async fn sync_today(&self) -> Result<SyncReport> {
        self.sync_day(Utc::now().date_naive()).await
    }

    /// Daily pipeline for `date`
    ///
    /// Every step is attempted even when an earlier one fails; the first
    /// failure is returned once all steps have been logged.
    pub async fn sync_day(&self, date: NaiveDate) -> Result<SyncReport> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut report = SyncReport::new(run_id);
        let mut first_error: Option<SyncError> = None;

        for entity in DAY_PIPELINE {
            match self.run_entity(entity, date, run_id).await {
                Ok(record) => report.push(EntityOutcome::Completed(record)),
                Err(e) => {
                    report.push(EntityOutcome::failed(entity.table().name(), &e));
                    first_error.get_or_insert(e);
                }
            }
        }

        let report = report.with_duration(started.elapsed());
        report.log_summary();
        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    async fn run_entity(
        &self,
        entity: SyncEntity,
        date: NaiveDate,
        run_id: Uuid,
    ) -> Result<SyncRecord> {
        let params = QueryParams::new();
        let client = &self.client;
        match entity {
            SyncEntity::Players => {
                self.sync_entity(run_id, client.fetch_all_players(&params), transform_players)
                    .await
            }
            SyncEntity::Games => {
                self.sync_entity(run_id, client.fetch_games(date, &params), transform_games)
                    .await
            }
            SyncEntity::GameLogs => {
                self.sync_entity(
                    run_id,
                    client.fetch_game_logs(date, &params),
                    transform_game_logs,
                )
                .await
            }
            SyncEntity::Injuries => {
                self.sync_entity(run_id, client.fetch_injuries(&params), transform_injuries)
                    .await
            }
            SyncEntity::DfsProjections => {
                self.sync_entity(
                    run_id,
                    client.fetch_dfs_projections(date, &params),
                    transform_dfs_projections,
                )
                .await
            }
            SyncEntity::DailyDfs => {
                self.sync_entity(
                    run_id,
                    client.fetch_daily_dfs(date, &params),
                    transform_daily_dfs,
                )
                .await
            }
        }
    }

    /// Fetch, transform and store one entity type
    ///
    /// Writes a [`SyncRecord`] for the run in every case. Rejected transform
    /// entries and failed rows are counted as errors; a fetch, validation or
    /// connectivity failure marks the run `FAILED` and is returned.
    pub async fn sync_entity<P, T, Fut, F>(
        &self,
        run_id: Uuid,
        fetch: Fut,
        transform: F,
    ) -> Result<SyncRecord>
    where
        T: StoredRecord,
        Fut: Future<Output = Result<P>>,
        F: FnOnce(&P) -> Transformed<T>,
    {
        let table = T::TABLE;
        let started = Instant::now();
        let mut record = SyncRecord::new(table.name()).with_run_id(run_id);
        record.mark_running();

        tracing::info!(table = %table, run_id = %run_id, "Sync started");

        let result = async move {
            let payload = fetch.await?;
            let transformed = transform(&payload);
            Ok::<_, SyncError>(self.store(run_id, transformed).await)
        }
        .await;

        match result {
            Ok(tally) => {
                record.finish(tally.counts(), started.elapsed());
                let connectivity = tally.connectivity_failure();
                if let Some(e) = &connectivity {
                    record.error_message = Some(format!("[{}] {}", e.kind(), e));
                } else if let Some(first) = tally.failures.first() {
                    record.error_message = Some(format!(
                        "{} row(s) failed, first: {}",
                        tally.errors, first.message
                    ));
                }
                self.audit.append_or_warn(&record).await;
                log_sync_outcome!(record);
                match connectivity {
                    Some(e) => Err(e),
                    None => Ok(record),
                }
            }
            Err(e) => {
                record.fail(&e, started.elapsed());
                tracing::error!(
                    table = %table,
                    run_id = %run_id,
                    kind = e.kind(),
                    error = %e,
                    "Sync failed"
                );
                self.audit.append_or_warn(&record).await;
                log_sync_outcome!(record);
                Err(e)
            }
        }
    }

    /// Teams first, then the entities; rejected entries join the entity tally
    async fn store<T: StoredRecord>(&self, run_id: Uuid, transformed: Transformed<T>) -> UpsertTally {
        let Transformed {
            entities,
            teams,
            team_stubs,
            rejected,
            ..
        } = transformed;

        if !teams.is_empty() || !team_stubs.is_empty() {
            self.store_teams(run_id, teams, team_stubs).await;
        }

        let mut tally = self.engine.upsert(entities).await;
        for failure in rejected {
            crate::log_row_failure!(failure);
            tally.processed += 1;
            tally.record_failure(failure);
        }
        tally
    }

    /// Writes discovered teams under their own audit record
    ///
    /// Referenced teams are upserted; stubs only fill in teams not stored yet.
    async fn store_teams(&self, run_id: Uuid, teams: Vec<Team>, stubs: Vec<Team>) {
        let started = Instant::now();
        let mut record = SyncRecord::new(Table::Teams.name()).with_run_id(run_id);
        record.mark_running();

        let mut tally = self.engine.upsert(teams).await;
        tally.merge(self.engine.insert_missing(stubs).await);
        record.finish(tally.counts(), started.elapsed());
        if record.status != SyncStatus::Success {
            record.error_message = tally.failures.first().map(|f| f.message.clone());
        }

        self.audit.append_or_warn(&record).await;
        log_sync_outcome!(record);
    }
}
