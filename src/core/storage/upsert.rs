//! Upsert storage engine
//!
//! Writes normalized record batches one row at a time, in input order, and
//! keeps a created/updated/errors tally. A failing row is logged and counted;
//! it never aborts the rest of the batch.

use crate::adapters::database::{SportsStore, UpsertOutcome};
use crate::core::sync::RunCounts;
use crate::domain::teams::normalize_abbreviation;
use crate::domain::{ParentRef, Result, RowFailure, StoredRecord, SyncError};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of one upsert batch
#[derive(Debug, Clone, Default)]
pub struct UpsertTally {
    /// Records handed to the engine
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub errors: u64,
    /// One entry per failed record, or a single entry when pre-flight failed
    pub failures: Vec<RowFailure>,
    /// Set when storage was unreachable and no row was attempted
    pub connectivity_error: Option<String>,
}

impl UpsertTally {
    pub fn succeeded(&self) -> u64 {
        self.created + self.updated
    }

    pub fn record_outcome(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => {}
        }
    }

    pub fn record_failure(&mut self, failure: RowFailure) {
        self.errors += 1;
        self.failures.push(failure);
    }

    /// Folds another batch into this one
    pub fn merge(&mut self, other: UpsertTally) {
        self.processed += other.processed;
        self.created += other.created;
        self.updated += other.updated;
        self.errors += other.errors;
        self.failures.extend(other.failures);
        if self.connectivity_error.is_none() {
            self.connectivity_error = other.connectivity_error;
        }
    }

    /// The pre-flight failure as an error, when the batch never started
    pub fn connectivity_failure(&self) -> Option<SyncError> {
        self.connectivity_error
            .as_ref()
            .map(|message| SyncError::Connectivity(message.clone()))
    }

    pub fn counts(&self) -> RunCounts {
        RunCounts {
            processed: self.processed,
            created: self.created,
            updated: self.updated,
            errors: self.errors,
        }
    }
}

/// Per-record upsert with pre-flight and referential guard
///
/// Rows are written strictly sequentially so the tally is deterministic.
#[derive(Clone)]
pub struct UpsertStorageEngine {
    store: Arc<dyn SportsStore>,
}

/// How a batch writes its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    /// Insert or fully replace
    Upsert,
    /// Insert only; existing rows stay untouched
    InsertIfAbsent,
}

/// Lookups remembered for the duration of one batch
#[derive(Default)]
struct BatchCache {
    parents: HashMap<ParentRef, bool>,
    teams: HashMap<String, Option<i64>>,
}

impl UpsertStorageEngine {
    pub fn new(store: Arc<dyn SportsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SportsStore> {
        &self.store
    }

    /// Upserts a batch of records of one table
    ///
    /// Pre-flight checks connectivity first; when storage is unreachable every
    /// record is counted as an error and none is attempted.
    pub async fn upsert<T: StoredRecord>(&self, records: Vec<T>) -> UpsertTally {
        self.write_batch(records, WriteMode::Upsert).await
    }

    /// Inserts the records whose key is not stored yet and leaves the rest alone
    ///
    /// Used for partial records (a team known only by id and abbreviation)
    /// that must not overwrite richer rows written earlier. Same pre-flight
    /// and referential guard as [`UpsertStorageEngine::upsert`].
    pub async fn insert_missing<T: StoredRecord>(&self, records: Vec<T>) -> UpsertTally {
        self.write_batch(records, WriteMode::InsertIfAbsent).await
    }

    async fn write_batch<T: StoredRecord>(&self, records: Vec<T>, mode: WriteMode) -> UpsertTally {
        let table = T::TABLE;
        let mut tally = UpsertTally {
            processed: records.len() as u64,
            ..UpsertTally::default()
        };

        if records.is_empty() {
            tracing::debug!(table = %table, "Empty batch, nothing to upsert");
            return tally;
        }

        if let Err(e) = self.store.test_connection().await {
            tracing::error!(
                table = %table,
                batch_size = records.len(),
                error = %e,
                "Storage unreachable, skipping batch"
            );
            tally.errors = tally.processed;
            tally.connectivity_error = Some(e.to_string());
            tally
                .failures
                .push(RowFailure::new(table.name(), format!("pre-flight failed: {e}")));
            return tally;
        }

        let mut cache = BatchCache::default();
        for record in records {
            match self.write_one(record, mode, &mut cache).await {
                Ok(outcome) => tally.record_outcome(outcome),
                Err(failure) => {
                    crate::log_row_failure!(failure);
                    tally.record_failure(failure);
                }
            }
        }

        tracing::info!(
            table = %table,
            processed = tally.processed,
            created = tally.created,
            updated = tally.updated,
            errors = tally.errors,
            mode = ?mode,
            "Upsert batch complete"
        );

        tally
    }

    async fn write_one<T: StoredRecord>(
        &self,
        mut record: T,
        mode: WriteMode,
        cache: &mut BatchCache,
    ) -> std::result::Result<UpsertOutcome, RowFailure> {
        let table = T::TABLE;

        let key = record.natural_key();
        if !key.is_valid() {
            return Err(RowFailure::new(
                table.name(),
                format!("record has no valid natural key ({key})"),
            ));
        }

        if let Some(abbreviation) = record.unresolved_team().map(str::to_string) {
            match self.resolve_cached(&abbreviation, cache).await {
                Ok(Some(team_id)) => record.resolve_team(team_id),
                Ok(None) => {
                    tracing::debug!(table = %table, abbreviation = %abbreviation, "Team abbreviation not found");
                }
                Err(e) => {
                    return Err(RowFailure::new(table.name(), e.to_string()).with_key(key.to_string()))
                }
            }
        }

        for parent in record.parents() {
            let exists = match cache.parents.get(&parent) {
                Some(exists) => *exists,
                None => {
                    let exists = self
                        .store
                        .row_exists(parent.table, &parent.key)
                        .await
                        .map_err(|e| {
                            RowFailure::new(table.name(), e.to_string()).with_key(key.to_string())
                        })?;
                    cache.parents.insert(parent.clone(), exists);
                    exists
                }
            };
            if !exists {
                return Err(RowFailure::new(
                    table.name(),
                    format!("{} {} does not exist", parent.table, parent.key),
                )
                .with_key(key.to_string())
                .referential());
            }
        }

        let row = serde_json::to_value(&record).map_err(|e| {
            RowFailure::new(table.name(), format!("serialization failed: {e}"))
                .with_key(key.to_string())
        })?;

        let written = match mode {
            WriteMode::Upsert => self.store.upsert_row(table, &key, &row).await,
            WriteMode::InsertIfAbsent => self.store.insert_row_if_absent(table, &key, &row).await,
        };
        written.map_err(|e| RowFailure::new(table.name(), e.to_string()).with_key(key.to_string()))
    }

    /// Resolves a provider team abbreviation (aliases included) to a stored team id
    pub async fn resolve_team_id(&self, abbreviation: &str) -> Result<Option<i64>> {
        let canonical = normalize_abbreviation(abbreviation);
        if canonical.is_empty() {
            return Ok(None);
        }
        self.store.find_team_id_by_abbreviation(&canonical).await
    }

    async fn resolve_cached(
        &self,
        abbreviation: &str,
        cache: &mut BatchCache,
    ) -> Result<Option<i64>> {
        let canonical = normalize_abbreviation(abbreviation);
        if let Some(team_id) = cache.teams.get(&canonical) {
            return Ok(*team_id);
        }
        let team_id = self.resolve_team_id(&canonical).await?;
        cache.teams.insert(canonical, team_id);
        Ok(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::{Game, GameLog, NaturalKey, Player, Table, Team};

    fn team(id: i64, abbreviation: &str) -> Team {
        Team {
            id,
            abbreviation: abbreviation.to_string(),
            city: None,
            name: None,
            conference: None,
            division: None,
        }
    }

    fn game(id: Option<i64>) -> Game {
        Game {
            id,
            game_date: None,
            start_time: None,
            home_team_id: Some(1),
            away_team_id: Some(2),
            home_score: None,
            away_score: None,
            status: None,
            season: "2024-25".to_string(),
            venue_id: None,
            venue_name: None,
        }
    }

    fn player(id: i64, team_abbreviation: Option<&str>) -> Player {
        Player {
            id,
            first_name: "Test".to_string(),
            last_name: format!("Player{id}"),
            position: None,
            jersey_number: None,
            current_team_id: None,
            roster_status: None,
            height: None,
            weight: None,
            birth_date: None,
            birth_city: None,
            birth_country: None,
            rookie: None,
            external_mappings: vec![],
            team_abbreviation: team_abbreviation.map(str::to_string),
        }
    }

    async fn engine_with_teams() -> (UpsertStorageEngine, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = UpsertStorageEngine::new(store.clone());
        engine
            .upsert(vec![team(1, "OKC"), team(2, "BKN")])
            .await;
        (engine, store)
    }

    #[tokio::test]
    async fn test_insert_missing_leaves_stored_teams_alone() {
        let (engine, store) = engine_with_teams().await;
        let mut thunder = team(1, "OKC");
        thunder.city = Some("Oklahoma City".to_string());
        engine.upsert(vec![thunder]).await;

        let tally = engine
            .insert_missing(vec![team(1, "OKC"), team(3, "LAL")])
            .await;

        assert_eq!(tally.processed, 2);
        assert_eq!(tally.created, 1);
        assert_eq!(tally.updated, 0);
        assert_eq!(tally.errors, 0);
        let row = store.get_row(Table::Teams, &NaturalKey::single(1_i64)).unwrap();
        assert_eq!(row["city"], "Oklahoma City");
        assert_eq!(store.row_count(Table::Teams), 3);
    }

    #[tokio::test]
    async fn test_second_run_updates() {
        let (engine, _store) = engine_with_teams().await;

        let first = engine.upsert(vec![game(Some(10)), game(Some(11))]).await;
        assert_eq!((first.created, first.updated, first.errors), (2, 0, 0));

        let second = engine.upsert(vec![game(Some(10)), game(Some(11))]).await;
        assert_eq!((second.created, second.updated, second.errors), (0, 2, 0));
    }

    #[tokio::test]
    async fn test_game_without_id_is_counted_as_error() {
        let (engine, store) = engine_with_teams().await;

        let tally = engine.upsert(vec![game(None), game(Some(12))]).await;
        assert_eq!(tally.created, 1);
        assert_eq!(tally.errors, 1);
        assert_eq!(store.row_count(Table::Games), 1);
    }

    #[tokio::test]
    async fn test_missing_parent_is_skipped() {
        let (engine, store) = engine_with_teams().await;
        engine.upsert(vec![player(5, None)]).await;

        let log = GameLog {
            player_id: 5,
            game_id: 999,
            points: Some(20),
            ..GameLog::default()
        };
        let tally = engine.upsert(vec![log]).await;

        assert_eq!(tally.errors, 1);
        assert!(tally.failures[0].referential);
        assert!(!store
            .row_exists(Table::PlayerGameLogs, &NaturalKey::composite([5_i64, 999_i64]))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unknown_team_id_is_skipped() {
        let (engine, store) = engine_with_teams().await;
        engine.upsert(vec![player(5, None)]).await;
        engine.upsert(vec![game(Some(9))]).await;

        let log = GameLog {
            player_id: 5,
            game_id: 9,
            team_id: Some(999),
            ..GameLog::default()
        };
        let tally = engine.upsert(vec![log]).await;

        assert_eq!(tally.created, 0);
        assert_eq!(tally.errors, 1);
        assert!(tally.failures[0].referential);
        assert!(tally.failures[0].message.contains("teams"));
        assert_eq!(store.row_count(Table::PlayerGameLogs), 0);
    }

    #[tokio::test]
    async fn test_alias_abbreviations_resolve_to_stored_team() {
        let (engine, _store) = engine_with_teams().await;

        assert_eq!(engine.resolve_team_id("OKL").await.unwrap(), Some(1));
        assert_eq!(engine.resolve_team_id("OKC").await.unwrap(), Some(1));
        assert_eq!(engine.resolve_team_id("BRO").await.unwrap(), Some(2));
        assert_eq!(engine.resolve_team_id("XYZ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_player_team_resolved_from_abbreviation() {
        let (engine, store) = engine_with_teams().await;

        let tally = engine.upsert(vec![player(7, Some("BRO"))]).await;
        assert_eq!(tally.created, 1);

        let row = store.get_row(Table::Players, &NaturalKey::single(7)).unwrap();
        assert_eq!(row["current_team_id"], 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_whole_batch() {
        let (engine, store) = engine_with_teams().await;
        store.set_reachable(false);

        let tally = engine.upsert(vec![game(Some(1)), game(Some(2)), game(Some(3))]).await;
        assert_eq!(tally.errors, 3);
        assert_eq!(tally.succeeded(), 0);
        assert!(tally.connectivity_error.is_some());

        store.set_reachable(true);
        assert_eq!(store.row_count(Table::Games), 0);
    }

    #[test]
    fn test_tally_merge() {
        let mut total = UpsertTally {
            processed: 3,
            created: 2,
            updated: 1,
            ..UpsertTally::default()
        };
        let mut other = UpsertTally {
            processed: 2,
            updated: 1,
            ..UpsertTally::default()
        };
        other.record_failure(RowFailure::new("games", "boom"));
        total.merge(other);

        assert_eq!(total.counts().processed, 5);
        assert_eq!(total.succeeded(), 4);
        assert_eq!(total.errors, 1);
    }
}
