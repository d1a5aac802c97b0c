//! In-process storage backend
//!
//! Mirrors the PostgreSQL backend's observable behavior: atomic per-row
//! upserts, `created_at`/`updated_at` bookkeeping, archive tables keyed by
//! (natural key, season) and union view reads. Used for dry runs and tests.

use crate::adapters::database::{
    ArchiveInsert, DataSource, SeasonRow, SportsStore, TableStats, UpsertOutcome, ViewRow,
};
use crate::core::sync::SyncRecord;
use crate::domain::{ArchiveScope, NaturalKey, Result, SeasonWindow, SyncError, Table};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    live: HashMap<Table, BTreeMap<NaturalKey, Value>>,
    archive: HashMap<Table, BTreeMap<(i32, NaturalKey), Value>>,
    sync_logs: Vec<SyncRecord>,
    failing_writes: HashSet<(Table, NaturalKey)>,
}

/// Memory-backed [`SportsStore`]
pub struct InMemoryStore {
    state: Mutex<State>,
    reachable: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            reachable: AtomicBool::new(true),
        }
    }

    /// Simulates storage going away; every call fails until restored
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Makes the next writes of one row fail with a database error
    pub fn fail_writes_for(&self, table: Table, key: NaturalKey) {
        self.lock().failing_writes.insert((table, key));
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.lock().live.get(&table).map_or(0, BTreeMap::len)
    }

    pub fn archive_count(&self, table: Table) -> usize {
        self.lock().archive.get(&table).map_or(0, BTreeMap::len)
    }

    /// Stored live row, bookkeeping columns included
    pub fn get_row(&self, table: Table, key: &NaturalKey) -> Option<Value> {
        self.lock()
            .live
            .get(&table)
            .and_then(|rows| rows.get(key))
            .cloned()
    }

    /// Live rows of one table in key order
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock()
            .live
            .get(&table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Connectivity(
                "in-memory store marked unreachable".to_string(),
            ))
        }
    }
}

fn date_column(row: &Value, column: &str) -> Option<NaiveDate> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|text| NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok())
}

fn timestamp_column(row: &Value, column: &str) -> Option<DateTime<Utc>> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Ids of games whose `game_date` falls inside the window
fn season_game_ids(state: &State, window: &SeasonWindow) -> BTreeSet<i64> {
    state
        .live
        .get(&Table::Games)
        .map(|games| {
            games
                .values()
                .filter(|game| date_column(game, "game_date").is_some_and(|d| window.contains(d)))
                .filter_map(|game| game.get("id").and_then(Value::as_i64))
                .collect()
        })
        .unwrap_or_default()
}

fn stats_for<'a>(name: &str, rows: impl Iterator<Item = &'a Value>) -> TableStats {
    let mut stats = TableStats::empty(name);
    for row in rows {
        stats.total_records += 1;
        if let Some(created) = timestamp_column(row, "created_at") {
            stats.oldest_record = Some(stats.oldest_record.map_or(created, |o| o.min(created)));
            stats.newest_record = Some(stats.newest_record.map_or(created, |n| n.max(created)));
        }
    }
    stats
}

#[async_trait]
impl SportsStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        self.ensure_reachable()
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.ensure_reachable()
    }

    async fn upsert_row(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &Value,
    ) -> Result<UpsertOutcome> {
        self.ensure_reachable()?;
        let mut state = self.lock();

        if state.failing_writes.contains(&(table, key.clone())) {
            return Err(SyncError::Database(format!(
                "write rejected for {table} {key}"
            )));
        }

        let Value::Object(fields) = row else {
            return Err(SyncError::Row(format!("{table} row is not an object")));
        };

        let now = Value::from(Utc::now().to_rfc3339());
        let rows = state.live.entry(table).or_default();
        let created_at = rows
            .get(key)
            .and_then(|existing| existing.get("created_at").cloned());

        let mut stored = fields.clone();
        stored.insert("updated_at".to_string(), now.clone());
        let outcome = match created_at {
            Some(created_at) => {
                stored.insert("created_at".to_string(), created_at);
                UpsertOutcome::Updated
            }
            None => {
                stored.insert("created_at".to_string(), now);
                UpsertOutcome::Created
            }
        };
        rows.insert(key.clone(), Value::Object(stored));

        Ok(outcome)
    }

    async fn insert_row_if_absent(
        &self,
        table: Table,
        key: &NaturalKey,
        row: &Value,
    ) -> Result<UpsertOutcome> {
        self.ensure_reachable()?;
        let exists = self
            .lock()
            .live
            .get(&table)
            .is_some_and(|rows| rows.contains_key(key));
        if exists {
            return Ok(UpsertOutcome::Unchanged);
        }
        self.upsert_row(table, key, row).await
    }

    async fn row_exists(&self, table: Table, key: &NaturalKey) -> Result<bool> {
        self.ensure_reachable()?;
        Ok(self
            .lock()
            .live
            .get(&table)
            .is_some_and(|rows| rows.contains_key(key)))
    }

    async fn find_team_id_by_abbreviation(&self, abbreviation: &str) -> Result<Option<i64>> {
        self.ensure_reachable()?;
        let state = self.lock();
        Ok(state.live.get(&Table::Teams).and_then(|teams| {
            teams
                .values()
                .find(|team| {
                    team.get("abbreviation")
                        .and_then(Value::as_str)
                        .is_some_and(|stored| stored.eq_ignore_ascii_case(abbreviation))
                })
                .and_then(|team| team.get("id").and_then(Value::as_i64))
        }))
    }

    async fn append_sync_record(&self, record: &SyncRecord) -> Result<()> {
        self.ensure_reachable()?;
        self.lock().sync_logs.push(record.clone());
        Ok(())
    }

    async fn recent_sync_records(&self, limit: usize) -> Result<Vec<SyncRecord>> {
        self.ensure_reachable()?;
        let state = self.lock();
        let mut records: Vec<SyncRecord> = state.sync_logs.iter().rev().cloned().collect();
        // stable sort keeps append order for equal timestamps
        records.sort_by(|a, b| b.sync_timestamp.cmp(&a.sync_timestamp));
        records.truncate(limit);
        Ok(records)
    }

    async fn season_rows(&self, table: Table, window: &SeasonWindow) -> Result<Vec<SeasonRow>> {
        self.ensure_reachable()?;
        let state = self.lock();
        let Some(rows) = state.live.get(&table) else {
            return Ok(Vec::new());
        };

        let selected: Box<dyn Fn(&Value) -> bool + '_> = match table.archive_scope() {
            ArchiveScope::OwnDate(column) => Box::new(move |row: &Value| {
                date_column(row, column).is_some_and(|d| window.contains(d))
            }),
            ArchiveScope::ViaGame => {
                let games = season_game_ids(&state, window);
                Box::new(move |row: &Value| {
                    row.get("game_id")
                        .and_then(Value::as_i64)
                        .is_some_and(|id| games.contains(&id))
                })
            }
            ArchiveScope::TeamsInSeasonGames => {
                let games = season_game_ids(&state, window);
                let teams: BTreeSet<i64> = state
                    .live
                    .get(&Table::Games)
                    .into_iter()
                    .flat_map(BTreeMap::values)
                    .filter(|game| {
                        game.get("id")
                            .and_then(Value::as_i64)
                            .is_some_and(|id| games.contains(&id))
                    })
                    .flat_map(|game| {
                        ["home_team_id", "away_team_id"]
                            .into_iter()
                            .filter_map(|column| game.get(column).and_then(Value::as_i64))
                    })
                    .collect();
                Box::new(move |row: &Value| {
                    row.get("id")
                        .and_then(Value::as_i64)
                        .is_some_and(|id| teams.contains(&id))
                })
            }
            ArchiveScope::PlayersInSeasonLogs => {
                let games = season_game_ids(&state, window);
                let players: BTreeSet<i64> = state
                    .live
                    .get(&Table::PlayerGameLogs)
                    .into_iter()
                    .flat_map(BTreeMap::values)
                    .filter(|log| {
                        log.get("game_id")
                            .and_then(Value::as_i64)
                            .is_some_and(|id| games.contains(&id))
                    })
                    .filter_map(|log| log.get("player_id").and_then(Value::as_i64))
                    .collect();
                Box::new(move |row: &Value| {
                    row.get("id")
                        .and_then(Value::as_i64)
                        .is_some_and(|id| players.contains(&id))
                })
            }
        };

        Ok(rows
            .iter()
            .filter(|(_, row)| selected(row))
            .map(|(key, row)| SeasonRow {
                key: key.clone(),
                data: row.clone(),
            })
            .collect())
    }

    async fn insert_archive_row(
        &self,
        table: Table,
        season_year: i32,
        archived_at: DateTime<Utc>,
        row: &SeasonRow,
    ) -> Result<ArchiveInsert> {
        self.ensure_reachable()?;
        let mut state = self.lock();

        if state.failing_writes.contains(&(table, row.key.clone())) {
            return Err(SyncError::Database(format!(
                "archive write rejected for {table} {}",
                row.key
            )));
        }

        let archive = state.archive.entry(table).or_default();
        let slot = (season_year, row.key.clone());
        if archive.contains_key(&slot) {
            return Ok(ArchiveInsert::AlreadyArchived);
        }

        let Value::Object(fields) = &row.data else {
            return Err(SyncError::Row(format!("{table} row is not an object")));
        };
        let mut archived = fields.clone();
        archived.insert("season_year".to_string(), Value::from(season_year));
        archived.insert(
            "archived_at".to_string(),
            Value::from(archived_at.to_rfc3339()),
        );
        archive.insert(slot, Value::Object(archived));

        Ok(ArchiveInsert::Inserted)
    }

    async fn table_stats(&self, table_name: &str) -> Result<TableStats> {
        self.ensure_reachable()?;
        let state = self.lock();

        if let Some(table) = Table::from_name(table_name) {
            return Ok(stats_for(
                table_name,
                state.live.get(&table).into_iter().flat_map(BTreeMap::values),
            ));
        }
        if let Some(table) = table_name
            .strip_prefix("archive_")
            .and_then(Table::from_name)
        {
            return Ok(stats_for(
                table_name,
                state
                    .archive
                    .get(&table)
                    .into_iter()
                    .flat_map(BTreeMap::values),
            ));
        }

        Err(SyncError::Database(format!(
            "relation \"{table_name}\" does not exist"
        )))
    }

    async fn view_rows(&self, table: Table, season_year: Option<i32>) -> Result<Vec<ViewRow>> {
        self.ensure_reachable()?;
        let state = self.lock();

        let live = state
            .live
            .get(&table)
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter(|_| season_year.is_none())
            .map(|row| ViewRow {
                data_source: DataSource::Current,
                season_year: None,
                data: row.clone(),
            });

        let archived = state
            .archive
            .get(&table)
            .into_iter()
            .flat_map(BTreeMap::iter)
            .filter(|((year, _), _)| season_year.map_or(true, |wanted| *year == wanted))
            .map(|((year, _), row)| ViewRow {
                data_source: DataSource::Archived,
                season_year: Some(*year),
                data: row.clone(),
            });

        Ok(live.chain(archived).collect())
    }
}
