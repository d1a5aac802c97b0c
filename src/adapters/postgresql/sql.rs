//! SQL text for the generic row operations
//!
//! Rows travel as a single JSONB parameter and are expanded with
//! `jsonb_populate_record`, so one statement shape serves every table.
//! Table and column names only ever come from the [`Table`] catalogue.

use crate::domain::{ArchiveScope, Table};

fn join_columns(columns: &[&str], prefix: &str) -> String {
    columns
        .iter()
        .map(|column| format!("{prefix}{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Atomic insert-or-update; returns `inserted = true` for new rows
pub fn upsert_statement(table: Table) -> String {
    let name = table.name();
    let columns = join_columns(table.columns(), "");
    let keys = join_columns(table.key_columns(), "");
    let assignments = table
        .columns()
        .iter()
        .filter(|column| !table.key_columns().contains(column))
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .chain(std::iter::once("updated_at = now()".to_string()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {name} ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $1::jsonb) \
         ON CONFLICT ({keys}) DO UPDATE SET {assignments} \
         RETURNING (xmax = 0) AS inserted"
    )
}

/// Insert that leaves an existing row alone; zero affected rows means the key was taken
pub fn insert_if_absent_statement(table: Table) -> String {
    let name = table.name();
    let columns = join_columns(table.columns(), "");
    let keys = join_columns(table.key_columns(), "");

    format!(
        "INSERT INTO {name} ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{name}, $1::jsonb) \
         ON CONFLICT ({keys}) DO NOTHING"
    )
}

/// Existence check by natural key; `$1` is a `{key_column: value}` object
pub fn exists_statement(table: Table) -> String {
    let name = table.name();
    let predicate = table
        .key_columns()
        .iter()
        .map(|column| format!("t.{column} = k.{column}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    format!(
        "SELECT EXISTS (SELECT 1 FROM {name} t, jsonb_populate_record(NULL::{name}, $1::jsonb) k \
         WHERE {predicate})"
    )
}

/// Live rows of a season; `$1` is the inclusive start date, `$2` the exclusive end
pub fn season_rows_statement(table: Table) -> String {
    let name = table.name();
    let order = join_columns(table.key_columns(), "t.");
    let filter = match table.archive_scope() {
        ArchiveScope::OwnDate(column) => format!("t.{column} >= $1 AND t.{column} < $2"),
        ArchiveScope::ViaGame => "EXISTS (SELECT 1 FROM games g WHERE g.id = t.game_id \
             AND g.game_date >= $1 AND g.game_date < $2)"
            .to_string(),
        ArchiveScope::TeamsInSeasonGames => "EXISTS (SELECT 1 FROM games g \
             WHERE (g.home_team_id = t.id OR g.away_team_id = t.id) \
             AND g.game_date >= $1 AND g.game_date < $2)"
            .to_string(),
        ArchiveScope::PlayersInSeasonLogs => "EXISTS (SELECT 1 FROM player_game_logs l \
             JOIN games g ON g.id = l.game_id \
             WHERE l.player_id = t.id AND g.game_date >= $1 AND g.game_date < $2)"
            .to_string(),
    };

    format!("SELECT to_jsonb(t) AS data FROM {name} t WHERE {filter} ORDER BY {order}")
}

/// Write-once archive copy; zero affected rows means the season already holds the key
pub fn archive_insert_statement(table: Table) -> String {
    let archive = table.archive_name();
    let keys = join_columns(table.key_columns(), "");
    format!(
        "INSERT INTO {archive} \
         SELECT * FROM jsonb_populate_record(NULL::{archive}, $1::jsonb) \
         ON CONFLICT ({keys}, season_year) DO NOTHING"
    )
}

/// Union view read; `$1` is an optional season filter
pub fn view_rows_statement(table: Table) -> String {
    format!(
        "SELECT to_jsonb(v) AS data FROM {} v \
         WHERE $1::integer IS NULL OR v.season_year = $1::integer",
        table.view_name()
    )
}

/// Row count and `created_at` range; `name` must be a catalogue table
pub fn stats_statement(name: &str) -> String {
    format!(
        "SELECT COUNT(*)::bigint AS total, MIN(created_at) AS oldest, MAX(created_at) AS newest \
         FROM {name}"
    )
}

/// Whether `name` is a live or archive table this crate manages
pub fn is_known_table(name: &str) -> bool {
    Table::from_name(name).is_some()
        || name
            .strip_prefix("archive_")
            .and_then(Table::from_name)
            .is_some()
}
