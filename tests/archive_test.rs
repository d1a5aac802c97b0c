//! Integration tests for season archival and the union views

use courtsync::adapters::database::{DataSource, SportsStore};
use courtsync::adapters::memory::InMemoryStore;
use courtsync::core::archive::ArchivalEngine;
use courtsync::core::audit::SyncAuditLog;
use courtsync::core::storage::UpsertStorageEngine;
use courtsync::core::sync::SyncStatus;
use courtsync::domain::{Game, GameLog, NaturalKey, Player, Table, Team};
use serde_json::json;
use std::sync::Arc;

async fn synced_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let engine = UpsertStorageEngine::new(store.clone());

    let teams: Vec<Team> = serde_json::from_value(json!([
        {"id": 1, "abbreviation": "DEN", "city": "Denver", "name": "Nuggets"},
        {"id": 2, "abbreviation": "MIA", "city": "Miami", "name": "Heat"}
    ]))
    .unwrap();
    let players: Vec<Player> = serde_json::from_value(json!([
        {"id": 10, "first_name": "Nikola", "last_name": "Jokic", "position": "C", "jersey_number": 15,
         "current_team_id": 1, "roster_status": "ROSTER", "height": "6'11\"", "weight": 284,
         "birth_date": "1995-02-19", "birth_city": "Sombor", "birth_country": "Serbia", "rookie": false,
         "external_mappings": [{"source": "NBA.com", "id": "203999"}]},
        {"id": 20, "first_name": "Bam", "last_name": "Adebayo", "current_team_id": 2, "external_mappings": []}
    ]))
    .unwrap();
    let games: Vec<Game> = serde_json::from_value(json!([
        {"id": 1001, "game_date": "2024-03-01", "home_team_id": 1, "away_team_id": 2, "season": "2023-24"},
        {"id": 2001, "game_date": "2024-12-01", "home_team_id": 2, "away_team_id": 1, "season": "2024-25"}
    ]))
    .unwrap();
    let logs: Vec<GameLog> = serde_json::from_value(json!([
        {"player_id": 10, "game_id": 1001, "team_id": 1, "points": 28},
        {"player_id": 20, "game_id": 2001, "team_id": 2, "points": 17}
    ]))
    .unwrap();

    assert_eq!(engine.upsert(teams).await.errors, 0);
    assert_eq!(engine.upsert(players).await.errors, 0);
    assert_eq!(engine.upsert(games).await.errors, 0);
    assert_eq!(engine.upsert(logs).await.errors, 0);
    store
}

#[tokio::test]
async fn test_archived_players_are_visible_through_the_view() {
    let store = synced_store().await;
    let engine = ArchivalEngine::for_all_tables(store.clone());
    let live = store
        .get_row(Table::Players, &NaturalKey::single(10_i64))
        .unwrap();

    let report = engine.archive_season(2023).await.unwrap();
    assert_eq!(report.season_year, 2023);
    assert!(!report.has_failures());

    let archived = engine.view_rows(Table::Players, Some(2023)).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].data_source, DataSource::Archived);
    assert_eq!(archived[0].season_year, Some(2023));
    for column in Table::Players.columns() {
        assert_eq!(
            archived[0].data[*column], live[*column],
            "archived players.{column} differs from the live row"
        );
    }
    assert_eq!(archived[0].data["external_mappings"][0]["id"], "203999");
    assert_eq!(archived[0].data["current_team_id"], 1);

    let all = engine.view_rows(Table::Players, None).await.unwrap();
    let current = all
        .iter()
        .filter(|row| row.data_source == DataSource::Current)
        .count();
    assert_eq!(current, 2);
    assert_eq!(store.row_count(Table::Players), 2);
}

#[tokio::test]
async fn test_archive_run_is_audited_per_table() {
    let store = synced_store().await;
    let engine = ArchivalEngine::new(store.clone(), vec![Table::Games, Table::PlayerGameLogs]);

    engine.archive_season(2023).await.unwrap();

    let audit = SyncAuditLog::new(store.clone()).recent(10).await.unwrap();
    let games = audit
        .iter()
        .find(|record| record.table_name == "archive_games")
        .unwrap();
    assert_eq!(games.status, SyncStatus::Success);
    assert_eq!(games.records_created, 1);
    assert!(audit.iter().any(|r| r.table_name == "archive_player_game_logs"));
}

#[tokio::test]
async fn test_status_survives_an_unreachable_store() {
    let store = synced_store().await;
    let engine = ArchivalEngine::for_all_tables(store.clone());
    engine.archive_season(2023).await.unwrap();

    let status = engine.get_archival_status().await;
    let games = status.iter().find(|s| s.live.table == "games").unwrap();
    assert_eq!(games.live.total_records, 2);
    assert_eq!(games.archive.total_records, 1);

    store.set_reachable(false);
    assert!(store.test_connection().await.is_err());
    let status = engine.get_archival_status().await;
    assert_eq!(status.len(), Table::ALL.len());
    assert!(status
        .iter()
        .all(|s| s.live.total_records == 0 && s.archive.total_records == 0));
}
