//! Integration tests for the upsert pipeline against the in-memory backend

use courtsync::adapters::memory::InMemoryStore;
use courtsync::core::storage::UpsertStorageEngine;
use courtsync::domain::{Game, GameLog, NaturalKey, Player, Table, Team};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::json;
use std::sync::Arc;

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

fn player(id: i64, team_id: Option<i64>) -> Player {
    serde_json::from_value(json!({
        "id": id,
        "first_name": FirstName().fake::<String>(),
        "last_name": LastName().fake::<String>(),
        "current_team_id": team_id,
        "external_mappings": []
    }))
    .unwrap()
}

fn game(id: Option<i64>) -> Game {
    serde_json::from_value(json!({
        "id": id,
        "game_date": "2025-01-15",
        "home_team_id": 1,
        "away_team_id": 2,
        "season": "2024-25"
    }))
    .unwrap()
}

async fn engine_with_teams() -> (Arc<InMemoryStore>, UpsertStorageEngine) {
    let store = Arc::new(InMemoryStore::new());
    let engine = UpsertStorageEngine::new(store.clone());
    let tally = engine
        .upsert(vec![team(1, "NYK"), team(2, "OKC"), team(3, "BKN")])
        .await;
    assert_eq!(tally.created, 3);
    (store, engine)
}

#[tokio::test]
async fn test_upserting_twice_updates_instead_of_duplicating() {
    let (store, engine) = engine_with_teams().await;
    let players: Vec<Player> = (1..=5).map(|id| player(id, Some(1))).collect();

    let first = engine.upsert(players.clone()).await;
    let second = engine.upsert(players).await;

    assert_eq!((first.created, first.updated), (5, 0));
    assert_eq!((second.created, second.updated), (0, 5));
    assert_eq!(store.row_count(Table::Players), 5);
}

#[tokio::test]
async fn test_one_failing_row_leaves_the_rest_of_the_batch() {
    let (store, engine) = engine_with_teams().await;
    store.fail_writes_for(Table::Players, NaturalKey::single(7_i64));
    let players: Vec<Player> = (1..=10).map(|id| player(id, Some(2))).collect();

    let tally = engine.upsert(players).await;

    assert_eq!(tally.processed, 10);
    assert_eq!(tally.created, 9);
    assert_eq!(tally.errors, 1);
    assert_eq!(tally.failures.len(), 1);
    assert!(store.get_row(Table::Players, &NaturalKey::single(7_i64)).is_none());
    assert!(store.get_row(Table::Players, &NaturalKey::single(8_i64)).is_some());
}

#[tokio::test]
async fn test_missing_parent_counts_as_error() {
    let (store, engine) = engine_with_teams().await;

    let tally = engine.upsert(vec![player(1, Some(1)), player(2, Some(999))]).await;

    assert_eq!(tally.created, 1);
    assert_eq!(tally.errors, 1);
    assert!(tally.failures[0].referential);
    assert_eq!(store.row_count(Table::Players), 1);
}

#[tokio::test]
async fn test_game_without_id_counts_as_error() {
    let (store, engine) = engine_with_teams().await;

    let tally = engine.upsert(vec![game(Some(500)), game(None)]).await;

    assert_eq!(tally.created, 1);
    assert_eq!(tally.errors, 1);
    assert_eq!(store.row_count(Table::Games), 1);
}

#[tokio::test]
async fn test_legacy_abbreviations_resolve_to_stored_teams() {
    let (store, engine) = engine_with_teams().await;
    engine.upsert(vec![game(Some(500))]).await;

    let mut oklahoma = player(1, None);
    oklahoma.team_abbreviation = Some("OKL".to_string());
    let mut brooklyn = player(2, None);
    brooklyn.team_abbreviation = Some("BRO".to_string());
    engine.upsert(vec![oklahoma, brooklyn]).await;

    let row = store.get_row(Table::Players, &NaturalKey::single(1_i64)).unwrap();
    assert_eq!(row["current_team_id"], 2);
    let row = store.get_row(Table::Players, &NaturalKey::single(2_i64)).unwrap();
    assert_eq!(row["current_team_id"], 3);

    let mut log: GameLog = serde_json::from_value(json!({
        "player_id": 1,
        "game_id": 500,
        "points": 31
    }))
    .unwrap();
    log.team_abbreviation = Some("okl".to_string());
    let tally = engine.upsert(vec![log]).await;
    assert_eq!(tally.created, 1);

    let row = store
        .get_row(Table::PlayerGameLogs, &NaturalKey::composite([1_i64, 500_i64]))
        .unwrap();
    assert_eq!(row["team_id"], 2);
}

#[tokio::test]
async fn test_unreachable_store_fails_the_whole_batch() {
    let (store, engine) = engine_with_teams().await;
    store.set_reachable(false);

    let tally = engine.upsert((1..=4).map(|id| player(id, Some(1))).collect()).await;

    assert_eq!(tally.processed, 4);
    assert_eq!(tally.errors, 4);
    assert_eq!(tally.created + tally.updated, 0);
    assert!(tally.connectivity_failure().is_some());

    store.set_reachable(true);
    assert_eq!(store.row_count(Table::Players), 0);
}
