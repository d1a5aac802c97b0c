//! Normalized storage records
//!
//! These are the rows the transformers produce and the storage engine writes.
//! Field names match the column names in `migrations/`, so a record's JSON
//! form can be handed straight to a backend.
//!
//! Optional upstream fields are `Option` and serialize as `null`; collections
//! default to empty vectors. Nothing is ever omitted from the serialized row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{KeyPart, NaturalKey};

/// Live tables written by the sync pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Teams,
    Players,
    Games,
    PlayerGameLogs,
    Injuries,
    DfsProjections,
    DailyDfsData,
    GameLineups,
}

/// How the archival engine decides which live rows belong to a season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveScope {
    /// The row's own date column falls inside the season
    OwnDate(&'static str),
    /// The referenced game (`game_id`) was played inside the season
    ViaGame,
    /// The team played a game inside the season
    TeamsInSeasonGames,
    /// The player has a game log for a game inside the season
    PlayersInSeasonLogs,
}

impl Table {
    /// Live tables in dependency order: parents before children
    pub const ALL: [Table; 8] = [
        Table::Teams,
        Table::Players,
        Table::Games,
        Table::PlayerGameLogs,
        Table::Injuries,
        Table::DfsProjections,
        Table::DailyDfsData,
        Table::GameLineups,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Teams => "teams",
            Table::Players => "players",
            Table::Games => "games",
            Table::PlayerGameLogs => "player_game_logs",
            Table::Injuries => "injuries",
            Table::DfsProjections => "dfs_projections",
            Table::DailyDfsData => "daily_dfs_data",
            Table::GameLineups => "game_lineups",
        }
    }

    pub fn archive_name(&self) -> String {
        format!("archive_{}", self.name())
    }

    pub fn view_name(&self) -> String {
        format!("v_all_{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.name() == name)
    }

    /// Columns forming the natural key, in [`NaturalKey`] part order
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Teams | Table::Players | Table::Games | Table::Injuries => &["id"],
            Table::PlayerGameLogs | Table::DfsProjections => &["player_id", "game_id"],
            Table::DailyDfsData => &["player_id", "game_id", "dfs_source"],
            Table::GameLineups => &["game_id", "team_id", "lineup_type", "position"],
        }
    }

    /// Data columns written on upsert (bookkeeping columns excluded)
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Teams => &[
                "id",
                "abbreviation",
                "city",
                "name",
                "conference",
                "division",
            ],
            Table::Players => &[
                "id",
                "first_name",
                "last_name",
                "position",
                "jersey_number",
                "current_team_id",
                "roster_status",
                "height",
                "weight",
                "birth_date",
                "birth_city",
                "birth_country",
                "rookie",
                "external_mappings",
            ],
            Table::Games => &[
                "id",
                "game_date",
                "start_time",
                "home_team_id",
                "away_team_id",
                "home_score",
                "away_score",
                "status",
                "season",
                "venue_id",
                "venue_name",
            ],
            Table::PlayerGameLogs => &[
                "player_id",
                "game_id",
                "team_id",
                "minutes",
                "points",
                "rebounds",
                "offensive_rebounds",
                "defensive_rebounds",
                "assists",
                "steals",
                "blocks",
                "turnovers",
                "personal_fouls",
                "field_goals_made",
                "field_goals_attempted",
                "three_pointers_made",
                "three_pointers_attempted",
                "free_throws_made",
                "free_throws_attempted",
                "plus_minus",
                "started",
                "fantasy_points",
            ],
            Table::Injuries => &[
                "id",
                "player_id",
                "injury_type",
                "status",
                "reported_date",
            ],
            Table::DfsProjections => &[
                "player_id",
                "game_id",
                "team_id",
                "dfs_source",
                "salary",
                "projected_points",
                "fantasy_points_by_source",
                "ownership_pct",
                "value_score",
            ],
            Table::DailyDfsData => &[
                "player_id",
                "game_id",
                "dfs_source",
                "team_id",
                "slate_date",
                "position",
                "salary",
                "fantasy_points",
            ],
            Table::GameLineups => &[
                "game_id",
                "team_id",
                "lineup_type",
                "position",
                "player_id",
            ],
        }
    }

    pub fn archive_scope(&self) -> ArchiveScope {
        match self {
            Table::Teams => ArchiveScope::TeamsInSeasonGames,
            Table::Players => ArchiveScope::PlayersInSeasonLogs,
            Table::Games => ArchiveScope::OwnDate("game_date"),
            Table::Injuries => ArchiveScope::OwnDate("reported_date"),
            Table::PlayerGameLogs
            | Table::DfsProjections
            | Table::DailyDfsData
            | Table::GameLineups => ArchiveScope::ViaGame,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parent row a dependent record points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub table: Table,
    pub key: NaturalKey,
}

impl ParentRef {
    pub fn new(table: Table, id: i64) -> Self {
        Self {
            table,
            key: NaturalKey::single(id),
        }
    }
}

/// A record the storage engine can upsert
pub trait StoredRecord: Serialize + Send + Sync {
    const TABLE: Table;

    fn natural_key(&self) -> NaturalKey;

    /// Rows that must exist before this record can be written
    fn parents(&self) -> Vec<ParentRef> {
        Vec::new()
    }

    /// Team abbreviation still waiting to be resolved to a team id
    fn unresolved_team(&self) -> Option<&str> {
        None
    }

    /// Stores the team id resolved from [`StoredRecord::unresolved_team`]
    fn resolve_team(&mut self, _team_id: i64) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub abbreviation: String,
    pub city: Option<String>,
    pub name: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
}

impl StoredRecord for Team {
    const TABLE: Table = Table::Teams;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::single(self.id)
    }
}

/// Venue seen while transforming games; folded into game rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: Option<String>,
    pub city: Option<String>,
}

/// Identifier of a player in another data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMapping {
    pub source: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i32>,
    pub current_team_id: Option<i64>,
    pub roster_status: Option<String>,
    pub height: Option<String>,
    pub weight: Option<i32>,
    pub birth_date: Option<NaiveDate>,
    pub birth_city: Option<String>,
    pub birth_country: Option<String>,
    pub rookie: Option<bool>,
    pub external_mappings: Vec<ExternalMapping>,
    /// Provider abbreviation used when the team id was absent
    #[serde(skip)]
    pub team_abbreviation: Option<String>,
}

impl StoredRecord for Player {
    const TABLE: Table = Table::Players;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::single(self.id)
    }

    fn parents(&self) -> Vec<ParentRef> {
        self.current_team_id
            .map(|team_id| ParentRef::new(Table::Teams, team_id))
            .into_iter()
            .collect()
    }

    fn unresolved_team(&self) -> Option<&str> {
        match self.current_team_id {
            Some(_) => None,
            None => self.team_abbreviation.as_deref(),
        }
    }

    fn resolve_team(&mut self, team_id: i64) {
        self.current_team_id = Some(team_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// `None` when the provider omitted the id; such games are never written
    pub id: Option<i64>,
    pub game_date: Option<NaiveDate>,
    pub start_time: Option<DateTime<Utc>>,
    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub status: Option<String>,
    pub season: String,
    pub venue_id: Option<i64>,
    pub venue_name: Option<String>,
}

impl StoredRecord for Game {
    const TABLE: Table = Table::Games;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::single(self.id.unwrap_or_default())
    }

    fn parents(&self) -> Vec<ParentRef> {
        [self.home_team_id, self.away_team_id]
            .into_iter()
            .flatten()
            .map(|team_id| ParentRef::new(Table::Teams, team_id))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    pub player_id: i64,
    pub game_id: i64,
    pub team_id: Option<i64>,
    pub minutes: Option<f64>,
    pub points: Option<i32>,
    pub rebounds: Option<i32>,
    pub offensive_rebounds: Option<i32>,
    pub defensive_rebounds: Option<i32>,
    pub assists: Option<i32>,
    pub steals: Option<i32>,
    pub blocks: Option<i32>,
    pub turnovers: Option<i32>,
    pub personal_fouls: Option<i32>,
    pub field_goals_made: Option<i32>,
    pub field_goals_attempted: Option<i32>,
    pub three_pointers_made: Option<i32>,
    pub three_pointers_attempted: Option<i32>,
    pub free_throws_made: Option<i32>,
    pub free_throws_attempted: Option<i32>,
    pub plus_minus: Option<i32>,
    pub started: Option<bool>,
    pub fantasy_points: Option<f64>,
    /// Provider abbreviation used when the team id was absent
    #[serde(skip)]
    pub team_abbreviation: Option<String>,
}

impl StoredRecord for GameLog {
    const TABLE: Table = Table::PlayerGameLogs;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::composite([self.player_id, self.game_id])
    }

    fn parents(&self) -> Vec<ParentRef> {
        let mut parents = vec![
            ParentRef::new(Table::Players, self.player_id),
            ParentRef::new(Table::Games, self.game_id),
        ];
        parents.extend(self.team_id.map(|team_id| ParentRef::new(Table::Teams, team_id)));
        parents
    }

    fn unresolved_team(&self) -> Option<&str> {
        match self.team_id {
            Some(_) => None,
            None => self.team_abbreviation.as_deref(),
        }
    }

    fn resolve_team(&mut self, team_id: i64) {
        self.team_id = Some(team_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injury {
    pub id: i64,
    pub player_id: i64,
    pub injury_type: Option<String>,
    pub status: Option<String>,
    pub reported_date: Option<NaiveDate>,
}

impl StoredRecord for Injury {
    const TABLE: Table = Table::Injuries;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::single(self.id)
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![ParentRef::new(Table::Players, self.player_id)]
    }
}

/// Fantasy points reported by one scoring source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePoints {
    pub source: Option<String>,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfsProjection {
    pub player_id: i64,
    pub game_id: i64,
    pub team_id: Option<i64>,
    pub dfs_source: Option<String>,
    pub salary: Option<i32>,
    pub projected_points: Option<f64>,
    pub fantasy_points_by_source: Vec<SourcePoints>,
    pub ownership_pct: Option<f64>,
    pub value_score: Option<f64>,
    /// Provider abbreviation used when the team id was absent
    #[serde(skip)]
    pub team_abbreviation: Option<String>,
}

impl StoredRecord for DfsProjection {
    const TABLE: Table = Table::DfsProjections;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::composite([self.player_id, self.game_id])
    }

    fn parents(&self) -> Vec<ParentRef> {
        let mut parents = vec![
            ParentRef::new(Table::Players, self.player_id),
            ParentRef::new(Table::Games, self.game_id),
        ];
        parents.extend(self.team_id.map(|team_id| ParentRef::new(Table::Teams, team_id)));
        parents
    }

    fn unresolved_team(&self) -> Option<&str> {
        match self.team_id {
            Some(_) => None,
            None => self.team_abbreviation.as_deref(),
        }
    }

    fn resolve_team(&mut self, team_id: i64) {
        self.team_id = Some(team_id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDfsEntry {
    pub player_id: i64,
    pub game_id: i64,
    pub dfs_source: String,
    pub team_id: Option<i64>,
    pub slate_date: Option<NaiveDate>,
    pub position: Option<String>,
    pub salary: Option<i32>,
    pub fantasy_points: Option<f64>,
    /// Provider abbreviation used when the team id was absent
    #[serde(skip)]
    pub team_abbreviation: Option<String>,
}

impl StoredRecord for DailyDfsEntry {
    const TABLE: Table = Table::DailyDfsData;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::composite([
            KeyPart::Int(self.player_id),
            KeyPart::Int(self.game_id),
            KeyPart::Text(self.dfs_source.clone()),
        ])
    }

    fn parents(&self) -> Vec<ParentRef> {
        let mut parents = vec![
            ParentRef::new(Table::Players, self.player_id),
            ParentRef::new(Table::Games, self.game_id),
        ];
        parents.extend(self.team_id.map(|team_id| ParentRef::new(Table::Teams, team_id)));
        parents
    }

    fn unresolved_team(&self) -> Option<&str> {
        match self.team_id {
            Some(_) => None,
            None => self.team_abbreviation.as_deref(),
        }
    }

    fn resolve_team(&mut self, team_id: i64) {
        self.team_id = Some(team_id);
    }
}

/// One filled slot of an expected or actual lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLineupEntry {
    pub game_id: i64,
    pub team_id: i64,
    pub lineup_type: String,
    pub position: String,
    pub player_id: i64,
}

impl StoredRecord for GameLineupEntry {
    const TABLE: Table = Table::GameLineups;

    fn natural_key(&self) -> NaturalKey {
        NaturalKey::composite([
            KeyPart::Int(self.game_id),
            KeyPart::Int(self.team_id),
            KeyPart::Text(self.lineup_type.clone()),
            KeyPart::Text(self.position.clone()),
        ])
    }

    fn parents(&self) -> Vec<ParentRef> {
        vec![
            ParentRef::new(Table::Games, self.game_id),
            ParentRef::new(Table::Teams, self.team_id),
            ParentRef::new(Table::Players, self.player_id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialized_keys<T: Serialize>(record: &T) -> Vec<String> {
        match serde_json::to_value(record).unwrap() {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected object, got {other}"),
        }
    }

    fn assert_columns_match<T: StoredRecord>(record: &T) {
        let mut keys = serialized_keys(record);
        keys.sort();
        let mut columns: Vec<String> = T::TABLE.columns().iter().map(|c| c.to_string()).collect();
        columns.sort();
        assert_eq!(keys, columns, "columns drifted for {}", T::TABLE);

        for key_column in T::TABLE.key_columns() {
            assert!(T::TABLE.columns().contains(key_column));
        }
    }

    #[test]
    fn test_record_fields_match_table_columns() {
        assert_columns_match(&Team {
            id: 1,
            abbreviation: "BOS".into(),
            city: None,
            name: None,
            conference: None,
            division: None,
        });
        assert_columns_match(&Player {
            id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
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
            team_abbreviation: Some("BOS".into()),
        });
        assert_columns_match(&Game {
            id: Some(1),
            game_date: None,
            start_time: None,
            home_team_id: None,
            away_team_id: None,
            home_score: None,
            away_score: None,
            status: None,
            season: "2024-25".into(),
            venue_id: None,
            venue_name: None,
        });
        assert_columns_match(&GameLog::default());
        assert_columns_match(&Injury {
            id: 1,
            player_id: 1,
            injury_type: None,
            status: None,
            reported_date: None,
        });
        assert_columns_match(&DfsProjection {
            player_id: 1,
            game_id: 1,
            team_id: None,
            dfs_source: None,
            salary: None,
            projected_points: None,
            fantasy_points_by_source: vec![],
            ownership_pct: None,
            value_score: None,
            team_abbreviation: None,
        });
        assert_columns_match(&DailyDfsEntry {
            player_id: 1,
            game_id: 1,
            dfs_source: "DraftKings".into(),
            team_id: None,
            slate_date: None,
            position: None,
            salary: None,
            fantasy_points: None,
            team_abbreviation: None,
        });
        assert_columns_match(&GameLineupEntry {
            game_id: 1,
            team_id: 1,
            lineup_type: "actual".into(),
            position: "Starter1".into(),
            player_id: 1,
        });
    }

    #[test]
    fn test_game_without_id_has_invalid_key() {
        let game = Game {
            id: None,
            game_date: None,
            start_time: None,
            home_team_id: Some(1),
            away_team_id: Some(2),
            home_score: None,
            away_score: None,
            status: None,
            season: "2024-25".into(),
            venue_id: None,
            venue_name: None,
        };
        assert!(!game.natural_key().is_valid());
        assert_eq!(game.parents().len(), 2);
    }

    #[test]
    fn test_team_id_is_a_parent_when_known() {
        let mut log = GameLog {
            player_id: 5,
            game_id: 9,
            team_id: Some(999),
            ..GameLog::default()
        };
        assert!(log.parents().contains(&ParentRef::new(Table::Teams, 999)));

        log.team_id = None;
        assert_eq!(log.parents().len(), 2);
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let injury = Injury {
            id: 3,
            player_id: 9,
            injury_type: None,
            status: None,
            reported_date: None,
        };
        let value = serde_json::to_value(&injury).unwrap();
        assert!(value["injury_type"].is_null());
        assert!(value.get("reported_date").is_some());
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.name()), Some(table));
        }
        assert_eq!(Table::GameLineups.archive_name(), "archive_game_lineups");
        assert_eq!(Table::Players.view_name(), "v_all_players");
        assert!(Table::from_name("data_sync_logs").is_none());
    }
}
