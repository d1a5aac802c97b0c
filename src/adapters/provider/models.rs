//! Provider payload models
//!
//! Typed views of the provider's JSON responses. Every response is checked
//! against these shapes on ingress; a mismatch is a validation error for the
//! whole payload. Optional upstream fields are `Option` or default to empty
//! collections so absent data never fails deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Minimal team reference embedded in other entities
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

/// Full team entry from the `references.teamReferences` block
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReference {
    pub id: i64,
    pub abbreviation: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueReference {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Shared `references` block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct References {
    #[serde(default)]
    pub team_references: Vec<TeamReference>,
    #[serde(default)]
    pub venue_references: Vec<VenueReference>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMappingPayload {
    pub source: String,
    pub id: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub playing_probability: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub primary_position: Option<String>,
    #[serde(default)]
    pub jersey_number: Option<i32>,
    #[serde(default)]
    pub current_team: Option<TeamRef>,
    #[serde(default)]
    pub current_roster_status: Option<String>,
    #[serde(default)]
    pub current_injury: Option<InjuryPayload>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub birth_city: Option<String>,
    #[serde(default)]
    pub birth_country: Option<String>,
    #[serde(default)]
    pub rookie: Option<bool>,
    #[serde(default)]
    pub external_mappings: Vec<ExternalMappingPayload>,
}

/// A player listing entry, either `{ "player": {...} }` or the player itself
///
/// The wrapped form is tried first, so when an entry carries both a `player`
/// object and top-level player fields the inner object wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlayerEntry {
    Wrapped {
        player: PlayerPayload,
        #[serde(default, rename = "teamAsOfDate")]
        team_as_of_date: Option<TeamRef>,
    },
    Bare(PlayerPayload),
}

impl PlayerEntry {
    pub fn player(&self) -> &PlayerPayload {
        match self {
            PlayerEntry::Wrapped { player, .. } => player,
            PlayerEntry::Bare(player) => player,
        }
    }

    /// Team as of the request date, falling back to the player's current team
    pub fn team(&self) -> Option<&TeamRef> {
        match self {
            PlayerEntry::Wrapped {
                team_as_of_date: Some(team),
                ..
            } => Some(team),
            _ => self.player().current_team.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
    #[serde(default)]
    pub references: Option<References>,
}

/// Injury listings share the players shape
pub type InjuriesResponse = PlayersResponse;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub away_team: Option<TeamRef>,
    #[serde(default)]
    pub home_team: Option<TeamRef>,
    #[serde(default)]
    pub venue: Option<VenueRef>,
    #[serde(default)]
    pub played_status: Option<String>,
    #[serde(default)]
    pub schedule_status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default)]
    pub away_score_total: Option<i32>,
    #[serde(default)]
    pub home_score_total: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    pub schedule: Schedule,
    #[serde(default)]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub games: Vec<GameEntry>,
    #[serde(default)]
    pub references: Option<References>,
}

/// Game reference embedded in game logs and DFS rows
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// Player reference embedded in game logs, DFS rows and lineups
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGoalStats {
    pub fg_made: Option<i32>,
    pub fg_att: Option<i32>,
    pub fg3_pt_made: Option<i32>,
    pub fg3_pt_att: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeThrowStats {
    pub ft_made: Option<i32>,
    pub ft_att: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReboundStats {
    pub off_reb: Option<i32>,
    pub def_reb: Option<i32>,
    pub reb: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffenseStats {
    pub ast: Option<i32>,
    pub pts: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseStats {
    pub stl: Option<i32>,
    pub blk: Option<i32>,
    pub tov: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscStats {
    pub min_seconds: Option<i32>,
    pub fouls: Option<i32>,
    pub plus_minus: Option<i32>,
    pub games_started: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogStats {
    #[serde(default)]
    pub field_goals: Option<FieldGoalStats>,
    #[serde(default)]
    pub free_throws: Option<FreeThrowStats>,
    #[serde(default)]
    pub rebounds: Option<ReboundStats>,
    #[serde(default)]
    pub offense: Option<OffenseStats>,
    #[serde(default)]
    pub defense: Option<DefenseStats>,
    #[serde(default)]
    pub miscellaneous: Option<MiscStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogEntry {
    pub game: GameRef,
    pub player: PlayerRef,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub stats: Option<GameLogStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogsResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gamelogs: Vec<GameLogEntry>,
    #[serde(default)]
    pub references: Option<References>,
}

/// Fantasy points from one scoring source
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FantasyPointsValue {
    Plain(f64),
    Sourced {
        #[serde(default, alias = "dfsSource")]
        source: Option<String>,
        #[serde(default, alias = "value", alias = "fantasyPoints")]
        points: Option<f64>,
    },
}

/// A single number, or one value per scoring source
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FantasyPoints {
    Single(f64),
    Many(Vec<FantasyPointsValue>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionEntry {
    pub player: PlayerRef,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub game: Option<GameRef>,
    #[serde(default)]
    pub dfs_source: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub fantasy_points: Option<FantasyPoints>,
    #[serde(default, alias = "ownership")]
    pub ownership_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfsProjectionsResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default, alias = "dfsProjections")]
    pub projections: Vec<ProjectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfsRow {
    #[serde(default)]
    pub player: Option<PlayerRef>,
    #[serde(default)]
    pub team: Option<TeamRef>,
    #[serde(default)]
    pub game: Option<GameRef>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub fantasy_points: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfsSourceEntry {
    pub dfs_source: String,
    #[serde(default)]
    pub dfs_type: Option<String>,
    #[serde(default)]
    pub dfs_rows: Vec<DfsRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDfsResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dfs_entries: Vec<DfsSourceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupPosition {
    pub position: String,
    #[serde(default)]
    pub player: Option<PlayerRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    #[serde(default)]
    pub lineup_positions: Vec<LineupPosition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub team: TeamRef,
    #[serde(default)]
    pub expected: Option<Lineup>,
    #[serde(default)]
    pub actual: Option<Lineup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupResponse {
    #[serde(default)]
    pub last_updated_on: Option<DateTime<Utc>>,
    pub game: GameRef,
    #[serde(default)]
    pub team_lineups: Vec<TeamLineup>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_entry_wrapped_and_bare() {
        let wrapped: PlayerEntry = serde_json::from_value(json!({
            "player": {"id": 1, "firstName": "Nikola", "lastName": "Jokic"},
            "teamAsOfDate": {"id": 7, "abbreviation": "DEN"}
        }))
        .unwrap();
        assert_eq!(wrapped.player().id, 1);
        assert_eq!(wrapped.team().and_then(|t| t.id), Some(7));

        let bare: PlayerEntry = serde_json::from_value(json!({
            "id": 2, "firstName": "Jamal", "lastName": "Murray",
            "currentTeam": {"id": 7, "abbreviation": "DEN"}
        }))
        .unwrap();
        assert_eq!(bare.player().id, 2);
        assert_eq!(bare.team().and_then(|t| t.abbreviation.as_deref()), Some("DEN"));
    }

    #[test]
    fn test_inner_player_wins_when_both_shapes_present() {
        let entry: PlayerEntry = serde_json::from_value(json!({
            "id": 99, "firstName": "Outer", "lastName": "Envelope",
            "player": {"id": 3, "firstName": "Inner", "lastName": "Entity"}
        }))
        .unwrap();
        assert_eq!(entry.player().id, 3);
        assert_eq!(entry.player().first_name, "Inner");
    }

    #[test]
    fn test_fantasy_points_shapes() {
        let single: FantasyPoints = serde_json::from_value(json!(41.5)).unwrap();
        assert!(matches!(single, FantasyPoints::Single(p) if p == 41.5));

        let many: FantasyPoints = serde_json::from_value(json!([
            {"source": "DraftKings", "points": 40.25},
            {"dfsSource": "FanDuel", "value": 38.0},
            12.0
        ]))
        .unwrap();
        match many {
            FantasyPoints::Many(values) => assert_eq!(values.len(), 3),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn test_game_log_stats_field_names() {
        let stats: GameLogStats = serde_json::from_value(json!({
            "fieldGoals": {"fgMade": 10, "fgAtt": 18, "fg3PtMade": 3, "fg3PtAtt": 7},
            "rebounds": {"offReb": 2, "defReb": 9, "reb": 11},
            "miscellaneous": {"minSeconds": 2100, "plusMinus": -4, "gamesStarted": 1}
        }))
        .unwrap();
        let fg = stats.field_goals.unwrap();
        assert_eq!(fg.fg3_pt_made, Some(3));
        assert_eq!(stats.rebounds.unwrap().reb, Some(11));
        assert_eq!(stats.miscellaneous.unwrap().min_seconds, Some(2100));
    }

    #[test]
    fn test_games_response_missing_arrays_default_empty() {
        let response: GamesResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.games.is_empty());
        assert!(response.references.is_none());
    }
}
