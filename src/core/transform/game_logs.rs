//! Player game log transform and fantasy scoring

use super::{round2, team_id_or_abbreviation, TeamCollector, Transformed};
use crate::adapters::provider::models::{GameLogEntry, GameLogsResponse};
use crate::domain::{GameLog, RowFailure, Table};

/// DraftKings classic scoring weights
mod scoring {
    pub const POINT: f64 = 1.0;
    pub const THREE_POINTER: f64 = 0.5;
    pub const REBOUND: f64 = 1.25;
    pub const ASSIST: f64 = 1.5;
    pub const STEAL: f64 = 2.0;
    pub const BLOCK: f64 = 2.0;
    pub const TURNOVER: f64 = -0.5;
    pub const DOUBLE_DOUBLE: f64 = 1.5;
    pub const TRIPLE_DOUBLE: f64 = 3.0;
}

/// DraftKings fantasy points for a stat line
///
/// Returns `None` when the log carries no scoring stats at all.
///
/// # Examples
///
/// ```
/// use courtsync::core::transform::fantasy_points;
/// use courtsync::domain::GameLog;
///
/// let log = GameLog {
///     points: Some(30),
///     rebounds: Some(10),
///     assists: Some(5),
///     ..GameLog::default()
/// };
/// // 30 + 12.5 + 7.5 + 1.5 double-double bonus
/// assert_eq!(fantasy_points(&log), Some(51.5));
/// ```
pub fn fantasy_points(log: &GameLog) -> Option<f64> {
    let stats = [
        log.points,
        log.three_pointers_made,
        log.rebounds,
        log.assists,
        log.steals,
        log.blocks,
        log.turnovers,
    ];
    if stats.iter().all(Option::is_none) {
        return None;
    }

    let value = |stat: Option<i32>| f64::from(stat.unwrap_or(0));
    let mut total = value(log.points) * scoring::POINT
        + value(log.three_pointers_made) * scoring::THREE_POINTER
        + value(log.rebounds) * scoring::REBOUND
        + value(log.assists) * scoring::ASSIST
        + value(log.steals) * scoring::STEAL
        + value(log.blocks) * scoring::BLOCK
        + value(log.turnovers) * scoring::TURNOVER;

    let double_digit = [log.points, log.rebounds, log.assists, log.steals, log.blocks]
        .into_iter()
        .filter(|stat| stat.unwrap_or(0) >= 10)
        .count();
    if double_digit >= 2 {
        total += scoring::DOUBLE_DOUBLE;
    }
    if double_digit >= 3 {
        total += scoring::TRIPLE_DOUBLE;
    }

    Some(round2(total))
}

fn game_log(entry: &GameLogEntry) -> Result<GameLog, RowFailure> {
    let player_id = entry.player.id.ok_or_else(|| {
        RowFailure::new(Table::PlayerGameLogs.name(), "game log without player id")
    })?;
    let game_id = entry.game.id.ok_or_else(|| {
        RowFailure::new(Table::PlayerGameLogs.name(), "game log without game id")
            .with_key(player_id.to_string())
    })?;
    let (team_id, team_abbreviation) = team_id_or_abbreviation(entry.team.as_ref());

    let stats = entry.stats.clone().unwrap_or_default();
    let field_goals = stats.field_goals.unwrap_or_default();
    let free_throws = stats.free_throws.unwrap_or_default();
    let rebounds = stats.rebounds.unwrap_or_default();
    let offense = stats.offense.unwrap_or_default();
    let defense = stats.defense.unwrap_or_default();
    let misc = stats.miscellaneous.unwrap_or_default();

    let total_rebounds = rebounds.reb.or(match (rebounds.off_reb, rebounds.def_reb) {
        (Some(off), Some(def)) => Some(off + def),
        _ => None,
    });

    let mut log = GameLog {
        player_id,
        game_id,
        team_id,
        minutes: misc.min_seconds.map(|secs| round2(f64::from(secs) / 60.0)),
        points: offense.pts,
        rebounds: total_rebounds,
        offensive_rebounds: rebounds.off_reb,
        defensive_rebounds: rebounds.def_reb,
        assists: offense.ast,
        steals: defense.stl,
        blocks: defense.blk,
        turnovers: defense.tov,
        personal_fouls: misc.fouls,
        field_goals_made: field_goals.fg_made,
        field_goals_attempted: field_goals.fg_att,
        three_pointers_made: field_goals.fg3_pt_made,
        three_pointers_attempted: field_goals.fg3_pt_att,
        free_throws_made: free_throws.ft_made,
        free_throws_attempted: free_throws.ft_att,
        plus_minus: misc.plus_minus,
        started: misc.games_started.map(|started| started > 0),
        fantasy_points: None,
        team_abbreviation,
    };
    log.fantasy_points = fantasy_points(&log);

    Ok(log)
}

/// Normalizes a game logs payload
pub fn transform_game_logs(response: &GameLogsResponse) -> Transformed<GameLog> {
    let mut teams = TeamCollector::from_references(response.references.as_ref());
    let mut out = Transformed::default();

    for entry in &response.gamelogs {
        teams.add_ref(entry.team.as_ref());
        match game_log(entry) {
            Ok(log) => out.entities.push(log),
            Err(failure) => out.rejected.push(failure),
        }
    }

    out.with_teams(teams)
}
