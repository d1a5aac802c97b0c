//! DFS projection and daily DFS transforms

use super::{team_id_or_abbreviation, TeamCollector, Transformed};
use crate::adapters::provider::models::{
    DailyDfsResponse, DfsProjectionsResponse, DfsRow, FantasyPoints, FantasyPointsValue,
    ProjectionEntry,
};
use crate::domain::{DailyDfsEntry, DfsProjection, RowFailure, SourcePoints, Table};

/// Projected points per $1,000 of salary
///
/// Only defined for a positive salary and known points. The ratio is kept
/// at full precision.
///
/// # Examples
///
/// ```
/// use courtsync::core::transform::value_score;
///
/// assert_eq!(value_score(Some(8000), Some(40.0)), Some(5.0));
/// assert_eq!(value_score(Some(0), Some(40.0)), None);
/// assert_eq!(value_score(Some(8000), None), None);
/// ```
pub fn value_score(salary: Option<i32>, points: Option<f64>) -> Option<f64> {
    match (salary, points) {
        (Some(salary), Some(points)) if salary > 0 => Some(points / (f64::from(salary) / 1000.0)),
        _ => None,
    }
}

fn salary(value: Option<f64>) -> Option<i32> {
    value
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

fn source_points(
    fantasy_points: Option<&FantasyPoints>,
    default_source: Option<&String>,
) -> Vec<SourcePoints> {
    match fantasy_points {
        None => Vec::new(),
        Some(FantasyPoints::Single(points)) => vec![SourcePoints {
            source: default_source.cloned(),
            points: *points,
        }],
        Some(FantasyPoints::Many(values)) => values
            .iter()
            .filter_map(|value| match value {
                FantasyPointsValue::Plain(points) => Some(SourcePoints {
                    source: default_source.cloned(),
                    points: *points,
                }),
                FantasyPointsValue::Sourced { source, points } => points.map(|points| SourcePoints {
                    source: source.clone().or_else(|| default_source.cloned()),
                    points,
                }),
            })
            .collect(),
    }
}

fn projection(entry: &ProjectionEntry) -> Result<DfsProjection, RowFailure> {
    let table = Table::DfsProjections.name();
    let player_id = entry
        .player
        .id
        .ok_or_else(|| RowFailure::new(table, "projection without player id"))?;
    let game_id = entry
        .game
        .as_ref()
        .and_then(|g| g.id)
        .ok_or_else(|| {
            RowFailure::new(table, "projection without game id").with_key(player_id.to_string())
        })?;
    let (team_id, team_abbreviation) = team_id_or_abbreviation(entry.team.as_ref());

    let by_source = source_points(entry.fantasy_points.as_ref(), entry.dfs_source.as_ref());
    let projected_points = by_source.first().map(|p| p.points);
    let salary = salary(entry.salary);

    Ok(DfsProjection {
        player_id,
        game_id,
        team_id,
        dfs_source: entry.dfs_source.clone(),
        salary,
        projected_points,
        fantasy_points_by_source: by_source,
        ownership_pct: entry.ownership_pct,
        value_score: value_score(salary, projected_points),
        team_abbreviation,
    })
}

/// Normalizes a DFS projections payload
///
/// When an entry carries fantasy points from several sources, the first one
/// is the projection used for `value_score`.
pub fn transform_dfs_projections(response: &DfsProjectionsResponse) -> Transformed<DfsProjection> {
    let mut teams = TeamCollector::default();
    let mut out = Transformed::default();

    for entry in &response.projections {
        teams.add_ref(entry.team.as_ref());
        match projection(entry) {
            Ok(projection) => out.entities.push(projection),
            Err(failure) => out.rejected.push(failure),
        }
    }

    out.with_teams(teams)
}

fn daily_entry(source: &str, row: &DfsRow) -> Result<DailyDfsEntry, RowFailure> {
    let table = Table::DailyDfsData.name();
    let player = row
        .player
        .as_ref()
        .ok_or_else(|| RowFailure::new(table, format!("{source} row without player")))?;
    let player_id = player
        .id
        .ok_or_else(|| RowFailure::new(table, format!("{source} row without player id")))?;
    let game = row.game.as_ref();
    let game_id = game.and_then(|g| g.id).ok_or_else(|| {
        RowFailure::new(table, format!("{source} row without game id"))
            .with_key(player_id.to_string())
    })?;
    let (team_id, team_abbreviation) = team_id_or_abbreviation(row.team.as_ref());

    Ok(DailyDfsEntry {
        player_id,
        game_id,
        dfs_source: source.to_string(),
        team_id,
        slate_date: game.and_then(|g| g.start_time).map(|t| t.date_naive()),
        position: player.position.clone(),
        salary: salary(row.salary),
        fantasy_points: row.fantasy_points,
        team_abbreviation,
    })
}

/// Normalizes a daily DFS payload into one row per player, game and source
pub fn transform_daily_dfs(response: &DailyDfsResponse) -> Transformed<DailyDfsEntry> {
    let mut teams = TeamCollector::default();
    let mut out = Transformed::default();

    for source in &response.dfs_entries {
        for row in &source.dfs_rows {
            teams.add_ref(row.team.as_ref());
            match daily_entry(&source.dfs_source, row) {
                Ok(entry) => out.entities.push(entry),
                Err(failure) => out.rejected.push(failure),
            }
        }
    }

    out.with_teams(teams)
}
