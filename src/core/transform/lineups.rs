//! Game lineup transform

use super::{TeamCollector, Transformed};
use crate::adapters::provider::models::{Lineup, LineupResponse};
use crate::domain::{GameLineupEntry, RowFailure, Table};

const EXPECTED: &str = "expected";
const ACTUAL: &str = "actual";

/// Normalizes a lineup payload into one row per filled slot
///
/// Empty slots are not rows. Slots of a team without an id are rejected.
pub fn transform_lineup(response: &LineupResponse) -> Transformed<GameLineupEntry> {
    let table = Table::GameLineups.name();
    let mut out = Transformed::default();
    let mut teams = TeamCollector::default();

    let Some(game_id) = response.game.id else {
        out.rejected
            .push(RowFailure::new(table, "lineup payload without game id"));
        return out;
    };

    for team_lineup in &response.team_lineups {
        teams.add_ref(Some(&team_lineup.team));
        let lineups: [(&str, Option<&Lineup>); 2] = [
            (EXPECTED, team_lineup.expected.as_ref()),
            (ACTUAL, team_lineup.actual.as_ref()),
        ];

        for (lineup_type, lineup) in lineups {
            let Some(lineup) = lineup else { continue };
            for slot in &lineup.lineup_positions {
                let Some(player_id) = slot.player.as_ref().and_then(|p| p.id) else {
                    continue;
                };
                let Some(team_id) = team_lineup.team.id else {
                    out.rejected.push(
                        RowFailure::new(table, "lineup slot for a team without id")
                            .with_key(format!("{game_id}/{lineup_type}/{}", slot.position)),
                    );
                    continue;
                };
                out.entities.push(GameLineupEntry {
                    game_id,
                    team_id,
                    lineup_type: lineup_type.to_string(),
                    position: slot.position.clone(),
                    player_id,
                });
            }
        }
    }

    out.with_teams(teams)
}
