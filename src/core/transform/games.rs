//! Daily games transform

use super::{TeamCollector, Transformed};
use crate::adapters::provider::models::GamesResponse;
use crate::domain::season::season_label_at;
use crate::domain::{Game, Venue};
use std::collections::BTreeMap;

/// Label used when no timestamp in the payload can place it in a season
const UNKNOWN_SEASON: &str = "unknown";

/// Normalizes a games payload
///
/// The season label of every game comes from the first game's start time
/// (falling back to the payload's `lastUpdatedOn`). Teams and venues seen in
/// the payload are returned deduplicated by id.
pub fn transform_games(response: &GamesResponse) -> Transformed<Game> {
    let season = response
        .games
        .first()
        .and_then(|entry| entry.schedule.start_time)
        .or(response.last_updated_on)
        .map(season_label_at)
        .unwrap_or_else(|| UNKNOWN_SEASON.to_string());

    let mut teams = TeamCollector::from_references(response.references.as_ref());
    let mut venues: BTreeMap<i64, Venue> = response
        .references
        .iter()
        .flat_map(|r| &r.venue_references)
        .map(|v| {
            (
                v.id,
                Venue {
                    id: v.id,
                    name: v.name.clone(),
                    city: v.city.clone(),
                },
            )
        })
        .collect();

    let mut entities = Vec::with_capacity(response.games.len());
    for entry in &response.games {
        let schedule = &entry.schedule;
        teams.add_ref(schedule.home_team.as_ref());
        teams.add_ref(schedule.away_team.as_ref());

        let venue_id = schedule.venue.as_ref().and_then(|v| v.id);
        if let Some(venue) = &schedule.venue {
            if let Some(id) = venue.id {
                venues.entry(id).or_insert_with(|| Venue {
                    id,
                    name: venue.name.clone(),
                    city: None,
                });
            }
        }
        let venue_name = schedule
            .venue
            .as_ref()
            .and_then(|v| v.name.clone())
            .or_else(|| venue_id.and_then(|id| venues.get(&id)).and_then(|v| v.name.clone()));

        entities.push(Game {
            id: schedule.id,
            game_date: schedule.start_time.map(|t| t.date_naive()),
            start_time: schedule.start_time,
            home_team_id: schedule.home_team.as_ref().and_then(|t| t.id),
            away_team_id: schedule.away_team.as_ref().and_then(|t| t.id),
            home_score: entry.score.as_ref().and_then(|s| s.home_score_total),
            away_score: entry.score.as_ref().and_then(|s| s.away_score_total),
            status: schedule
                .played_status
                .clone()
                .or_else(|| schedule.schedule_status.clone()),
            season: season.clone(),
            venue_id,
            venue_name,
        });
    }

    Transformed {
        entities,
        venues: venues.into_values().collect(),
        ..Transformed::default()
    }
    .with_teams(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn games_on(start: &str) -> GamesResponse {
        serde_json::from_value(json!({
            "games": [{
                "schedule": {
                    "id": 1,
                    "startTime": start,
                    "homeTeam": {"id": 1, "abbreviation": "BOS"},
                    "awayTeam": {"id": 2, "abbreviation": "NYK"}
                }
            }]
        }))
        .unwrap()
    }

    #[test_case("2025-09-30T23:00:00Z", "2024-25" ; "last day before rollover")]
    #[test_case("2025-10-01T00:00:00Z", "2025-26" ; "rollover day")]
    #[test_case("2000-01-15T00:30:00Z", "1999-00" ; "century wrap")]
    fn test_season_boundary(start: &str, expected: &str) {
        let out = transform_games(&games_on(start));
        assert_eq!(out.entities[0].season, expected);
    }

    #[test]
    fn test_teams_and_venues_deduplicated() {
        let response: GamesResponse = serde_json::from_value(json!({
            "games": [
                {
                    "schedule": {
                        "id": 10,
                        "startTime": "2024-12-25T17:00:00Z",
                        "homeTeam": {"id": 1, "abbreviation": "NY"},
                        "awayTeam": {"id": 2, "abbreviation": "SA"},
                        "venue": {"id": 100, "name": "Madison Square Garden"},
                        "playedStatus": "COMPLETED"
                    },
                    "score": {"homeScoreTotal": 117, "awayScoreTotal": 114}
                },
                {
                    "schedule": {
                        "id": 11,
                        "startTime": "2024-12-25T20:00:00Z",
                        "homeTeam": {"id": 1, "abbreviation": "NYK"},
                        "awayTeam": {"id": 3, "abbreviation": "PHI"},
                        "venue": {"id": 100}
                    }
                }
            ],
            "references": {
                "venueReferences": [{"id": 100, "name": "Madison Square Garden", "city": "New York"}]
            }
        }))
        .unwrap();

        let out = transform_games(&response);
        assert_eq!(out.entities.len(), 2);
        assert!(out.teams.is_empty());
        assert_eq!(out.team_stubs.len(), 3);
        assert_eq!(out.team_stubs[0].abbreviation, "NYK");
        assert_eq!(out.venues.len(), 1);
        assert_eq!(out.venues[0].city.as_deref(), Some("New York"));

        let first = &out.entities[0];
        assert_eq!(first.home_score, Some(117));
        assert_eq!(first.status.as_deref(), Some("COMPLETED"));
        assert_eq!(first.season, "2024-25");
        assert_eq!(out.entities[1].venue_name.as_deref(), Some("Madison Square Garden"));
        assert!(out.entities[1].home_score.is_none());
    }

    #[test]
    fn test_game_without_id_is_kept_for_the_storage_guard() {
        let response: GamesResponse = serde_json::from_value(json!({
            "games": [{"schedule": {"startTime": "2024-11-01T00:00:00Z"}}]
        }))
        .unwrap();

        let out = transform_games(&response);
        assert_eq!(out.entities.len(), 1);
        assert!(out.entities[0].id.is_none());
    }

    #[test]
    fn test_empty_payload() {
        let out = transform_games(&GamesResponse {
            last_updated_on: None,
            games: vec![],
            references: None,
        });
        assert!(out.entities.is_empty());
        assert!(out.teams.is_empty());
    }
}
