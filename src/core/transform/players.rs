//! Player listing transform

use super::{team_id_or_abbreviation, TeamCollector, Transformed};
use crate::adapters::provider::models::{ExternalMappingPayload, PlayersResponse};
use crate::domain::{ExternalMapping, Player};

fn external_mapping(payload: &ExternalMappingPayload) -> ExternalMapping {
    let id = match &payload.id {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    ExternalMapping {
        source: payload.source.clone(),
        id,
    }
}

/// Normalizes a players payload into player rows plus the teams they reference
pub fn transform_players(response: &PlayersResponse) -> Transformed<Player> {
    let mut teams = TeamCollector::from_references(response.references.as_ref());
    let mut entities = Vec::with_capacity(response.players.len());

    for entry in &response.players {
        let payload = entry.player();
        let team = entry.team();
        teams.add_ref(team);
        let (current_team_id, team_abbreviation) = team_id_or_abbreviation(team);

        entities.push(Player {
            id: payload.id,
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            position: payload.primary_position.clone(),
            jersey_number: payload.jersey_number,
            current_team_id,
            roster_status: payload.current_roster_status.clone(),
            height: payload.height.clone(),
            weight: payload.weight,
            birth_date: payload.birth_date,
            birth_city: payload.birth_city.clone(),
            birth_country: payload.birth_country.clone(),
            rookie: payload.rookie,
            external_mappings: payload.external_mappings.iter().map(external_mapping).collect(),
            team_abbreviation,
        });
    }

    Transformed {
        entities,
        ..Transformed::default()
    }
    .with_teams(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> PlayersResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_players_with_references() {
        let response = parse(json!({
            "players": [
                {
                    "player": {
                        "id": 9158,
                        "firstName": "Shai",
                        "lastName": "Gilgeous-Alexander",
                        "primaryPosition": "PG",
                        "jerseyNumber": 2,
                        "currentTeam": {"id": 96, "abbreviation": "OKL"},
                        "currentRosterStatus": "ROSTER",
                        "externalMappings": [{"source": "NBA.com", "id": 1628983}]
                    },
                    "teamAsOfDate": {"id": 96, "abbreviation": "OKL"}
                }
            ],
            "references": {
                "teamReferences": [
                    {"id": 96, "abbreviation": "OKL", "city": "Oklahoma City", "name": "Thunder"}
                ]
            }
        }));

        let out = transform_players(&response);
        assert_eq!(out.entities.len(), 1);
        let player = &out.entities[0];
        assert_eq!(player.current_team_id, Some(96));
        assert_eq!(player.position.as_deref(), Some("PG"));
        assert_eq!(player.external_mappings[0].id, "1628983");
        assert!(player.team_abbreviation.is_none());

        assert_eq!(out.teams.len(), 1);
        assert_eq!(out.teams[0].abbreviation, "OKC");
        assert_eq!(out.teams[0].city.as_deref(), Some("Oklahoma City"));
    }

    #[test]
    fn test_missing_optionals_are_null_or_empty() {
        let response = parse(json!({
            "players": [{"id": 1, "firstName": "Free", "lastName": "Agent"}]
        }));

        let out = transform_players(&response);
        let player = &out.entities[0];
        assert!(player.current_team_id.is_none());
        assert!(player.birth_date.is_none());
        assert!(player.external_mappings.is_empty());
        assert!(out.teams.is_empty());

        let row = serde_json::to_value(player).unwrap();
        assert!(row["jersey_number"].is_null());
        assert_eq!(row["external_mappings"], json!([]));
    }

    #[test]
    fn test_team_without_id_is_resolved_later() {
        let response = parse(json!({
            "players": [{
                "id": 2, "firstName": "A", "lastName": "B",
                "currentTeam": {"abbreviation": "BRO"}
            }]
        }));

        let out = transform_players(&response);
        assert_eq!(out.entities[0].team_abbreviation.as_deref(), Some("BRO"));
        assert!(out.teams.is_empty());
    }
}
