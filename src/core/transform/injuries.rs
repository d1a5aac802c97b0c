//! Injury report transform

use super::{TeamCollector, Transformed};
use crate::adapters::provider::models::InjuriesResponse;
use crate::domain::Injury;
use sha2::{Digest, Sha256};

/// Stable injury id for reports the provider did not number
///
/// Derived from the player id and the injury description so that re-syncing
/// the same report updates the existing row.
pub fn derive_injury_id(player_id: i64, description: Option<&str>) -> i64 {
    let mut hasher = Sha256::new();
    hasher.update(player_id.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(description.unwrap_or_default().trim().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let id = i64::from_be_bytes(bytes) & i64::MAX;
    id.max(1)
}

/// Normalizes an injury listing
///
/// Only players carrying a `currentInjury` produce a row. The report date is
/// the injury's start date, or the payload's `lastUpdatedOn` date when absent.
pub fn transform_injuries(response: &InjuriesResponse) -> Transformed<Injury> {
    let mut teams = TeamCollector::from_references(response.references.as_ref());
    let reported_fallback = response.last_updated_on.map(|ts| ts.date_naive());
    let mut entities = Vec::new();

    for entry in &response.players {
        let player = entry.player();
        let Some(injury) = &player.current_injury else {
            continue;
        };
        teams.add_ref(entry.team());

        entities.push(Injury {
            id: injury
                .id
                .unwrap_or_else(|| derive_injury_id(player.id, injury.description.as_deref())),
            player_id: player.id,
            injury_type: injury.description.clone(),
            status: injury.playing_probability.clone(),
            reported_date: injury.start_date.or(reported_fallback),
        });
    }

    Transformed {
        entities,
        ..Transformed::default()
    }
    .with_teams(teams)
}
