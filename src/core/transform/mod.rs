//! Response transformation
//!
//! Pure functions turning validated provider payloads into normalized
//! storage records. No I/O happens here. Each transform returns the primary
//! entities together with the teams and venues it discovered along the way,
//! deduplicated by external id.
//!
//! Entries that cannot produce a keyed record (a game log without a game id,
//! for example) are returned in [`Transformed::rejected`] so the caller can
//! count them as row errors.

pub mod dfs;
pub mod game_logs;
pub mod games;
pub mod injuries;
pub mod lineups;
pub mod players;

pub use dfs::{transform_daily_dfs, transform_dfs_projections, value_score};
pub use game_logs::{fantasy_points, transform_game_logs};
pub use games::transform_games;
pub use injuries::{derive_injury_id, transform_injuries};
pub use lineups::transform_lineup;
pub use players::transform_players;

use crate::adapters::provider::models::{References, TeamRef, TeamReference};
use crate::domain::teams::normalize_abbreviation;
use crate::domain::{RowFailure, Team, Venue};
use std::collections::BTreeMap;

/// Output of one transform call
#[derive(Debug, Clone)]
pub struct Transformed<T> {
    pub entities: Vec<T>,
    /// Teams described by the payload's team references, one per id
    pub teams: Vec<Team>,
    /// Teams only known by id and abbreviation; written only when absent
    pub team_stubs: Vec<Team>,
    /// Venues referenced by the payload, one per id
    pub venues: Vec<Venue>,
    /// Entries that could not be normalized
    pub rejected: Vec<RowFailure>,
}

impl<T> Default for Transformed<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            teams: Vec::new(),
            team_stubs: Vec::new(),
            venues: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Transformed<T> {
    /// Entries seen in the payload, rejected ones included
    pub fn total(&self) -> usize {
        self.entities.len() + self.rejected.len()
    }

    /// Moves the collected teams and stubs into this output
    pub(crate) fn with_teams(mut self, collector: TeamCollector) -> Self {
        let (teams, stubs) = collector.into_parts();
        self.teams = teams;
        self.team_stubs = stubs;
        self
    }
}

/// Accumulates teams by id; full reference entries win over bare stubs
#[derive(Debug, Default)]
pub(crate) struct TeamCollector {
    teams: BTreeMap<i64, Team>,
    stubs: BTreeMap<i64, Team>,
}

impl TeamCollector {
    pub(crate) fn from_references(references: Option<&References>) -> Self {
        let mut collector = Self::default();
        for reference in references.into_iter().flat_map(|r| &r.team_references) {
            collector.add_reference(reference);
        }
        collector
    }

    pub(crate) fn add_reference(&mut self, reference: &TeamReference) {
        self.stubs.remove(&reference.id);
        self.teams.insert(
            reference.id,
            Team {
                id: reference.id,
                abbreviation: normalize_abbreviation(&reference.abbreviation),
                city: reference.city.clone(),
                name: reference.name.clone(),
                conference: reference.conference.clone(),
                division: reference.division.clone(),
            },
        );
    }

    /// Adds a stub for a bare team reference that carries both id and abbreviation
    pub(crate) fn add_ref(&mut self, team: Option<&TeamRef>) {
        let Some(TeamRef {
            id: Some(id),
            abbreviation: Some(abbreviation),
        }) = team
        else {
            return;
        };
        if self.teams.contains_key(id) {
            return;
        }
        self.stubs.entry(*id).or_insert_with(|| Team {
            id: *id,
            abbreviation: normalize_abbreviation(abbreviation),
            city: None,
            name: None,
            conference: None,
            division: None,
        });
    }

    /// Referenced teams and stubs, each ordered by id
    pub(crate) fn into_parts(self) -> (Vec<Team>, Vec<Team>) {
        (
            self.teams.into_values().collect(),
            self.stubs.into_values().collect(),
        )
    }
}

/// Team id when present, otherwise the abbreviation to resolve at write time
pub(crate) fn team_id_or_abbreviation(team: Option<&TeamRef>) -> (Option<i64>, Option<String>) {
    match team {
        Some(TeamRef { id: Some(id), .. }) => (Some(*id), None),
        Some(TeamRef {
            id: None,
            abbreviation,
        }) => (None, abbreviation.clone()),
        None => (None, None),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_ref(id: Option<i64>, abbreviation: Option<&str>) -> TeamRef {
        TeamRef {
            id,
            abbreviation: abbreviation.map(str::to_string),
        }
    }

    #[test]
    fn test_reference_wins_over_stub() {
        let references = References {
            team_references: vec![TeamReference {
                id: 96,
                abbreviation: "OKL".to_string(),
                city: Some("Oklahoma City".to_string()),
                name: Some("Thunder".to_string()),
                conference: None,
                division: None,
            }],
            venue_references: vec![],
        };

        let mut collector = TeamCollector::from_references(Some(&references));
        collector.add_ref(Some(&team_ref(Some(96), Some("OKC"))));
        collector.add_ref(Some(&team_ref(Some(84), Some("BRO"))));
        collector.add_ref(Some(&team_ref(None, Some("LAL"))));

        let (teams, stubs) = collector.into_parts();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].abbreviation, "OKC");
        assert_eq!(teams[0].name.as_deref(), Some("Thunder"));
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].abbreviation, "BKN");
        assert!(stubs[0].city.is_none());
    }

    #[test]
    fn test_team_id_or_abbreviation() {
        assert_eq!(
            team_id_or_abbreviation(Some(&team_ref(Some(5), Some("BOS")))),
            (Some(5), None)
        );
        assert_eq!(
            team_id_or_abbreviation(Some(&team_ref(None, Some("BRO")))),
            (None, Some("BRO".to_string()))
        );
        assert_eq!(team_id_or_abbreviation(None), (None, None));
    }
}
