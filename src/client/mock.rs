//! Mock provider client for testing
//!
//! Serves canned responses keyed by request parameters and counts calls, so
//! tests can check what reached the "network".

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use super::FootballApi;
use super::models::{CountryInfo, LeagueCandidate, LeagueInfo, RawFixture, SeasonInfo, StandingRow};
use crate::error::{ApiError, Result};

/// Calls received, per endpoint
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub search_leagues: usize,
    pub standings: usize,
    pub fixtures: usize,
}

/// Mock API client.
///
/// ```ignore
/// let mock = MockFootballClient::new()
///     .with_league("Serie A", "Brazil", vec![league_candidate(71, "Serie A", 2025)])
///     .with_fixtures(71, 2025, vec![raw_fixture("Santos", "Bahia", "2025-08-09T19:00:00+00:00")]);
/// ```
#[derive(Default)]
pub struct MockFootballClient {
    leagues: HashMap<(String, String), Vec<LeagueCandidate>>,
    standings: HashMap<(i64, i32), Vec<Vec<StandingRow>>>,
    fixtures: HashMap<(i64, i32), Vec<RawFixture>>,
    /// League ids whose standings/fixtures calls fail
    failing_leagues: Vec<i64>,
    calls: Mutex<CallCounts>,
    fixture_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl MockFootballClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_league(mut self, name: &str, country: &str, candidates: Vec<LeagueCandidate>) -> Self {
        self.leagues
            .insert((name.to_string(), country.to_string()), candidates);
        self
    }

    pub fn with_standings(mut self, league_id: i64, season: i32, groups: Vec<Vec<StandingRow>>) -> Self {
        self.standings.insert((league_id, season), groups);
        self
    }

    pub fn with_fixtures(mut self, league_id: i64, season: i32, fixtures: Vec<RawFixture>) -> Self {
        self.fixtures.insert((league_id, season), fixtures);
        self
    }

    pub fn failing_league(mut self, league_id: i64) -> Self {
        self.failing_leagues.push(league_id);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.lock().unwrap().clone()
    }

    /// `from`/`to` of every fixtures call, in order
    pub fn fixture_ranges(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.fixture_ranges.lock().unwrap().clone()
    }

    fn check_failing(&self, league_id: i64) -> Result<()> {
        if self.failing_leagues.contains(&league_id) {
            return Err(ApiError::ServerError(format!("league {} unavailable", league_id)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl FootballApi for MockFootballClient {
    async fn search_leagues(&self, name: &str, country: &str) -> Result<Vec<LeagueCandidate>> {
        self.calls.lock().unwrap().search_leagues += 1;
        Ok(self
            .leagues
            .get(&(name.to_string(), country.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn standings(&self, league_id: i64, season: i32) -> Result<Vec<Vec<StandingRow>>> {
        self.calls.lock().unwrap().standings += 1;
        self.check_failing(league_id)?;
        Ok(self.standings.get(&(league_id, season)).cloned().unwrap_or_default())
    }

    async fn fixtures(
        &self,
        league_id: i64,
        season: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawFixture>> {
        self.calls.lock().unwrap().fixtures += 1;
        self.fixture_ranges.lock().unwrap().push((from, to));
        self.check_failing(league_id)?;
        Ok(self.fixtures.get(&(league_id, season)).cloned().unwrap_or_default())
    }
}

/// A "League" search candidate whose only season is current
pub fn league_candidate(id: i64, name: &str, season: i32) -> LeagueCandidate {
    LeagueCandidate {
        league: LeagueInfo {
            id,
            name: name.to_string(),
            kind: "League".to_string(),
        },
        country: CountryInfo {
            name: "Testland".to_string(),
        },
        seasons: vec![SeasonInfo {
            year: season,
            current: true,
        }],
    }
}

fn wdl_record(wdl: (u32, u32, u32)) -> Value {
    json!({"win": wdl.0, "draw": wdl.1, "lose": wdl.2})
}

/// A standings row with explicit overall/home/away records
pub fn standing_row(
    team: &str,
    all: (u32, u32, u32),
    home: (u32, u32, u32),
    away: (u32, u32, u32),
) -> StandingRow {
    serde_json::from_value(json!({
        "team": {"name": team},
        "all": wdl_record(all),
        "home": wdl_record(home),
        "away": wdl_record(away),
    }))
    .unwrap()
}

/// A fixture between two named teams
pub fn raw_fixture(home: &str, away: &str, date: &str) -> RawFixture {
    serde_json::from_value(json!({
        "fixture": {"date": date},
        "teams": {"home": {"name": home}, "away": {"name": away}},
    }))
    .unwrap()
}
