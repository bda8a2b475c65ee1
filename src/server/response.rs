//! JSON shapes returned by the HTTP API

use chrono::SecondsFormat;
use serde::Serialize;

use crate::aggregate::{AggregationReport, Fixture, LeagueFailure};

/// One ranked fixture as the browser client reads it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureView {
    pub league: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    pub home: String,
    pub away: String,
    pub overall_home: String,
    pub overall_away: String,
    #[serde(rename = "homeWDL")]
    pub home_wdl: String,
    #[serde(rename = "awayWDL")]
    pub away_wdl: String,
}

impl From<&Fixture> for FixtureView {
    fn from(f: &Fixture) -> Self {
        let date_iso = match f.kickoff {
            Some(kickoff) => kickoff.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => f.kickoff_raw.clone(),
        };

        Self {
            league: f.league.clone(),
            date_iso,
            home: f.home.clone(),
            away: f.away.clone(),
            overall_home: f.home_overall.to_string(),
            overall_away: f.away_overall.to_string(),
            home_wdl: f.home_split.to_string(),
            away_wdl: f.away_split.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FailureView {
    pub league: String,
    pub error: String,
}

impl From<&LeagueFailure> for FailureView {
    fn from(f: &LeagueFailure) -> Self {
        Self {
            league: f.league.clone(),
            error: f.error.clone(),
        }
    }
}

/// Body of a successful `GET /fixtures`
#[derive(Debug, Serialize)]
pub struct FixturesResponse {
    pub from: String,
    pub to: String,
    pub count: usize,
    pub fixtures: Vec<FixtureView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailureView>,
}

impl From<&AggregationReport> for FixturesResponse {
    fn from(report: &AggregationReport) -> Self {
        Self {
            from: report.window.from.to_string(),
            to: report.window.to.to_string(),
            count: report.count(),
            fixtures: report.fixtures.iter().map(FixtureView::from).collect(),
            errors: report.failures.iter().map(FailureView::from).collect(),
        }
    }
}
