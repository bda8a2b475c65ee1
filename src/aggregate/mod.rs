//! Fixture aggregation
//!
//! Resolves the configured leagues, pulls standings and fixtures for each one
//! and returns every fixture in the window ranked by its weaker side's record.
//!
//! Leagues are resolved one at a time and then processed one at a time; only
//! a single league's standings and fixtures requests run concurrently. All
//! provider calls go through the shared outbound limiter.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::future::try_join;
use log::{debug, info, warn};

use crate::cache::CachedFootballClient;
use crate::cache::client::StandingsTable;
use crate::client::{FootballApi, RawFixture, ResolvedLeague};
use crate::config::{FailurePolicy, LeagueQuery};
use crate::error::{Error, Result};
use crate::ranking::{Wdl, compare_wdl, representative_wdl};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 7;
pub const DEFAULT_DAYS: u32 = 7;

/// Clamp a requested window length to `MIN_DAYS..=MAX_DAYS`.
pub fn clamp_days(days: i64) -> u32 {
    days.clamp(MIN_DAYS as i64, MAX_DAYS as i64) as u32
}

/// Inclusive range of calendar days to fetch fixtures for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `days` days on from `from` (clamped to the allowed range).
    pub fn starting(from: NaiveDate, days: u32) -> Self {
        let days = clamp_days(days as i64);
        let to = from
            .checked_add_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    /// Window starting today (UTC)
    pub fn from_today(days: u32) -> Self {
        Self::starting(Utc::now().date_naive(), days)
    }
}

/// A fixture joined with both teams' records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub league: String,
    /// Parsed kickoff, if the provider sent a readable timestamp
    pub kickoff: Option<DateTime<Utc>>,
    /// Kickoff as sent by the provider
    pub kickoff_raw: String,
    pub home: String,
    pub away: String,
    pub home_overall: Wdl,
    pub away_overall: Wdl,
    /// Home team's record in home games
    pub home_split: Wdl,
    /// Away team's record in away games
    pub away_split: Wdl,
}

impl Fixture {
    /// Record this fixture is ranked by. Derived from the overall records on
    /// every call.
    pub fn rank_key(&self) -> Wdl {
        representative_wdl(self.home_overall, self.away_overall)
    }
}

/// Rank order, then earlier kickoff. Fixtures without a readable kickoff go
/// after timed ones of equal rank.
pub fn compare_fixtures(a: &Fixture, b: &Fixture) -> Ordering {
    compare_wdl(&a.rank_key(), &b.rank_key()).then_with(|| match (a.kickoff, b.kickoff) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

/// A league skipped under [`FailurePolicy::BestEffort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueFailure {
    pub league: String,
    pub error: String,
}

/// Result of one aggregation run
#[derive(Debug, Clone)]
pub struct AggregationReport {
    pub window: DateWindow,
    pub fixtures: Vec<Fixture>,
    pub failures: Vec<LeagueFailure>,
}

impl AggregationReport {
    pub fn count(&self) -> usize {
        self.fixtures.len()
    }
}

/// Join raw fixtures with standings. Fixtures missing either team name are
/// dropped; teams absent from the table get zero records.
pub fn build_fixtures(label: &str, raw: &[RawFixture], standings: &StandingsTable) -> Vec<Fixture> {
    raw.iter()
        .filter_map(|f| {
            let home = f.teams.home.name()?;
            let away = f.teams.away.name()?;
            let home_stats = standings.get(home).copied().unwrap_or_default();
            let away_stats = standings.get(away).copied().unwrap_or_default();

            let kickoff_raw = f.fixture.date.clone().unwrap_or_default();
            let kickoff = DateTime::parse_from_rfc3339(&kickoff_raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc));

            Some(Fixture {
                league: label.to_string(),
                kickoff,
                kickoff_raw,
                home: home.to_string(),
                away: away.to_string(),
                home_overall: home_stats.overall,
                away_overall: away_stats.overall,
                home_split: home_stats.home,
                away_split: away_stats.away,
            })
        })
        .collect()
}

/// Keep the first league seen for each (league id, season).
pub fn dedupe_leagues(leagues: Vec<ResolvedLeague>) -> Vec<ResolvedLeague> {
    let mut seen = HashSet::new();
    leagues
        .into_iter()
        .filter(|league| seen.insert(league.key()))
        .collect()
}

/// Runs aggregations against a cached provider client
pub struct Aggregator<C: FootballApi> {
    client: Arc<CachedFootballClient<C>>,
    leagues: Vec<LeagueQuery>,
    policy: FailurePolicy,
}

impl<C: FootballApi> Aggregator<C> {
    pub fn new(
        client: Arc<CachedFootballClient<C>>,
        leagues: Vec<LeagueQuery>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            client,
            leagues,
            policy,
        }
    }

    pub fn client(&self) -> &CachedFootballClient<C> {
        &self.client
    }

    /// Aggregate fixtures for the next `days` days from today.
    pub async fn run(&self, days: u32) -> Result<AggregationReport> {
        self.run_window(DateWindow::from_today(days)).await
    }

    /// Aggregate fixtures for an explicit window.
    pub async fn run_window(&self, window: DateWindow) -> Result<AggregationReport> {
        info!(
            "Aggregating fixtures {} to {} across {} configured leagues",
            window.from,
            window.to,
            self.leagues.len()
        );

        let mut failures = Vec::new();
        let resolved = self.resolve_all(&mut failures).await?;
        let leagues = dedupe_leagues(resolved);
        debug!("{} distinct leagues after deduplication", leagues.len());

        let mut fixtures = Vec::new();
        for league in &leagues {
            match self.collect_league(league, window).await {
                Ok(found) => {
                    debug!("{}: {} fixtures", league.label, found.len());
                    fixtures.extend(found);
                }
                Err(e) => self.handle_failure(&league.label, e, &mut failures)?,
            }
        }

        fixtures.sort_by(compare_fixtures);
        info!(
            "Ranked {} fixtures ({} leagues skipped)",
            fixtures.len(),
            failures.len()
        );

        Ok(AggregationReport {
            window,
            fixtures,
            failures,
        })
    }

    /// Resolve every configured league in order. Unknown leagues are skipped.
    async fn resolve_all(&self, failures: &mut Vec<LeagueFailure>) -> Result<Vec<ResolvedLeague>> {
        let mut resolved = Vec::new();
        for query in &self.leagues {
            match self.client.resolve_league(&query.name, &query.country).await {
                Ok(Some(league)) => resolved.push(league),
                Ok(None) => debug!("Skipping unresolved league {} ({})", query.name, query.country),
                Err(e) => {
                    let label = format!("{} ({})", query.name, query.country);
                    self.handle_failure(&label, e, failures)?;
                }
            }
        }
        Ok(resolved)
    }

    /// Fetch one league's standings and fixtures together and join them.
    async fn collect_league(&self, league: &ResolvedLeague, window: DateWindow) -> Result<Vec<Fixture>> {
        let (standings, raw) = try_join(
            self.client.fetch_standings(league.league_id, league.season),
            self.client
                .fetch_fixtures(league.league_id, league.season, window.from, window.to),
        )
        .await?;

        Ok(build_fixtures(&league.label, &raw, &standings))
    }

    /// Abort under fail-fast, otherwise record the league and carry on.
    fn handle_failure(
        &self,
        league: &str,
        err: Error,
        failures: &mut Vec<LeagueFailure>,
    ) -> Result<()> {
        match self.policy {
            FailurePolicy::FailFast => Err(err.in_league(league)),
            FailurePolicy::BestEffort => {
                warn!("Skipping {}: {}", league, err);
                failures.push(LeagueFailure {
                    league: league.to_string(),
                    error: err.to_string(),
                });
                Ok(())
            }
        }
    }
}
