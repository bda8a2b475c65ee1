//! Football data provider client

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

pub mod api_football;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod rate_limit;
pub mod retry;

pub use api_football::ApiFootballClient;
pub use models::{LeagueCandidate, RawFixture, ResolvedLeague, StandingRow};
pub use rate_limit::OutboundLimiter;
pub use retry::RetryPolicy;

/// Raw provider lookups. Implementations do not cache.
#[async_trait]
pub trait FootballApi: Send + Sync {
    /// Search the league catalog by name and country
    async fn search_leagues(&self, name: &str, country: &str) -> Result<Vec<LeagueCandidate>>;

    /// Standings for a league season, one inner list per group
    async fn standings(&self, league_id: i64, season: i32) -> Result<Vec<Vec<StandingRow>>>;

    /// Fixtures kicking off between `from` and `to`, both days inclusive
    async fn fixtures(
        &self,
        league_id: i64,
        season: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawFixture>>;
}
