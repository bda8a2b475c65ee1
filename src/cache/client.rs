//! Cached lookups against the football data provider
//!
//! Wraps any [`FootballApi`] and exposes the three typed lookups the
//! aggregation needs, each memoized in the shared [`TtlCache`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::cache::{TtlCache, cache_key};
use crate::client::{FootballApi, RawFixture, ResolvedLeague};
use crate::error::{Error, Result};
use crate::ranking::TeamStanding;

/// Team name to records, for one league season
pub type StandingsTable = HashMap<String, TeamStanding>;

/// Cache-backed wrapper for any FootballApi implementation.
pub struct CachedFootballClient<C: FootballApi> {
    inner: Arc<C>,
    cache: Arc<TtlCache<Value>>,
}

impl<C: FootballApi> CachedFootballClient<C> {
    pub fn new(inner: C, cache: Arc<TtlCache<Value>>) -> Self {
        Self {
            inner: Arc::new(inner),
            cache,
        }
    }

    /// Get the inner client
    #[cfg(test)]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    /// Try to get cached data. `None` means not cached (or unreadable).
    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache
            .get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Store data in cache
    fn set_cached<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.cache.set(key, value),
            Err(e) => log::warn!("Not caching {}: {}", key, e),
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    /// Failures are not cached.
    async fn cached<T, F, Fut>(&self, endpoint: &str, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get_cached(&key) {
            log::debug!("Cache hit: {}", endpoint);
            return Ok(cached);
        }

        let result = fetch().await?;
        self.set_cached(&key, &result);
        Ok(result)
    }

    /// Map a configured league name and country to a provider league id and
    /// season. `None` when the catalog has no matching league; that answer is
    /// cached like any other.
    pub async fn resolve_league(&self, name: &str, country: &str) -> Result<Option<ResolvedLeague>> {
        let key = cache_key("leagues", &[("name", name), ("country", country)]);

        self.cached("leagues", key, || async {
            let candidates = self.inner.search_leagues(name, country).await?;
            let resolved = ResolvedLeague::select(&candidates);
            match &resolved {
                Some(league) => log::debug!(
                    "Resolved {} ({}) to league {} season {}",
                    name,
                    country,
                    league.league_id,
                    league.season
                ),
                None => log::info!("No league found for {} ({})", name, country),
            }
            Ok::<_, Error>(resolved)
        })
        .await
    }

    /// Raw fixtures kicking off between `from` and `to`, inclusive.
    pub async fn fetch_fixtures(
        &self,
        league_id: i64,
        season: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawFixture>> {
        let league = league_id.to_string();
        let season_str = season.to_string();
        let from_str = from.to_string();
        let to_str = to.to_string();
        let key = cache_key(
            "fixtures",
            &[
                ("league", &league),
                ("season", &season_str),
                ("from", &from_str),
                ("to", &to_str),
            ],
        );

        self.cached("fixtures", key, || {
            self.inner.fixtures(league_id, season, from, to)
        })
        .await
    }

    /// Per-team records for a league season.
    ///
    /// Group and conference tables are merged into one map keyed by team name.
    /// Rows without a team name are skipped.
    pub async fn fetch_standings(&self, league_id: i64, season: i32) -> Result<StandingsTable> {
        let league = league_id.to_string();
        let season_str = season.to_string();
        let key = cache_key("standings", &[("league", &league), ("season", &season_str)]);

        self.cached("standings", key, || async {
            let groups = self.inner.standings(league_id, season).await?;
            let table: StandingsTable = groups
                .iter()
                .flatten()
                .filter_map(|row| {
                    let name = row.team.name()?;
                    Some((name.to_string(), TeamStanding::from_row(row)))
                })
                .collect();
            Ok::<_, Error>(table)
        })
        .await
    }
}
