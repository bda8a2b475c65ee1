//! Provider response models (API-Football v3)
//!
//! Fields the aggregation does not need are left out. Every field is read
//! leniently: a missing, null or wrongly typed value takes its default, and a
//! list element that is not a record at all is dropped. One bad record never
//! fails the request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode each element of a JSON array, skipping elements that do not fit.
/// Anything other than an array decodes as empty.
pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        log::debug!("Dropped {} malformed records", total - decoded.len());
    }
    decoded
}

/// Field value, or its default when null or of the wrong type
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(list_from_value(Value::deserialize(deserializer)?))
}

fn lenient_groups<'de, D, T>(deserializer: D) -> Result<Vec<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(groups) => groups.into_iter().map(list_from_value).collect(),
        _ => Vec::new(),
    })
}

/// One entry of the `/leagues` search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueCandidate {
    #[serde(deserialize_with = "lenient")]
    pub league: LeagueInfo,
    #[serde(deserialize_with = "lenient")]
    pub country: CountryInfo,
    #[serde(deserialize_with = "lenient_list")]
    pub seasons: Vec<SeasonInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueInfo {
    #[serde(deserialize_with = "lenient")]
    pub id: i64,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// "League" or "Cup"
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryInfo {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonInfo {
    #[serde(deserialize_with = "lenient")]
    pub year: i32,
    #[serde(deserialize_with = "lenient")]
    pub current: bool,
}

/// A league matched to a concrete provider id and season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLeague {
    pub league_id: i64,
    pub season: i32,
    pub label: String,
}

impl ResolvedLeague {
    /// Pick the league and season to use from search candidates.
    ///
    /// Only candidates typed exactly "League" qualify. The first season flagged
    /// current wins, scanning candidates in order. Without one, the first
    /// candidate's first listed season is used.
    pub fn select(candidates: &[LeagueCandidate]) -> Option<Self> {
        let leagues: Vec<&LeagueCandidate> =
            candidates.iter().filter(|c| c.league.kind == "League").collect();

        let current = leagues.iter().find_map(|c| {
            c.seasons
                .iter()
                .find(|s| s.current)
                .map(|s| (*c, s.year))
        });

        let (candidate, season) = match current {
            Some(found) => found,
            None => {
                let first = leagues.first()?;
                (*first, first.seasons.first()?.year)
            }
        };

        Some(Self {
            league_id: candidate.league.id,
            season,
            label: candidate.label(),
        })
    }

    /// Identity used for deduplication
    pub fn key(&self) -> (i64, i32) {
        (self.league_id, self.season)
    }
}

impl LeagueCandidate {
    fn label(&self) -> String {
        if self.country.name.is_empty() {
            self.league.name.clone()
        } else {
            format!("{} ({})", self.league.name, self.country.name)
        }
    }
}

/// `response[].league` of the `/standings` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StandingsResponse {
    #[serde(deserialize_with = "lenient")]
    pub league: StandingsLeague,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StandingsLeague {
    /// One inner list per group or conference
    #[serde(deserialize_with = "lenient_groups")]
    pub standings: Vec<Vec<StandingRow>>,
}

/// One team's line in a standings table.
///
/// The `all`/`home`/`away` records stay raw so malformed counts can be
/// detected instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StandingRow {
    #[serde(deserialize_with = "lenient")]
    pub team: TeamRef,
    pub all: Value,
    pub home: Value,
    pub away: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

impl TeamRef {
    /// Team name, if present and non-blank
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// One entry of the `/fixtures` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFixture {
    #[serde(deserialize_with = "lenient")]
    pub fixture: FixtureInfo,
    #[serde(deserialize_with = "lenient")]
    pub teams: FixtureTeams,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureInfo {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<i64>,
    /// Kickoff as an ISO-8601 string with offset
    #[serde(deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureTeams {
    #[serde(deserialize_with = "lenient")]
    pub home: TeamRef,
    #[serde(deserialize_with = "lenient")]
    pub away: TeamRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(id: i64, kind: &str, seasons: &[(i32, bool)]) -> LeagueCandidate {
        LeagueCandidate {
            league: LeagueInfo {
                id,
                name: format!("League {}", id),
                kind: kind.to_string(),
            },
            country: CountryInfo {
                name: "Brazil".to_string(),
            },
            seasons: seasons
                .iter()
                .map(|&(year, current)| SeasonInfo { year, current })
                .collect(),
        }
    }

    #[test]
    fn test_select_prefers_current_season() {
        let candidates = vec![
            candidate(71, "League", &[(2023, false), (2024, false)]),
            candidate(72, "League", &[(2024, false), (2025, true)]),
        ];

        let resolved = ResolvedLeague::select(&candidates).unwrap();
        assert_eq!(resolved.league_id, 72);
        assert_eq!(resolved.season, 2025);
        assert_eq!(resolved.label, "League 72 (Brazil)");
    }

    #[test]
    fn test_select_falls_back_to_first_season_of_first_candidate() {
        let candidates = vec![
            candidate(71, "League", &[(2022, false), (2023, false)]),
            candidate(72, "League", &[(2024, false)]),
        ];

        let resolved = ResolvedLeague::select(&candidates).unwrap();
        assert_eq!(resolved.key(), (71, 2022));
    }

    #[test]
    fn test_select_ignores_cups() {
        let candidates = vec![
            candidate(73, "Cup", &[(2025, true)]),
            candidate(71, "League", &[(2025, false)]),
        ];

        let resolved = ResolvedLeague::select(&candidates).unwrap();
        assert_eq!(resolved.key(), (71, 2025));
    }

    #[test]
    fn test_select_none_when_no_league_matches() {
        assert!(ResolvedLeague::select(&[]).is_none());
        assert!(ResolvedLeague::select(&[candidate(73, "Cup", &[(2025, true)])]).is_none());
        // A league with no seasons at all has nothing to fall back to
        assert!(ResolvedLeague::select(&[candidate(71, "League", &[])]).is_none());
    }

    #[test]
    fn test_sparse_fixture_deserializes() {
        let raw: RawFixture = serde_json::from_value(json!({
            "fixture": {"id": 1, "date": "2025-08-09T19:00:00+00:00"},
            "teams": {"home": {"name": "Santos"}, "away": {}}
        }))
        .unwrap();

        assert_eq!(raw.teams.home.name(), Some("Santos"));
        assert_eq!(raw.teams.away.name(), None);
    }

    #[test]
    fn test_null_and_mistyped_league_fields_take_defaults() {
        let candidate: LeagueCandidate = serde_json::from_value(json!({
            "league": {"id": "71", "name": null, "type": "League"},
            "country": null,
            "seasons": [
                {"year": 2024, "current": null},
                {"year": "2025", "current": "yes"},
                null,
                {"year": 2026, "current": true}
            ]
        }))
        .unwrap();

        assert_eq!(candidate.league.id, 0);
        assert_eq!(candidate.league.name, "");
        assert_eq!(candidate.country.name, "");
        assert_eq!(candidate.seasons.len(), 3);
        assert!(!candidate.seasons[0].current);
        assert_eq!(candidate.seasons[1].year, 0);

        let resolved = ResolvedLeague::select(&[candidate]).unwrap();
        assert_eq!(resolved.season, 2026);
    }

    #[test]
    fn test_null_standings_are_empty() {
        let response: StandingsResponse =
            serde_json::from_value(json!({"league": {"standings": null}})).unwrap();
        assert!(response.league.standings.is_empty());

        let response: StandingsResponse = serde_json::from_value(json!({"league": null})).unwrap();
        assert!(response.league.standings.is_empty());
    }

    #[test]
    fn test_bad_standings_rows_are_dropped() {
        let response: StandingsResponse = serde_json::from_value(json!({"league": {"standings": [
            [{"team": {"name": 7}, "all": null}, "not a row", {"team": {"name": "Bahia"}}],
            "not a group"
        ]}}))
        .unwrap();

        let groups = response.league.standings;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].team.name(), None);
        assert_eq!(groups[0][1].team.name(), Some("Bahia"));
        assert!(groups[1].is_empty());
    }

    #[test]
    fn test_mistyped_fixture_fields_keep_the_record() {
        let raw: RawFixture = serde_json::from_value(json!({
            "fixture": {"id": "x3", "date": 20250809},
            "teams": {"home": {"name": "Santos"}, "away": null}
        }))
        .unwrap();

        assert_eq!(raw.fixture.id, None);
        assert_eq!(raw.fixture.date, None);
        assert_eq!(raw.teams.home.name(), Some("Santos"));
        assert_eq!(raw.teams.away.name(), None);
    }

    #[test]
    fn test_list_from_value_skips_non_records() {
        let fixtures: Vec<RawFixture> = list_from_value(json!([
            {"fixture": {"id": 1}},
            null,
            42,
            {"fixture": {"id": 2}}
        ]));
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[1].fixture.id, Some(2));

        assert!(list_from_value::<RawFixture>(Value::Null).is_empty());
        assert!(list_from_value::<RawFixture>(json!({"id": 1})).is_empty());
    }

    #[test]
    fn test_blank_team_name_is_missing() {
        let team = TeamRef {
            name: Some("  ".to_string()),
        };
        assert_eq!(team.name(), None);
    }
}
