//! HTTP front end
//!
//! `GET /fixtures?days=N` (also mounted at `/api/fixtures`) runs one
//! aggregation and returns the ranked list. `GET /` serves the browser page.

pub mod response;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::aggregate::{Aggregator, DEFAULT_DAYS, clamp_days};
use crate::client::FootballApi;
use crate::error::Error;
use response::FixturesResponse;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared handler state
pub struct AppState<C: FootballApi> {
    pub aggregator: Arc<Aggregator<C>>,
}

impl<C: FootballApi> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            aggregator: self.aggregator.clone(),
        }
    }
}

/// Any failure during a request, reported as `500 {"error": ...}`
pub struct ServerError(Error);

impl From<Error> for ServerError {
    fn from(err: Error) -> Self {
        ServerError(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct FixturesParams {
    /// Kept as text so a malformed value falls back to the default window
    /// instead of rejecting the request
    pub days: Option<String>,
}

impl FixturesParams {
    pub fn days(&self) -> u32 {
        self.days
            .as_deref()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .map(clamp_days)
            .unwrap_or(DEFAULT_DAYS)
    }
}

async fn fixtures<C: FootballApi + 'static>(
    State(state): State<AppState<C>>,
    Query(params): Query<FixturesParams>,
) -> Result<Json<FixturesResponse>, ServerError> {
    let report = state.aggregator.run(params.days()).await?;
    Ok(Json(FixturesResponse::from(&report)))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz<C: FootballApi + 'static>(State(state): State<AppState<C>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache_entries": state.aggregator.client().cache().len(),
    }))
}

/// Build the application router
pub fn build_router<C: FootballApi + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz::<C>))
        .route("/fixtures", get(fixtures::<C>))
        .route("/api/fixtures", get(fixtures::<C>))
        .with_state(state)
}

/// Serve `router` until the process is stopped
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachedFootballClient, DEFAULT_TTL, TtlCache};
    use crate::client::mock::{MockFootballClient, league_candidate, raw_fixture, standing_row};
    use crate::config::{FailurePolicy, LeagueQuery};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Days, Utc};
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn params(days: Option<&str>) -> FixturesParams {
        FixturesParams {
            days: days.map(str::to_string),
        }
    }

    fn router_for(mock: MockFootballClient, policy: FailurePolicy) -> Router {
        let client = Arc::new(CachedFootballClient::new(mock, Arc::new(TtlCache::new(DEFAULT_TTL))));
        let aggregator = Aggregator::new(client, vec![LeagueQuery::new("Alpha", "Testland")], policy);
        build_router(AppState {
            aggregator: Arc::new(aggregator),
        })
    }

    fn tomorrow_kickoff() -> String {
        let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1)).unwrap();
        format!("{}T18:00:00+00:00", tomorrow)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[test]
    fn test_days_param_clamped() {
        assert_eq!(params(Some("0")).days(), 1);
        assert_eq!(params(Some("10")).days(), 7);
        assert_eq!(params(Some("3")).days(), 3);
        assert_eq!(params(None).days(), 7);
        assert_eq!(params(Some("soon")).days(), 7);
    }

    #[tokio::test]
    async fn test_fixtures_endpoint() {
        let mock = MockFootballClient::new()
            .with_league("Alpha", "Testland", vec![league_candidate(1, "Alpha", 2025)])
            .with_standings(
                1,
                2025,
                vec![vec![
                    standing_row("A1", (3, 1, 2), (2, 1, 0), (1, 0, 2)),
                    standing_row("A2", (2, 2, 2), (1, 1, 1), (1, 1, 1)),
                ]],
            )
            .with_fixtures(1, 2025, vec![raw_fixture("A1", "A2", &tomorrow_kickoff())]);
        let app = router_for(mock, FailurePolicy::FailFast);

        let (status, body) = get_json(app, "/fixtures?days=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        let today = Utc::now().date_naive();
        assert_eq!(body["from"], today.to_string());
        assert_eq!(
            body["to"],
            today.checked_add_days(Days::new(7)).unwrap().to_string()
        );

        let fixture = &body["fixtures"][0];
        assert_eq!(fixture["league"], "Alpha (Testland)");
        assert_eq!(fixture["overallHome"], "312");
        assert_eq!(fixture["overallAway"], "222");
        assert_eq!(fixture["homeWDL"], "210");
        assert_eq!(fixture["awayWDL"], "111");
        assert!(fixture["dateISO"].as_str().unwrap().ends_with("T18:00:00.000Z"));
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_api_alias_route() {
        let app = router_for(MockFootballClient::new(), FailurePolicy::FailFast);
        let (status, body) = get_json(app, "/api/fixtures?days=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["fixtures"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_failure_is_500_with_message() {
        let mock = MockFootballClient::new()
            .with_league("Alpha", "Testland", vec![league_candidate(1, "Alpha", 2025)])
            .failing_league(1);
        let app = router_for(mock, FailurePolicy::FailFast);

        let (status, body) = get_json(app, "/fixtures").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("league 1 unavailable"));
    }

    #[tokio::test]
    async fn test_best_effort_reports_errors() {
        let mock = MockFootballClient::new()
            .with_league("Alpha", "Testland", vec![league_candidate(1, "Alpha", 2025)])
            .failing_league(1);
        let app = router_for(mock, FailurePolicy::BestEffort);

        let (status, body) = get_json(app, "/fixtures").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["errors"][0]["league"], "Alpha (Testland)");
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = router_for(MockFootballClient::new(), FailurePolicy::FailFast);
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("/api/fixtures"));

        let (status, health) = get_json(app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["cache_entries"], 0);
    }
}
