//! API-Football v3 client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{LeagueCandidate, RawFixture, StandingRow, StandingsResponse, list_from_value};
use super::rate_limit::OutboundLimiter;
use super::retry::{RetryPolicy, with_retry};
use super::FootballApi;
use crate::error::{ApiError, Result};

/// Header carrying the provider credential
const API_KEY_HEADER: &str = "x-apisports-key";

/// Calendar-day format the provider expects for `from`/`to`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Standard response wrapper: `{"errors": ..., "response": [...]}`.
///
/// `response` stays raw so records can be decoded one at a time.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    errors: Value,
    #[serde(default)]
    response: Value,
}

/// The provider reports plan/credential problems as a 200 with a non-empty
/// `errors` array or object.
fn provider_errors(errors: &Value) -> Option<String> {
    fn text(v: &Value) -> String {
        v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())
    }

    match errors {
        Value::Array(items) if !items.is_empty() => {
            Some(items.iter().map(text).collect::<Vec<_>>().join("; "))
        }
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| format!("{}: {}", k, text(v)))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

/// API-Football client
pub struct ApiFootballClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    limiter: Arc<OutboundLimiter>,
    retry: RetryPolicy,
}

impl ApiFootballClient {
    /// Create a new client.
    ///
    /// `limiter` is shared with any other client talking to the same provider.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        limiter: Arc<OutboundLimiter>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            limiter,
            retry,
        })
    }

    /// GET `path` with retries, returning the unwrapped `response` list.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        with_retry(self.retry, path, || self.request_inner(path, query)).await
    }

    /// Single paced attempt
    async fn request_inner<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        self.limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.text().await.map_err(ApiError::from)?;
                let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse {} response: {}", path, e))
                })?;

                if let Some(message) = provider_errors(&envelope.errors) {
                    return Err(ApiError::Provider(message).into());
                }
                Ok(list_from_value(envelope.response))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized.into()),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Bad request: {}", status));
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl FootballApi for ApiFootballClient {
    async fn search_leagues(&self, name: &str, country: &str) -> Result<Vec<LeagueCandidate>> {
        let query = [("name", name.to_string()), ("country", country.to_string())];
        self.get_list("/leagues", &query).await
    }

    async fn standings(&self, league_id: i64, season: i32) -> Result<Vec<Vec<StandingRow>>> {
        let query = [("league", league_id.to_string()), ("season", season.to_string())];
        let response: Vec<StandingsResponse> = self.get_list("/standings", &query).await?;
        Ok(response
            .into_iter()
            .flat_map(|r| r.league.standings)
            .collect())
    }

    async fn fixtures(
        &self,
        league_id: i64,
        season: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawFixture>> {
        let query = [
            ("league", league_id.to_string()),
            ("season", season.to_string()),
            ("from", from.format(DATE_FORMAT).to_string()),
            ("to", to.format(DATE_FORMAT).to_string()),
        ];
        self.get_list("/fixtures", &query).await
    }
}
