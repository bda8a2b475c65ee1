//! Error types for fixture-ranker

use std::time::Duration;
use thiserror::Error;

/// Result type alias for fixture-ranker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Aggregation failed for {league}: {source}")]
    Aggregation {
        league: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the league being processed to an error raised mid-run.
    pub fn in_league(self, league: impl Into<String>) -> Self {
        Error::Aggregation {
            league: league.into(),
            source: Box::new(self),
        }
    }

    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api(api) => api.is_transient(),
            _ => false,
        }
    }
}

/// Errors talking to the upstream football data provider
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider rejected the API key. Check FOOTBALL_API_KEY.")]
    Unauthorized,

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned errors: {0}")]
    Provider(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Timeouts, dropped connections, 429 and 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimit(_)
                | ApiError::ServerError(_)
                | ApiError::Network(_)
                | ApiError::Timeout
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to provider".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("API key not configured. Set FOOTBALL_API_KEY or api_key in the config file.")]
    MissingApiKey,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
