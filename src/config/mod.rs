//! Configuration management for fixture-ranker

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::error::{ConfigError, Result};

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "FOOTBALL_API_KEY";

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// API-Football v3 base URL
pub const DEFAULT_API_BASE_URL: &str = "https://v3.football.api-sports.io";

/// A competition to track, matched by name against the provider's catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueQuery {
    pub name: String,
    pub country: String,
}

impl LeagueQuery {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }
}

/// What to do when one league's fetch fails mid-run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole aggregation on the first failure
    #[default]
    FailFast,
    /// Skip the failing league and report it alongside the results
    BestEffort,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Competitions to aggregate
    #[serde(default = "default_leagues")]
    pub leagues: Vec<LeagueQuery>,

    /// Lifetime of cached provider responses
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Minimum spacing between outbound provider calls
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Per-request timeout for outbound calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per outbound call, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// HTTP listening port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_pacing_ms() -> u64 {
    150
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_port() -> u16 {
    3000
}

/// Compiled-in competitions used when the config file names none
pub fn default_leagues() -> Vec<LeagueQuery> {
    vec![
        LeagueQuery::new("Serie A", "Brazil"),
        LeagueQuery::new("Serie B", "Brazil"),
        LeagueQuery::new("Bundesliga", "Germany"),
        LeagueQuery::new("2. Bundesliga", "Germany"),
        LeagueQuery::new("Premier League", "England"),
        LeagueQuery::new("Championship", "England"),
        LeagueQuery::new("La Liga", "Spain"),
        LeagueQuery::new("Serie A", "Italy"),
        LeagueQuery::new("Ligue 1", "France"),
        LeagueQuery::new("Eredivisie", "Netherlands"),
        LeagueQuery::new("Primeira Liga", "Portugal"),
        LeagueQuery::new("Major League Soccer", "USA"),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            leagues: default_leagues(),
            cache_ttl_secs: default_cache_ttl_secs(),
            pacing_ms: default_pacing_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            failure_policy: FailurePolicy::default(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.config/fixture-ranker/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::Invalid(
            "Could not determine config directory".to_string(),
        ))?;

        Ok(base.join("fixture-ranker").join("config.yaml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default location is optional and
    /// falls back to built-in defaults when absent.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(Path::new(p)),
            None => {
                let default = Self::default_path()?;
                if default.exists() {
                    Self::load_from(&default)
                } else {
                    log::debug!("No config file at {}, using defaults", default.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        log::info!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    /// Overlay values from the environment. Environment wins over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV} is not a port: {port}")))?;
        }

        Ok(())
    }

    /// Validate that required configuration is present
    pub fn validate(&self) -> Result<()> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingApiKey.into()),
        }

        if self.leagues.is_empty() {
            return Err(ConfigError::Invalid("no leagues configured".to_string()).into());
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache_ttl_secs must be positive".to_string()).into());
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".to_string()).into());
        }

        Ok(())
    }

    /// The validated API key. Call after [`Config::validate`].
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiKey.into())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
