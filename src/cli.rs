//! Command line definition

use clap::Parser;

use crate::config::{Config, FailurePolicy};
use crate::error::Result;

/// fixture-ranker - ranks upcoming football fixtures by how evenly matched they are
#[derive(Parser, Debug)]
#[command(name = "fixture-ranker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override config file location
    #[arg(long, env = "FIXTURE_RANKER_CONFIG")]
    pub config: Option<String>,

    /// Port to listen on (overrides PORT and the config file)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Cache lifetime in seconds
    #[arg(long, value_name = "SECONDS")]
    pub cache_ttl: Option<u64>,

    /// Report failing leagues in the response instead of failing the request
    #[arg(long)]
    pub best_effort: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// Enable debug logging
    #[arg(long, env = "FIXTURE_RANKER_DEBUG")]
    pub debug: bool,
}

impl Cli {
    /// Build the effective configuration: file, then environment, then flags.
    pub fn resolve_config<F>(&self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::load_at(self.config.as_deref())?;
        config.apply_env(env)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl_secs = ttl;
        }
        if self.best_effort {
            config.failure_policy = FailurePolicy::BestEffort;
        }
    }
}
