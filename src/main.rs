//! fixture-ranker - ranks upcoming football fixtures by how evenly matched they are

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use serde_json::Value;

mod aggregate;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod ranking;
mod server;

use aggregate::Aggregator;
use cache::{CachedFootballClient, TtlCache};
use cli::Cli;
use client::{ApiFootballClient, OutboundLimiter, RetryPolicy, rate_limit::DEFAULT_BURST};
use config::Config;
use server::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config(|key| std::env::var(key).ok())?;

    if cli.check_config {
        println!(
            "Configuration OK: {} leagues, cache TTL {}s, port {}",
            config.leagues.len(),
            config.cache_ttl_secs,
            config.port
        );
        return Ok(());
    }

    let app = build_app(&config)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    server::serve(listener, app).await.context("Server stopped")?;
    Ok(())
}

/// Wire the provider client, cache, limiter and aggregator into a router.
fn build_app(config: &Config) -> anyhow::Result<Router> {
    let limiter = Arc::new(OutboundLimiter::new(config.pacing(), DEFAULT_BURST));
    if limiter.is_enabled() {
        log::info!("Pacing provider calls every {:?}", limiter.pacing());
    } else {
        log::warn!("Outbound pacing disabled (pacing_ms = 0)");
    }

    let api = ApiFootballClient::new(
        &config.api_base_url,
        config.require_api_key()?,
        config.request_timeout(),
        limiter,
        RetryPolicy::with_attempts(config.max_retries),
    )?;

    let cache: Arc<TtlCache<Value>> = Arc::new(TtlCache::new(config.cache_ttl()));
    log::info!(
        "Tracking {} leagues, caching responses for {:?}, {:?} policy",
        config.leagues.len(),
        cache.ttl(),
        config.failure_policy
    );

    let client = Arc::new(CachedFootballClient::new(api, cache));
    let aggregator = Aggregator::new(client, config.leagues.clone(), config.failure_policy);

    Ok(server::build_router(AppState {
        aggregator: Arc::new(aggregator),
    }))
}
