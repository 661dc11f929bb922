mod api;
mod config;
mod db;
mod engine;
mod error;
mod ingest;
mod render;
mod scorer;
mod source;
mod state;
mod types;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::render::Renderer;
use crate::scorer::SeasonScorer;
use crate::source::cache::SharedCache;
use crate::source::GameSource;
use crate::state::ReportHub;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup (optional tier) ---
    let pool = connect_db(&cfg.db_path).await;

    // --- Startup CSV ingest ---
    if let (Some(path), Some(pool)) = (&cfg.ingest_csv, &pool) {
        ingest_startup_csv(path, pool).await;
    } else if cfg.ingest_csv.is_some() {
        warn!("INGEST_CSV set but the database is unavailable; skipping ingest");
    }

    // --- Shared cache client (optional tier) ---
    let cache = match &cfg.cache_url {
        Some(url) => match SharedCache::new(
            url.clone(),
            cfg.cache_token.clone(),
            cfg.cache_timeout_ms,
            cfg.cache_ttl_secs,
        ) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Shared cache client unavailable: {e}");
                None
            }
        },
        None => None,
    };

    // --- Shared state ---
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());
    health.set_db_available(pool.is_some());
    health.set_cache_configured(cache.is_some());

    let source = GameSource::new(pool.clone(), cache, cfg.data_dir.clone());
    let hub = ReportHub::new(
        source,
        Duration::from_secs(cfg.report_ttl_secs),
        Arc::clone(&latency),
        Arc::clone(&health),
    );
    info!(seasons = ?cfg.seasons, "Serving seasons");

    // --- Season scorer (background) ---
    match &pool {
        Some(pool) => {
            let scorer = SeasonScorer::new(pool.clone(), Arc::clone(&hub), cfg.seasons.clone());
            tokio::spawn(async move { scorer.run().await });
        }
        None => warn!("Database unavailable; season_stats aggregation disabled"),
    }

    // --- HTTP API server ---
    let renderer = Arc::new(Renderer::standard());
    info!(columns = ?renderer.callback_names(), "Display renderer ready");
    let api_state = ApiState {
        hub: Arc::clone(&hub),
        pool: pool.clone(),
        health: Arc::clone(&health),
        latency: Arc::clone(&latency),
        renderer,
        default_season: cfg.default_season(),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connect, enable WAL, and migrate. Any failure downgrades the database to
/// an absent tier instead of failing startup; the other tiers still serve.
async fn connect_db(db_path: &str) -> Option<sqlx::SqlitePool> {
    let options = match SqliteConnectOptions::from_str(&format!("sqlite:{db_path}")) {
        Ok(o) => o
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal),
        Err(e) => {
            warn!("Bad database path {db_path}: {e}");
            return None;
        }
    };
    let pool = match SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            warn!("Database unavailable at {db_path}: {e}");
            return None;
        }
    };
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        warn!("Database migration failed: {e}");
        return None;
    }
    info!("Database ready at {db_path}");
    Some(pool)
}

/// Load a provider export into the games table before anything reads.
async fn ingest_startup_csv(path: &str, pool: &sqlx::SqlitePool) {
    match ingest::csv::load_file(std::path::Path::new(path)) {
        Ok((games, stats)) => match db::games::upsert_games(pool, &games).await {
            Ok(written) => info!(
                path,
                rows = stats.rows,
                parsed = stats.parsed,
                skipped = stats.skipped,
                written,
                "Startup CSV ingest complete"
            ),
            Err(e) => warn!(path, error = %e, "Could not persist ingested games"),
        },
        Err(e) => warn!(path, error = %e, "Could not read INGEST_CSV file"),
    }
}
