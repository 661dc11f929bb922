use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::db::games as db_games;
use crate::error::AppError;
use crate::render::{DisplayRow, Renderer};
use crate::scorer;
use crate::state::ReportHub;
use crate::types::{GameReport, SeasonType, Signal};

#[derive(Clone)]
pub struct ApiState {
    pub hub: Arc<ReportHub>,
    pub pool: Option<sqlx::SqlitePool>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub renderer: Arc<Renderer>,
    pub default_season: i32,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/games", get(get_games))
        .route("/games/movers", get(get_movers))
        .route("/games/:id", get(get_game))
        .route("/display/games", get(get_display_games))
        .route("/stats/summary", get(get_stats_summary))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesQuery {
    pub season: Option<i32>,
    pub week: Option<i32>,
    pub team: Option<String>,
    pub season_type: Option<String>,
    pub signal: Option<String>,
    pub min_volatility: Option<f64>,
}

#[derive(Deserialize)]
pub struct MoversQuery {
    pub season: Option<i32>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct SeasonQuery {
    pub season: Option<i32>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_available: bool,
    pub cache_configured: bool,
    pub seasons_cached: u64,
    pub last_tier: Option<String>,
    pub last_resolve_at_ns: u64,
    pub tier_walks: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub season: i32,
    pub games: i64,
    pub completed_games: i64,
    pub spread_steam: i64,
    pub reverse: i64,
    pub total_steam: i64,
    pub ml_steam: i64,
    pub arb: i64,
    pub avg_volatility: Option<f64>,
    pub max_volatility: Option<f64>,
    pub source_tier: String,
    pub top_movers: Vec<MoverEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverEntry {
    pub id: i64,
    pub matchup: String,
    pub volatility_score: f64,
    pub signals: Vec<Signal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Apply query filters to a decorated slate. Unknown seasonType or signal
/// spellings are a client error, not an empty result.
fn apply_filters(
    reports: &[GameReport],
    params: &GamesQuery,
) -> Result<Vec<GameReport>, AppError> {
    let season_type = params
        .season_type
        .as_deref()
        .map(|raw| {
            SeasonType::from_label(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown seasonType '{raw}'")))
        })
        .transpose()?;
    let signal = params
        .signal
        .as_deref()
        .map(|raw| {
            Signal::from_label(raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown signal '{raw}'")))
        })
        .transpose()?;
    let team = params.team.as_deref().map(str::to_ascii_lowercase);

    Ok(reports
        .iter()
        .filter(|r| {
            params.week.map_or(true, |w| r.game.week == Some(w))
                && season_type.map_or(true, |t| r.game.season_type == t)
                && signal.map_or(true, |s| r.signals.contains(&s))
                && params
                    .min_volatility
                    .map_or(true, |v| r.volatility_score >= v)
                && team.as_deref().map_or(true, |t| {
                    r.game.home_team.to_ascii_lowercase().contains(t)
                        || r.game.away_team.to_ascii_lowercase().contains(t)
                })
        })
        .cloned()
        .collect())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        db_available: state.health.db_available(),
        cache_configured: state.health.cache_configured(),
        seasons_cached: state.health.seasons_cached(),
        last_tier: state.health.last_tier().map(|t| t.to_string()),
        last_resolve_at_ns: state.health.last_resolve_at_ns(),
        tier_walks: state.hub.source().load_count(),
    })
}

async fn get_games(
    State(state): State<ApiState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<Vec<GameReport>>, AppError> {
    let season = params.season.unwrap_or(state.default_season);
    let slate = state.hub.season(season).await;
    let games = apply_filters(&slate.reports, &params)?;
    Ok(Json(games))
}

async fn get_game(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Query(params): Query<SeasonQuery>,
) -> Result<Json<GameReport>, AppError> {
    let season = params.season.unwrap_or(state.default_season);
    let slate = state.hub.season(season).await;
    let report = slate
        .reports
        .iter()
        .find(|r| r.game.id == id)
        .cloned()
        .ok_or(AppError::GameNotFound(id))?;
    Ok(Json(report))
}

async fn get_movers(
    State(state): State<ApiState>,
    Query(params): Query<MoversQuery>,
) -> Result<Json<Vec<GameReport>>, AppError> {
    let season = params.season.unwrap_or(state.default_season);
    let slate = state.hub.season(season).await;
    let mut movers: Vec<GameReport> = slate.reports.iter().cloned().collect();
    movers.sort_by(|a, b| b.volatility_score.total_cmp(&a.volatility_score));
    movers.truncate(params.limit.unwrap_or(20).min(200));
    Ok(Json(movers))
}

async fn get_display_games(
    State(state): State<ApiState>,
    Query(params): Query<GamesQuery>,
) -> Result<Json<Vec<DisplayRow>>, AppError> {
    let season = params.season.unwrap_or(state.default_season);
    let slate = state.hub.season(season).await;
    let rows = apply_filters(&slate.reports, &params)?
        .iter()
        .map(|r| state.renderer.render(r))
        .collect();
    Ok(Json(rows))
}

async fn get_stats_summary(
    State(state): State<ApiState>,
    Query(params): Query<SeasonQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let season = params.season.unwrap_or(state.default_season);
    let slate = state.hub.season(season).await;

    // Prefer the scorer's persisted aggregate; fall back to a live one.
    let stored = match &state.pool {
        Some(pool) => match db_games::load_season_stats(pool, season).await {
            Ok(row) => row,
            Err(e) => {
                warn!(season, error = %e, "Could not read season_stats");
                None
            }
        },
        None => None,
    };
    let stats = stored.unwrap_or_else(|| {
        scorer::aggregate(season, &slate.reports, chrono::Utc::now().timestamp())
    });

    let mut by_volatility: Vec<&GameReport> = slate.reports.iter().collect();
    by_volatility.sort_by(|a, b| b.volatility_score.total_cmp(&a.volatility_score));
    let top_movers = by_volatility
        .into_iter()
        .take(5)
        .map(|r| MoverEntry {
            id: r.game.id,
            matchup: format!("{} at {}", r.game.away_team, r.game.home_team),
            volatility_score: r.volatility_score,
            signals: r.signals.clone(),
        })
        .collect();

    Ok(Json(SummaryResponse {
        season,
        games: stats.games,
        completed_games: stats.completed_games,
        spread_steam: stats.spread_steam,
        reverse: stats.reverse,
        total_steam: stats.total_steam,
        ml_steam: stats.ml_steam,
        arb: stats.arb,
        avg_volatility: stats.avg_volatility,
        max_volatility: stats.max_volatility,
        source_tier: slate.tier.to_string(),
        top_movers,
    }))
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let (p50_us, p95_us, p99_us) = state.latency.percentiles();
    Json(LatencyResponse {
        samples: state.latency.len(),
        p50_us,
        p95_us,
        p99_us,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
