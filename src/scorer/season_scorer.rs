use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::config::SCORER_INTERVAL_SECS;
use crate::db::games::upsert_season_stats;
use crate::db::models::SeasonStatsRow;
use crate::error::Result;
use crate::state::ReportHub;
use crate::types::{GameReport, Signal};

/// Background task that refreshes per-season aggregates on an interval.
/// Reads decorated slates through the hub and upserts into season_stats.
pub struct SeasonScorer {
    pool: sqlx::SqlitePool,
    hub: Arc<ReportHub>,
    seasons: Vec<i32>,
}

impl SeasonScorer {
    pub fn new(pool: sqlx::SqlitePool, hub: Arc<ReportHub>, seasons: Vec<i32>) -> Self {
        Self { pool, hub, seasons }
    }

    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(SCORER_INTERVAL_SECS));
        interval.tick().await; // consume immediate first tick

        loop {
            interval.tick().await;
            if let Err(e) = self.score_seasons().await {
                error!("Scorer error: {e}");
            }
        }
    }

    async fn score_seasons(&self) -> Result<()> {
        let now = Utc::now().timestamp();
        for &season in &self.seasons {
            let slate = self.hub.season(season).await;
            let stats = aggregate(season, &slate.reports, now);
            upsert_season_stats(&self.pool, &stats).await?;
        }
        info!("Scorer updated stats for {} seasons", self.seasons.len());
        Ok(())
    }
}

/// Roll one season's decorated reports into a season_stats row.
pub fn aggregate(season: i32, reports: &[GameReport], now: i64) -> SeasonStatsRow {
    let mut completed_games = 0i64;
    let mut spread_steam = 0i64;
    let mut reverse = 0i64;
    let mut total_steam = 0i64;
    let mut ml_steam = 0i64;
    let mut arb = 0i64;
    let mut vol_sum = 0.0f64;
    let mut max_volatility: Option<f64> = None;

    for report in reports {
        if report.game.completed {
            completed_games += 1;
        }
        for signal in &report.signals {
            match signal {
                Signal::SpreadSteam => spread_steam += 1,
                Signal::Reverse => reverse += 1,
                Signal::TotalSteam => total_steam += 1,
                Signal::MlSteam => ml_steam += 1,
                Signal::Arb => arb += 1,
            }
        }
        vol_sum += report.volatility_score;
        max_volatility =
            Some(max_volatility.map_or(report.volatility_score, |m| m.max(report.volatility_score)));
    }

    let avg_volatility = (!reports.is_empty())
        .then(|| ((vol_sum / reports.len() as f64) * 100.0).round() / 100.0);

    SeasonStatsRow {
        season: i64::from(season),
        games: reports.len() as i64,
        completed_games,
        spread_steam,
        reverse,
        total_steam,
        ml_steam,
        arb,
        avg_volatility,
        max_volatility,
        last_updated: now,
    }
}
