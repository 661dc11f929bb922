//! Database row types matching the migrations schema. Used by sqlx for
//! typed queries.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::types::{GameMarkets, GameRecord, SeasonType};

/// One `games` row as stored. Market data rides along as a JSON document so
/// the schema never chases the wire format.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRow {
    pub id: i64,
    pub season: i64,
    pub week: Option<i64>,
    pub season_type: String,
    pub start_date: String,
    pub home_team: String,
    pub home_conference: Option<String>,
    pub home_score: Option<i64>,
    pub away_team: String,
    pub away_conference: Option<String>,
    pub away_score: Option<i64>,
    pub completed: i64,
    pub line_provider: Option<String>,
    pub market_json: String,
}

impl GameRow {
    /// Rehydrate the stored row. An unparseable date drops the row with a
    /// warning; bad market JSON degrades to empty markets instead.
    pub fn into_record(self) -> Option<GameRecord> {
        let start_date = match DateTime::parse_from_rfc3339(&self.start_date) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                warn!(id = self.id, error = %e, "Dropping game row with bad start_date");
                return None;
            }
        };
        let markets: GameMarkets = match serde_json::from_str(&self.market_json) {
            Ok(m) => m,
            Err(e) => {
                warn!(id = self.id, error = %e, "Ignoring unreadable market_json");
                GameMarkets::default()
            }
        };
        Some(GameRecord {
            id: self.id,
            season: self.season as i32,
            week: self.week.map(|w| w as i32),
            season_type: SeasonType::from_label(&self.season_type).unwrap_or_default(),
            start_date,
            home_team: self.home_team,
            home_conference: self.home_conference,
            home_score: self.home_score.map(|s| s as i32),
            away_team: self.away_team,
            away_conference: self.away_conference,
            away_score: self.away_score.map(|s| s as i32),
            completed: self.completed != 0,
            line_provider: self.line_provider,
            markets,
        })
    }
}

/// One `season_stats` row, also the scorer's aggregation output.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SeasonStatsRow {
    pub season: i64,
    pub games: i64,
    pub completed_games: i64,
    pub spread_steam: i64,
    pub reverse: i64,
    pub total_steam: i64,
    pub ml_steam: i64,
    pub arb: i64,
    pub avg_volatility: Option<f64>,
    pub max_volatility: Option<f64>,
    pub last_updated: i64,
}
