//! Pure analytics over ingested game records.
//!
//! Every function in here is deterministic and side-effect free: records go
//! in, decorated reports come out. All IO lives in the source and state
//! layers.

pub mod best_price;
pub mod history;
pub mod odds;
pub mod signals;
pub mod volatility;

use crate::types::{GameRecord, GameReport};

/// Decorate one record with its resolved channels and derived metrics.
pub fn decorate(game: GameRecord) -> GameReport {
    let markets = history::extract(&game);
    let report = signals::detect(&markets);
    let volatility_score = volatility::score(&report);
    GameReport {
        game,
        markets,
        line_move: report.line_move,
        total_move: report.total_move,
        spread_range: report.spread_range,
        total_range: report.total_range,
        clv: report.clv,
        home_probability_shift: report.home_probability_shift,
        away_probability_shift: report.away_probability_shift,
        best_home_moneyline: report.best_home.value,
        best_home_decimal: report.best_home.decimal,
        best_away_moneyline: report.best_away.value,
        best_away_decimal: report.best_away.decimal,
        arb_profit: report.arb_profit,
        signals: report.signals,
        volatility_score,
    }
}

/// Decorate a slate, preserving its order.
pub fn decorate_all(games: Vec<GameRecord>) -> Vec<GameReport> {
    games.into_iter().map(decorate).collect()
}
