//! Presentation layer.
//!
//! A report is flattened to display strings by folding an ordered list of
//! named render callbacks over an empty row. The list is the single place
//! that decides column order and content; later callbacks may overwrite what
//! earlier ones wrote.

pub mod format;

use serde::Serialize;

use crate::types::{GameReport, Signal};

/// One game as printable board strings. Fields the data cannot fill read "-".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub matchup: String,
    pub kickoff: String,
    pub score: String,
    pub spread: String,
    pub total: String,
    pub moneyline: String,
    pub best_price: String,
    pub movement: String,
    pub signals: String,
    pub volatility: String,
}

pub type RenderFn = fn(&GameReport, &mut DisplayRow);

pub struct Renderer {
    callbacks: Vec<(&'static str, RenderFn)>,
}

impl Renderer {
    /// The standard board layout.
    pub fn standard() -> Self {
        Self {
            callbacks: vec![
                ("matchup", render_matchup as RenderFn),
                ("kickoff", render_kickoff),
                ("score", render_score),
                ("spread", render_spread),
                ("total", render_total),
                ("moneyline", render_moneyline),
                ("best_price", render_best_price),
                ("movement", render_movement),
                ("signals", render_signals),
                ("volatility", render_volatility),
            ],
        }
    }

    /// Fold the callbacks over an empty row, in list order.
    pub fn render(&self, report: &GameReport) -> DisplayRow {
        let mut row = DisplayRow::default();
        for (_, callback) in &self.callbacks {
            callback(report, &mut row);
        }
        row
    }

    pub fn callback_names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|(name, _)| *name).collect()
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

fn render_matchup(report: &GameReport, row: &mut DisplayRow) {
    row.matchup = format!("{} at {}", report.game.away_team, report.game.home_team);
}

fn render_kickoff(report: &GameReport, row: &mut DisplayRow) {
    row.kickoff = report.game.start_date.format("%Y-%m-%d %H:%M UTC").to_string();
}

fn render_score(report: &GameReport, row: &mut DisplayRow) {
    row.score = match (report.game.completed, report.game.away_score, report.game.home_score) {
        (true, Some(away), Some(home)) => format!("{away}-{home}"),
        _ => "-".to_string(),
    };
}

fn render_spread(report: &GameReport, row: &mut DisplayRow) {
    let channel = report.markets.home_spread.unwrap_or_default();
    row.spread = match (channel.close, channel.open) {
        (Some(close), Some(open)) if close != open => format!(
            "{} (opened {})",
            format::spread(Some(close)),
            format::spread(Some(open))
        ),
        (close, open) => format::spread(close.or(open)),
    };
}

fn render_total(report: &GameReport, row: &mut DisplayRow) {
    let channel = report.markets.total.unwrap_or_default();
    row.total = match (channel.close, channel.open) {
        (Some(close), Some(open)) if close != open => format!(
            "{} (opened {})",
            format::points(Some(close)),
            format::points(Some(open))
        ),
        (close, open) => format::points(close.or(open)),
    };
}

fn render_moneyline(report: &GameReport, row: &mut DisplayRow) {
    let away = report.markets.away_moneyline.unwrap_or_default().close;
    let home = report.markets.home_moneyline.unwrap_or_default().close;
    row.moneyline = if away.is_none() && home.is_none() {
        "-".to_string()
    } else {
        format!("{} / {}", format::moneyline(away), format::moneyline(home))
    };
}

fn render_best_price(report: &GameReport, row: &mut DisplayRow) {
    let away = report.best_away_moneyline;
    let home = report.best_home_moneyline;
    row.best_price = if away.is_none() && home.is_none() {
        "-".to_string()
    } else {
        format!("{} / {}", format::moneyline(away), format::moneyline(home))
    };
}

fn render_movement(report: &GameReport, row: &mut DisplayRow) {
    row.movement = match (report.line_move, report.clv) {
        (Some(line_move), Some(clv)) => {
            format!("{} (CLV {})", format::signed(line_move), format::signed(clv))
        }
        _ => "-".to_string(),
    };
}

fn render_signals(report: &GameReport, row: &mut DisplayRow) {
    row.signals = if report.signals.is_empty() {
        "-".to_string()
    } else {
        report
            .signals
            .iter()
            .map(|signal| match (signal, report.arb_profit) {
                (Signal::Arb, Some(profit)) => format!("ARB ({})", format::percent(profit)),
                (s, _) => s.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
}

fn render_volatility(report: &GameReport, row: &mut DisplayRow) {
    row.volatility = format!("{:.2}", report.volatility_score);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
