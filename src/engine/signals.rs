//! Line-movement signal detection over resolved market channels.

use crate::config::{ML_STEAM_PROB_POINTS, SPREAD_STEAM_POINTS, TOTAL_STEAM_POINTS};
use crate::engine::best_price::{select_best_price, BestPrice};
use crate::engine::odds::implied_probability;
use crate::types::{LineHistory, MarketHistory, Signal};

/// Everything derived from one game's market movement. Numeric fields stay
/// `None` when their inputs are missing; `max_probability_shift` treats a
/// missing side as zero so one-sided moneyline data can still fire ML STEAM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalReport {
    pub line_move: Option<f64>,
    pub total_move: Option<f64>,
    pub spread_range: Option<f64>,
    pub total_range: Option<f64>,
    pub clv: Option<f64>,
    pub home_probability_shift: Option<f64>,
    pub away_probability_shift: Option<f64>,
    pub max_probability_shift: f64,
    pub best_home: BestPrice,
    pub best_away: BestPrice,
    pub arb_profit: Option<f64>,
    pub signals: Vec<Signal>,
}

// The endpoints are finite by the time they get here, but their difference
// can still overflow; an infinite move degrades to no move.
fn delta(end: Option<f64>, start: Option<f64>) -> Option<f64> {
    Some(end? - start?).filter(|d| d.is_finite())
}

/// Reverse movement: the line crossed back toward even from its opener.
/// Direction is read off the opener's sign, so a zero open never qualifies.
fn is_reverse(open: Option<f64>, close: Option<f64>) -> bool {
    match (open, close) {
        (Some(o), Some(c)) => (o < 0.0 && c > o) || (o > 0.0 && c < o),
        _ => false,
    }
}

/// Open-to-close implied-probability shift for one moneyline channel, in
/// percentage points.
fn probability_shift(tuple: Option<LineHistory>) -> Option<f64> {
    let t = tuple?;
    let open = implied_probability(t.open?)?;
    let close = implied_probability(t.close?)?;
    Some((close - open) * 100.0)
}

/// Best quote seen anywhere in one moneyline channel's window.
fn side_best(tuple: Option<LineHistory>) -> BestPrice {
    match tuple {
        Some(t) => select_best_price(&[t.open, t.close, t.min, t.max]),
        None => BestPrice::default(),
    }
}

/// Two-sided arbitrage margin, as percent profit on total stake. Exists only
/// when the combined implied probabilities come in under 100%.
fn arb_margin(home: &BestPrice, away: &BestPrice) -> Option<f64> {
    let inverse_sum = 1.0 / home.decimal? + 1.0 / away.decimal?;
    (inverse_sum < 1.0).then(|| (1.0 - inverse_sum) * 100.0)
}

/// Run every detector over the resolved channels.
pub fn detect(markets: &MarketHistory) -> SignalReport {
    let spread = markets.home_spread.unwrap_or_default();
    let total = markets.total.unwrap_or_default();

    let line_move = delta(spread.close, spread.open);
    let total_move = delta(total.close, total.open);
    let spread_range = delta(spread.max, spread.min);
    let total_range = delta(total.max, total.min);

    let home_probability_shift = probability_shift(markets.home_moneyline);
    let away_probability_shift = probability_shift(markets.away_moneyline);
    let max_probability_shift = home_probability_shift
        .map_or(0.0, f64::abs)
        .max(away_probability_shift.map_or(0.0, f64::abs));

    let best_home = side_best(markets.home_moneyline);
    let best_away = side_best(markets.away_moneyline);
    let arb_profit = arb_margin(&best_home, &best_away);

    let mut signals = Vec::new();
    if line_move.is_some_and(|m| m.abs() >= SPREAD_STEAM_POINTS) {
        signals.push(Signal::SpreadSteam);
    }
    if is_reverse(spread.open, spread.close) {
        signals.push(Signal::Reverse);
    }
    if total_move.is_some_and(|m| m.abs() >= TOTAL_STEAM_POINTS) {
        signals.push(Signal::TotalSteam);
    }
    if max_probability_shift >= ML_STEAM_PROB_POINTS {
        signals.push(Signal::MlSteam);
    }
    if arb_profit.is_some() {
        signals.push(Signal::Arb);
    }

    SignalReport {
        line_move,
        total_move,
        spread_range,
        total_range,
        // Closing line value for a bet placed at the open, in points.
        clv: line_move.map(|m| -m),
        home_probability_shift,
        away_probability_shift,
        max_probability_shift,
        best_home,
        best_away,
        arb_profit,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(open: f64, close: f64) -> Option<LineHistory> {
        Some(LineHistory {
            open: Some(open),
            close: Some(close),
            ..Default::default()
        })
    }

    fn close_to(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn steam_toward_the_favorite_tags_spread_and_reverse() {
        // -7 -> -3: four points back toward even.
        let markets = MarketHistory {
            home_spread: tuple(-7.0, -3.0),
            ..Default::default()
        };
        let report = detect(&markets);
        assert_eq!(report.line_move, Some(4.0));
        assert_eq!(report.clv, Some(-4.0));
        assert_eq!(report.signals, vec![Signal::SpreadSteam, Signal::Reverse]);
    }

    #[test]
    fn small_drift_tags_nothing() {
        let markets = MarketHistory {
            home_spread: tuple(-3.0, -3.4),
            ..Default::default()
        };
        let report = detect(&markets);
        close_to(report.line_move.unwrap(), -0.4);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn spread_steam_threshold_is_inclusive() {
        let fire = detect(&MarketHistory {
            home_spread: tuple(-6.0, -3.5),
            ..Default::default()
        });
        assert!(fire.signals.contains(&Signal::SpreadSteam));

        let hold = detect(&MarketHistory {
            home_spread: tuple(-6.0, -3.51),
            ..Default::default()
        });
        assert!(!hold.signals.contains(&Signal::SpreadSteam));
    }

    #[test]
    fn reverse_fires_on_underdog_side_too() {
        let report = detect(&MarketHistory {
            home_spread: tuple(3.0, 1.5),
            ..Default::default()
        });
        assert_eq!(report.signals, vec![Signal::Reverse]);
    }

    #[test]
    fn pickem_open_never_reverses() {
        let report = detect(&MarketHistory {
            home_spread: tuple(0.0, -2.0),
            ..Default::default()
        });
        assert!(!report.signals.contains(&Signal::Reverse));
    }

    #[test]
    fn total_steam_threshold_is_inclusive() {
        let fire = detect(&MarketHistory {
            total: tuple(48.0, 50.0),
            ..Default::default()
        });
        assert_eq!(fire.total_move, Some(2.0));
        assert_eq!(fire.signals, vec![Signal::TotalSteam]);

        let hold = detect(&MarketHistory {
            total: tuple(48.0, 49.9),
            ..Default::default()
        });
        assert!(hold.signals.is_empty());
    }

    #[test]
    fn moneyline_shift_past_five_points_is_steam() {
        // -110 (52.38%) -> -150 (60%): about 7.62 points.
        let report = detect(&MarketHistory {
            home_moneyline: tuple(-110.0, -150.0),
            ..Default::default()
        });
        close_to(report.home_probability_shift.unwrap(), 7.619047619);
        assert_eq!(report.signals, vec![Signal::MlSteam]);
    }

    #[test]
    fn one_sided_moneyline_data_still_fires_steam() {
        let report = detect(&MarketHistory {
            away_moneyline: tuple(150.0, 110.0),
            ..Default::default()
        });
        assert_eq!(report.home_probability_shift, None);
        assert!(report.max_probability_shift > ML_STEAM_PROB_POINTS);
        assert_eq!(report.signals, vec![Signal::MlSteam]);
    }

    #[test]
    fn missing_both_moneylines_never_fires_steam() {
        let report = detect(&MarketHistory::default());
        assert_eq!(report.max_probability_shift, 0.0);
        assert!(report.signals.is_empty());
    }

    #[test]
    fn plus_money_both_sides_is_an_arb() {
        // +110 both ways: 2*(1/2.1) leaves a 4.76% margin.
        let report = detect(&MarketHistory {
            home_moneyline: tuple(110.0, 110.0),
            away_moneyline: tuple(110.0, 110.0),
            ..Default::default()
        });
        close_to(report.arb_profit.unwrap(), 100.0 * (1.0 - 2.0 / 2.1));
        assert!(report.signals.contains(&Signal::Arb));
    }

    #[test]
    fn juiced_books_are_not_an_arb() {
        // Standard two-way vig, about 1.91 decimal each side.
        let standard = detect(&MarketHistory {
            home_moneyline: tuple(-110.0, -110.0),
            away_moneyline: tuple(-110.0, -110.0),
            ..Default::default()
        });
        assert_eq!(standard.arb_profit, None);
        assert!(!standard.signals.contains(&Signal::Arb));

        let heavy = detect(&MarketHistory {
            home_moneyline: tuple(-200.0, -200.0),
            away_moneyline: tuple(-200.0, -200.0),
            ..Default::default()
        });
        assert_eq!(heavy.arb_profit, None);
    }

    #[test]
    fn best_price_scans_the_whole_window() {
        let report = detect(&MarketHistory {
            home_moneyline: Some(LineHistory {
                open: Some(-120.0),
                min: Some(-150.0),
                max: Some(135.0),
                close: Some(-110.0),
            }),
            ..Default::default()
        });
        assert_eq!(report.best_home.value, Some(135.0));
    }

    #[test]
    fn signals_hold_detection_order_when_all_fire() {
        let report = detect(&MarketHistory {
            home_spread: tuple(-7.0, -3.0),
            total: tuple(44.0, 49.0),
            home_moneyline: tuple(-110.0, 120.0),
            away_moneyline: tuple(120.0, 110.0),
            ..Default::default()
        });
        assert_eq!(
            report.signals,
            vec![
                Signal::SpreadSteam,
                Signal::Reverse,
                Signal::TotalSteam,
                Signal::MlSteam,
                Signal::Arb,
            ]
        );
    }

    #[test]
    fn overflowing_moves_degrade_to_none() {
        let report = detect(&MarketHistory {
            home_spread: tuple(-f64::MAX, f64::MAX),
            ..Default::default()
        });
        assert_eq!(report.line_move, None);
        assert_eq!(report.clv, None);
        assert!(!report.signals.contains(&Signal::SpreadSteam));
        // Both endpoints are valid floats on their own, so the sign test
        // still sees a move back toward even.
        assert!(report.signals.contains(&Signal::Reverse));
    }

    #[test]
    fn ranges_come_from_extremes_not_endpoints() {
        let report = detect(&MarketHistory {
            home_spread: Some(LineHistory {
                open: Some(-6.0),
                min: Some(-9.5),
                max: Some(-5.5),
                close: Some(-6.5),
            }),
            ..Default::default()
        });
        assert_eq!(report.spread_range, Some(4.0));
        assert_eq!(report.total_range, None);
    }
}
