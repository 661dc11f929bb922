//! Composite volatility scoring.

use crate::config::volatility_weights as w;
use crate::engine::signals::SignalReport;

/// Weighted sum of a game's movement components, rounded to two decimals.
/// Missing components contribute zero and negative ranges are clamped, so
/// the score is always finite and non-negative.
pub fn score(report: &SignalReport) -> f64 {
    let raw = report.line_move.map_or(0.0, f64::abs)
        + report.spread_range.map_or(0.0, |r| r.max(0.0)) * w::SPREAD_RANGE_WEIGHT
        + report.total_move.map_or(0.0, f64::abs) * w::TOTAL_MOVE_WEIGHT
        + report.total_range.map_or(0.0, |r| r.max(0.0)) * w::TOTAL_RANGE_WEIGHT
        + report.max_probability_shift / w::PROB_SHIFT_DIVISOR;
    if !raw.is_finite() {
        return f64::MAX;
    }
    let rounded = (raw * 100.0).round() / 100.0;
    if rounded.is_finite() {
        rounded
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_board_scores_zero() {
        assert_eq!(score(&SignalReport::default()), 0.0);
    }

    #[test]
    fn components_weight_as_documented() {
        let report = SignalReport {
            line_move: Some(4.0),
            spread_range: Some(6.0),
            total_move: Some(-3.0),
            total_range: Some(4.0),
            max_probability_shift: 10.0,
            ..Default::default()
        };
        // 4 + 3 + 1.5 + 1 + 2
        assert_eq!(score(&report), 11.5);
    }

    #[test]
    fn negative_ranges_are_clamped() {
        let report = SignalReport {
            spread_range: Some(-8.0),
            total_range: Some(-2.0),
            ..Default::default()
        };
        assert_eq!(score(&report), 0.0);
    }

    #[test]
    fn score_rounds_to_two_decimals() {
        let report = SignalReport {
            line_move: Some(0.125),
            ..Default::default()
        };
        assert_eq!(score(&report), 0.13);
    }

    #[test]
    fn extreme_inputs_stay_finite_and_non_negative() {
        let report = SignalReport {
            line_move: Some(f64::MAX),
            spread_range: Some(f64::MAX),
            total_move: Some(f64::MAX),
            total_range: Some(f64::MAX),
            max_probability_shift: f64::MAX,
            ..Default::default()
        };
        let s = score(&report);
        assert!(s.is_finite());
        assert!(s >= 0.0);
    }
}
