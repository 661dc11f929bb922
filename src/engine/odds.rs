//! American/decimal odds conversions.
//!
//! Every function degrades to `None` on non-finite or structurally invalid
//! input rather than propagating NaN into downstream arithmetic.

/// Convert American odds to decimal odds.
///
/// Positive lines pay `ml/100` profit per unit, negative lines risk
/// `|ml|/100` per unit of profit. Zero is not a quotable line.
pub fn moneyline_to_decimal(ml: f64) -> Option<f64> {
    if !ml.is_finite() || ml == 0.0 {
        return None;
    }
    if ml > 0.0 {
        Some(1.0 + ml / 100.0)
    } else {
        Some(1.0 + 100.0 / -ml)
    }
}

/// Implied win probability of an American line, as a fraction in (0, 1).
pub fn implied_probability(ml: f64) -> Option<f64> {
    if !ml.is_finite() || ml == 0.0 {
        return None;
    }
    if ml > 0.0 {
        Some(100.0 / (ml + 100.0))
    } else {
        Some(-ml / (-ml + 100.0))
    }
}

/// Convert decimal odds back to a rounded American line.
///
/// Decimals at or below 1.0 carry no payout and have no American form.
pub fn decimal_to_american(dec: f64) -> Option<f64> {
    if !dec.is_finite() || dec <= 1.0 {
        return None;
    }
    if dec >= 2.0 {
        Some(((dec - 1.0) * 100.0).round())
    } else {
        Some(-(100.0 / (dec - 1.0)).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn positive_moneyline_to_decimal() {
        close_to(moneyline_to_decimal(150.0).unwrap(), 2.5);
        close_to(moneyline_to_decimal(100.0).unwrap(), 2.0);
    }

    #[test]
    fn negative_moneyline_to_decimal() {
        close_to(moneyline_to_decimal(-150.0).unwrap(), 1.0 + 2.0 / 3.0);
        close_to(moneyline_to_decimal(-100.0).unwrap(), 2.0);
    }

    #[test]
    fn degenerate_moneylines_are_none() {
        assert_eq!(moneyline_to_decimal(0.0), None);
        assert_eq!(moneyline_to_decimal(f64::NAN), None);
        assert_eq!(moneyline_to_decimal(f64::INFINITY), None);
    }

    #[test]
    fn implied_probability_matches_book_math() {
        close_to(implied_probability(100.0).unwrap(), 0.5);
        close_to(implied_probability(-200.0).unwrap(), 2.0 / 3.0);
        close_to(implied_probability(50.0).unwrap(), 2.0 / 3.0);
        close_to(implied_probability(-50.0).unwrap(), 1.0 / 3.0);
        assert_eq!(implied_probability(0.0), None);
        assert_eq!(implied_probability(f64::NAN), None);
    }

    #[test]
    fn decimal_to_american_round_trips_common_lines() {
        close_to(decimal_to_american(2.5).unwrap(), 150.0);
        close_to(decimal_to_american(1.5).unwrap(), -200.0);
        close_to(decimal_to_american(2.0).unwrap(), 100.0);
        close_to(decimal_to_american(1.9091).unwrap(), -110.0);
    }

    #[test]
    fn decimal_at_or_below_even_money_is_none() {
        assert_eq!(decimal_to_american(1.0), None);
        assert_eq!(decimal_to_american(0.5), None);
        assert_eq!(decimal_to_american(f64::NAN), None);
    }
}
