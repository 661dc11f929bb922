//! Betting-board string formats.

/// Whole numbers drop the decimal point; everything else keeps its shortest
/// exact form.
fn trim(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Spread display: signed points, "PK" for a pick'em, "-" when unset.
pub fn spread(v: Option<f64>) -> String {
    match v {
        None => "-".to_string(),
        Some(v) if v == 0.0 => "PK".to_string(),
        Some(v) if v > 0.0 => format!("+{}", trim(v)),
        Some(v) => trim(v),
    }
}

/// Plain points (totals), "-" when unset.
pub fn points(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), trim)
}

/// American odds display: "+150" / "-110", "-" when unset.
pub fn moneyline(v: Option<f64>) -> String {
    match v {
        None => "-".to_string(),
        Some(v) => {
            let ml = v.round() as i64;
            if ml > 0 {
                format!("+{ml}")
            } else {
                format!("{ml}")
            }
        }
    }
}

/// Signed points for movement columns.
pub fn signed(v: f64) -> String {
    if v > 0.0 {
        format!("+{}", trim(v))
    } else {
        trim(v)
    }
}

pub fn percent(v: f64) -> String {
    format!("{v:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_read_like_a_board() {
        assert_eq!(spread(None), "-");
        assert_eq!(spread(Some(0.0)), "PK");
        assert_eq!(spread(Some(3.5)), "+3.5");
        assert_eq!(spread(Some(-7.0)), "-7");
        assert_eq!(spread(Some(-3.25)), "-3.25");
    }

    #[test]
    fn totals_drop_trailing_zeros() {
        assert_eq!(points(Some(48.0)), "48");
        assert_eq!(points(Some(51.5)), "51.5");
        assert_eq!(points(None), "-");
    }

    #[test]
    fn moneylines_always_carry_a_sign() {
        assert_eq!(moneyline(Some(150.0)), "+150");
        assert_eq!(moneyline(Some(-110.0)), "-110");
        assert_eq!(moneyline(Some(109.6)), "+110");
        assert_eq!(moneyline(None), "-");
    }

    #[test]
    fn movement_values_are_signed() {
        assert_eq!(signed(2.5), "+2.5");
        assert_eq!(signed(-2.5), "-2.5");
        assert_eq!(signed(0.0), "0");
    }

    #[test]
    fn percent_shows_two_decimals() {
        assert_eq!(percent(4.7619), "4.76%");
        assert_eq!(percent(10.0), "10.00%");
    }
}
