//! Market history extraction.
//!
//! A record can describe the same channel three ways: a nested history tuple,
//! flat open/min/max/close fields, and a bare closing scalar. Each component
//! resolves independently with nested values winning over flat ones; the
//! scalar only ever stands in for a missing close. Non-finite values are
//! treated as absent at every step.

use crate::types::{GameRecord, LineHistory, MarketHistory, SidedHistory};

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Merge the three shapes for one channel. Returns `None` when no component
/// survives, so empty channels never reach the wire.
fn resolve(
    nested: Option<LineHistory>,
    flat: LineHistory,
    scalar_close: Option<f64>,
) -> Option<LineHistory> {
    let n = nested.unwrap_or_default();
    let tuple = LineHistory {
        open: finite(n.open).or(finite(flat.open)),
        min: finite(n.min).or(finite(flat.min)),
        max: finite(n.max).or(finite(flat.max)),
        close: finite(n.close)
            .or(finite(flat.close))
            .or(finite(scalar_close)),
    };
    tuple.has_values().then_some(tuple)
}

fn sided(h: &Option<SidedHistory>) -> (Option<LineHistory>, Option<LineHistory>) {
    match h {
        Some(s) => (s.home, s.away),
        None => (None, None),
    }
}

/// Resolve every market channel on a record.
pub fn extract(game: &GameRecord) -> MarketHistory {
    let m = &game.markets;
    let l = &m.lines;
    let (spread_home, spread_away) = sided(&m.spread_history);
    let (ml_home, ml_away) = sided(&m.moneyline_history);
    let (vig_home, vig_away) = sided(&m.spread_odds_history);

    MarketHistory {
        home_spread: resolve(
            spread_home,
            LineHistory {
                open: l.home_line_open,
                min: l.home_line_min,
                max: l.home_line_max,
                close: l.home_line_close,
            },
            l.spread,
        ),
        // No scalar fallback: the bare spread field is home-relative.
        away_spread: resolve(
            spread_away,
            LineHistory {
                open: l.away_line_open,
                min: l.away_line_min,
                max: l.away_line_max,
                close: l.away_line_close,
            },
            None,
        ),
        home_moneyline: resolve(
            ml_home,
            LineHistory {
                open: l.home_moneyline_open,
                min: l.home_moneyline_min,
                max: l.home_moneyline_max,
                close: l.home_moneyline_close,
            },
            l.home_moneyline,
        ),
        away_moneyline: resolve(
            ml_away,
            LineHistory {
                open: l.away_moneyline_open,
                min: l.away_moneyline_min,
                max: l.away_moneyline_max,
                close: l.away_moneyline_close,
            },
            l.away_moneyline,
        ),
        total: resolve(
            m.total_history,
            LineHistory {
                open: l.total_open,
                min: l.total_min,
                max: l.total_max,
                close: l.total_close,
            },
            l.over_under,
        ),
        home_spread_price: resolve(
            vig_home,
            LineHistory {
                open: l.home_spread_price_open,
                min: l.home_spread_price_min,
                max: l.home_spread_price_max,
                close: l.home_spread_price_close,
            },
            l.home_spread_price,
        ),
        away_spread_price: resolve(
            vig_away,
            LineHistory {
                open: l.away_spread_price_open,
                min: l.away_spread_price_min,
                max: l.away_spread_price_max,
                close: l.away_spread_price_close,
            },
            l.away_spread_price,
        ),
        over_price: resolve(
            m.total_over_odds_history,
            LineHistory {
                open: l.over_price_open,
                min: l.over_price_min,
                max: l.over_price_max,
                close: l.over_price_close,
            },
            l.over_price,
        ),
        under_price: resolve(
            m.total_under_odds_history,
            LineHistory {
                open: l.under_price_open,
                min: l.under_price_min,
                max: l.under_price_max,
                close: l.under_price_close,
            },
            l.under_price,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameMarkets, GameRecord, SeasonType};
    use chrono::{TimeZone, Utc};

    fn record(markets: GameMarkets) -> GameRecord {
        GameRecord {
            id: 1,
            season: 2024,
            week: Some(1),
            season_type: SeasonType::Regular,
            start_date: Utc.with_ymd_and_hms(2024, 9, 7, 19, 0, 0).unwrap(),
            home_team: "Home".into(),
            home_conference: None,
            home_score: None,
            away_team: "Away".into(),
            away_conference: None,
            away_score: None,
            completed: false,
            line_provider: None,
            markets,
        }
    }

    #[test]
    fn nested_values_win_per_field() {
        let mut markets = GameMarkets::default();
        markets.spread_history = Some(SidedHistory {
            home: Some(LineHistory {
                open: Some(-7.0),
                // min missing here, flat fills it in.
                min: None,
                max: Some(-6.5),
                close: Some(-9.0),
            }),
            away: None,
        });
        markets.lines.home_line_open = Some(-3.0);
        markets.lines.home_line_min = Some(-8.0);
        markets.lines.home_line_close = Some(-4.0);

        let out = extract(&record(markets));
        let hs = out.home_spread.unwrap();
        assert_eq!(hs.open, Some(-7.0));
        assert_eq!(hs.min, Some(-8.0));
        assert_eq!(hs.max, Some(-6.5));
        assert_eq!(hs.close, Some(-9.0));
    }

    #[test]
    fn scalar_backfills_close_only_when_channel_has_none() {
        let mut markets = GameMarkets::default();
        markets.lines.spread = Some(-6.5);
        let out = extract(&record(markets.clone()));
        assert_eq!(out.home_spread.unwrap().close, Some(-6.5));

        markets.lines.home_line_close = Some(-7.5);
        let out = extract(&record(markets));
        assert_eq!(out.home_spread.unwrap().close, Some(-7.5));
    }

    #[test]
    fn non_finite_nested_value_falls_back_to_flat() {
        let mut markets = GameMarkets::default();
        markets.total_history = Some(LineHistory {
            open: Some(f64::NAN),
            ..Default::default()
        });
        markets.lines.total_open = Some(51.5);
        let out = extract(&record(markets));
        assert_eq!(out.total.unwrap().open, Some(51.5));
    }

    #[test]
    fn empty_channel_is_omitted() {
        let out = extract(&record(GameMarkets::default()));
        assert_eq!(out.home_spread, None);
        assert_eq!(out.total, None);
        assert_eq!(out, MarketHistory::default());
    }

    #[test]
    fn away_spread_ignores_the_bare_scalar() {
        let mut markets = GameMarkets::default();
        markets.lines.spread = Some(-3.0);
        let out = extract(&record(markets));
        assert_eq!(out.home_spread.unwrap().close, Some(-3.0));
        assert_eq!(out.away_spread, None);
    }

    #[test]
    fn scalar_moneylines_and_prices_seed_their_channels() {
        let mut markets = GameMarkets::default();
        markets.lines.home_moneyline = Some(-150.0);
        markets.lines.away_moneyline = Some(130.0);
        markets.lines.over_price = Some(-110.0);
        let out = extract(&record(markets));
        assert_eq!(out.home_moneyline.unwrap().close, Some(-150.0));
        assert_eq!(out.away_moneyline.unwrap().close, Some(130.0));
        assert_eq!(out.over_price.unwrap().close, Some(-110.0));
        assert_eq!(out.under_price, None);
    }
}
