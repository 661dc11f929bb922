//! Deterministic demo slates.
//!
//! The last-resort tier fabricates a plausible season so every screen works
//! on a fresh install with no database, cache, or files. Generation is
//! seeded from the season number, so the same season always renders the same
//! board across restarts and instances.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::config::{DEMO_SEED_SALT, DEMO_WEEKS};
use crate::types::{
    GameLines, GameMarkets, GameRecord, LineHistory, SeasonType, SidedHistory,
};

const TEAMS: [(&str, &str); 16] = [
    ("Alabama", "SEC"),
    ("Georgia", "SEC"),
    ("LSU", "SEC"),
    ("Tennessee", "SEC"),
    ("Ohio State", "Big Ten"),
    ("Michigan", "Big Ten"),
    ("Penn State", "Big Ten"),
    ("Wisconsin", "Big Ten"),
    ("Texas", "Big 12"),
    ("Oklahoma State", "Big 12"),
    ("Kansas State", "Big 12"),
    ("TCU", "Big 12"),
    ("Clemson", "ACC"),
    ("Florida State", "ACC"),
    ("Miami", "ACC"),
    ("Louisville", "ACC"),
];

fn half(v: f64) -> f64 {
    (v * 2.0).round() / 2.0
}

/// Rough market-maker curve: juice on the favorite grows with the spread.
fn moneylines_for(spread: f64) -> (f64, f64) {
    if spread < -0.5 {
        let edge = -spread;
        (-(110.0 + edge * 30.0).round(), (100.0 + edge * 26.0).round())
    } else if spread > 0.5 {
        ((100.0 + spread * 26.0).round(), -(110.0 + spread * 30.0).round())
    } else {
        (-110.0, -110.0)
    }
}

/// Generate one season's schedule, lines, and partial results.
pub fn season_slate(season: i32) -> Vec<GameRecord> {
    let mut rng = StdRng::seed_from_u64(DEMO_SEED_SALT ^ season as u64);
    let season_start = Utc
        .with_ymd_and_hms(season, 9, 2, 17, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH);
    let played_weeks = DEMO_WEEKS * 2 / 3;

    let mut games = Vec::with_capacity((DEMO_WEEKS as usize) * TEAMS.len() / 2);
    let mut counter = 0i64;
    for week in 1..=DEMO_WEEKS {
        let mut order: Vec<usize> = (0..TEAMS.len()).collect();
        order.shuffle(&mut rng);
        for (slot, pair) in order.chunks_exact(2).enumerate() {
            counter += 1;
            let (home_team, home_conference) = TEAMS[pair[0]];
            let (away_team, away_conference) = TEAMS[pair[1]];

            let spread_open = half(rng.gen_range(-17.0..17.0));
            let drift = half(rng.gen_range(-4.0..4.0));
            let spread_close = spread_open + drift;
            let widen = half(rng.gen_range(0.0..1.5));
            let spread_min = spread_open.min(spread_close) - widen;
            let spread_max = spread_open.max(spread_close);

            let (home_ml_open, away_ml_open) = moneylines_for(spread_open);
            let (mut home_ml_close, mut away_ml_close) = moneylines_for(spread_close);
            // Occasionally leave both sides plus money so the arb path lights up.
            if rng.gen_ratio(1, 20) {
                home_ml_close = 105.0;
                away_ml_close = 110.0;
            }

            let total_open = half(rng.gen_range(42.0..62.0));
            let total_close = total_open + half(rng.gen_range(-3.0..3.0));

            let mut lines = GameLines {
                spread: Some(spread_close),
                over_under: Some(total_close),
                home_moneyline: Some(home_ml_close),
                away_moneyline: Some(away_ml_close),
                home_spread_price: Some(-110.0),
                away_spread_price: Some(-110.0),
                total_open: Some(total_open),
                total_min: Some(total_open.min(total_close)),
                total_max: Some(total_open.max(total_close)),
                total_close: Some(total_close),
                ..Default::default()
            };
            if counter % 3 == 0 {
                lines.over_price_open = Some(-110.0);
                lines.over_price_close = Some(-105.0);
                lines.under_price = Some(-115.0);
            }

            let markets = GameMarkets {
                lines,
                spread_history: Some(SidedHistory {
                    home: Some(LineHistory {
                        open: Some(spread_open),
                        min: Some(spread_min),
                        max: Some(spread_max),
                        close: Some(spread_close),
                    }),
                    away: Some(LineHistory {
                        open: Some(-spread_open),
                        min: Some(-spread_max),
                        max: Some(-spread_min),
                        close: Some(-spread_close),
                    }),
                }),
                moneyline_history: Some(SidedHistory {
                    home: Some(LineHistory {
                        open: Some(home_ml_open),
                        close: Some(home_ml_close),
                        ..Default::default()
                    }),
                    away: Some(LineHistory {
                        open: Some(away_ml_open),
                        close: Some(away_ml_close),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            };

            let completed = week <= played_weeks;
            let (home_score, away_score) = if completed {
                let away = rng.gen_range(7..35);
                let margin = (-spread_close).round() as i32 + rng.gen_range(-10..11);
                (Some((away + margin).max(0)), Some(away))
            } else {
                (None, None)
            };

            games.push(GameRecord {
                id: i64::from(season) * 100_000 + counter,
                season,
                week: Some(week as i32),
                season_type: if week == DEMO_WEEKS {
                    SeasonType::Postseason
                } else {
                    SeasonType::Regular
                },
                start_date: season_start
                    + Duration::weeks(i64::from(week) - 1)
                    + Duration::hours(slot as i64 * 3),
                home_team: home_team.to_string(),
                home_conference: Some(home_conference.to_string()),
                home_score,
                away_team: away_team.to_string(),
                away_conference: Some(away_conference.to_string()),
                away_score,
                completed,
                line_provider: Some("consensus".to_string()),
                markets,
            });
        }
    }
    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;

    #[test]
    fn slates_are_deterministic() {
        assert_eq!(season_slate(2024), season_slate(2024));
    }

    #[test]
    fn slate_covers_every_week_with_a_full_card() {
        let slate = season_slate(2024);
        assert_eq!(slate.len(), DEMO_WEEKS as usize * TEAMS.len() / 2);
        for week in 1..=DEMO_WEEKS {
            let card = slate
                .iter()
                .filter(|g| g.week == Some(week as i32))
                .count();
            assert_eq!(card, TEAMS.len() / 2, "week {week}");
        }
    }

    #[test]
    fn completed_games_carry_scores_and_upcoming_do_not() {
        for game in season_slate(2024) {
            if game.completed {
                assert!(game.home_score.is_some() && game.away_score.is_some());
            } else {
                assert!(game.home_score.is_none() && game.away_score.is_none());
            }
        }
    }

    #[test]
    fn seasons_shuffle_into_different_schedules() {
        let a: Vec<String> = season_slate(2023).into_iter().map(|g| g.home_team).collect();
        let b: Vec<String> = season_slate(2024).into_iter().map(|g| g.home_team).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn slate_decorates_into_a_live_board() {
        let reports = engine::decorate_all(season_slate(2024));
        assert!(reports.iter().all(|r| r.volatility_score.is_finite()));
        assert!(reports.iter().all(|r| r.markets.home_spread.is_some()));
        assert!(reports.iter().any(|r| !r.signals.is_empty()));
        assert!(reports.iter().any(|r| r.markets.over_price.is_some()));
    }
}
