//! Game and season-stats persistence.

use sqlx::SqlitePool;

use crate::db::models::{GameRow, SeasonStatsRow};
use crate::error::Result;
use crate::types::GameRecord;

/// Upsert a batch of records, returning the count written. Re-ingesting the
/// same export is idempotent.
pub async fn upsert_games(pool: &SqlitePool, games: &[GameRecord]) -> Result<u64> {
    let mut written = 0u64;
    for game in games {
        let market_json = serde_json::to_string(&game.markets)?;
        sqlx::query(
            r#"
            INSERT INTO games (
                id, season, week, season_type, start_date,
                home_team, home_conference, home_score,
                away_team, away_conference, away_score,
                completed, line_provider, market_json
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                season = excluded.season,
                week = excluded.week,
                season_type = excluded.season_type,
                start_date = excluded.start_date,
                home_team = excluded.home_team,
                home_conference = excluded.home_conference,
                home_score = excluded.home_score,
                away_team = excluded.away_team,
                away_conference = excluded.away_conference,
                away_score = excluded.away_score,
                completed = excluded.completed,
                line_provider = excluded.line_provider,
                market_json = excluded.market_json
            "#,
        )
        .bind(game.id)
        .bind(game.season)
        .bind(game.week)
        .bind(game.season_type.to_string())
        .bind(game.start_date.to_rfc3339())
        .bind(&game.home_team)
        .bind(game.home_conference.as_deref())
        .bind(game.home_score)
        .bind(&game.away_team)
        .bind(game.away_conference.as_deref())
        .bind(game.away_score)
        .bind(i64::from(game.completed))
        .bind(game.line_provider.as_deref())
        .bind(market_json)
        .execute(pool)
        .await?;
        written += 1;
    }
    Ok(written)
}

/// Load a season's slate in schedule order. Rows that fail rehydration are
/// dropped, not fatal.
pub async fn load_season(pool: &SqlitePool, season: i32) -> Result<Vec<GameRecord>> {
    let rows = sqlx::query_as::<_, GameRow>(
        "SELECT * FROM games WHERE season = ? ORDER BY start_date, id",
    )
    .bind(season)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().filter_map(GameRow::into_record).collect())
}

pub async fn upsert_season_stats(pool: &SqlitePool, stats: &SeasonStatsRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO season_stats (
            season, games, completed_games,
            spread_steam, reverse, total_steam, ml_steam, arb,
            avg_volatility, max_volatility, last_updated
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(season) DO UPDATE SET
            games = excluded.games,
            completed_games = excluded.completed_games,
            spread_steam = excluded.spread_steam,
            reverse = excluded.reverse,
            total_steam = excluded.total_steam,
            ml_steam = excluded.ml_steam,
            arb = excluded.arb,
            avg_volatility = excluded.avg_volatility,
            max_volatility = excluded.max_volatility,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(stats.season)
    .bind(stats.games)
    .bind(stats.completed_games)
    .bind(stats.spread_steam)
    .bind(stats.reverse)
    .bind(stats.total_steam)
    .bind(stats.ml_steam)
    .bind(stats.arb)
    .bind(stats.avg_volatility)
    .bind(stats.max_volatility)
    .bind(stats.last_updated)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn load_season_stats(
    pool: &SqlitePool,
    season: i32,
) -> Result<Option<SeasonStatsRow>> {
    let row = sqlx::query_as::<_, SeasonStatsRow>(
        "SELECT * FROM season_stats WHERE season = ?",
    )
    .bind(season)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameMarkets, LineHistory, SeasonType, SidedHistory};
    use chrono::{TimeZone, Utc};

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn sample(id: i64, season: i32) -> GameRecord {
        let mut markets = GameMarkets::default();
        markets.spread_history = Some(SidedHistory {
            home: Some(LineHistory {
                open: Some(-7.0),
                min: Some(-7.5),
                max: Some(-3.0),
                close: Some(-3.5),
            }),
            away: None,
        });
        markets.lines.over_under = Some(51.0);
        GameRecord {
            id,
            season,
            week: Some(2),
            season_type: SeasonType::Regular,
            start_date: Utc.with_ymd_and_hms(2024, 9, 14, 19, 30, 0).unwrap(),
            home_team: "LSU".into(),
            home_conference: Some("SEC".into()),
            home_score: Some(27),
            away_team: "Wisconsin".into(),
            away_conference: Some("Big Ten".into()),
            away_score: Some(21),
            completed: true,
            line_provider: Some("consensus".into()),
            markets,
        }
    }

    #[tokio::test]
    async fn games_round_trip_with_nested_markets() {
        let pool = test_pool().await;
        let game = sample(1, 2024);
        assert_eq!(upsert_games(&pool, &[game.clone()]).await.unwrap(), 1);

        let loaded = load_season(&pool, 2024).await.unwrap();
        assert_eq!(loaded, vec![game]);
    }

    #[tokio::test]
    async fn upserting_twice_keeps_one_row() {
        let pool = test_pool().await;
        let mut game = sample(1, 2024);
        upsert_games(&pool, &[game.clone()]).await.unwrap();
        game.home_score = Some(35);
        upsert_games(&pool, &[game.clone()]).await.unwrap();

        let loaded = load_season(&pool, 2024).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].home_score, Some(35));
    }

    #[tokio::test]
    async fn seasons_do_not_bleed_into_each_other() {
        let pool = test_pool().await;
        upsert_games(&pool, &[sample(1, 2023), sample(2, 2024)])
            .await
            .unwrap();
        let loaded = load_season(&pool, 2022).await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(load_season(&pool, 2023).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn slate_comes_back_in_schedule_order() {
        let pool = test_pool().await;
        let mut early = sample(9, 2024);
        early.start_date = Utc.with_ymd_and_hms(2024, 9, 1, 16, 0, 0).unwrap();
        let late = sample(1, 2024);
        upsert_games(&pool, &[late, early]).await.unwrap();

        let loaded = load_season(&pool, 2024).await.unwrap();
        assert_eq!(loaded[0].id, 9);
        assert_eq!(loaded[1].id, 1);
    }

    #[tokio::test]
    async fn season_stats_round_trip() {
        let pool = test_pool().await;
        assert_eq!(load_season_stats(&pool, 2024).await.unwrap(), None);

        let mut stats = SeasonStatsRow {
            season: 2024,
            games: 96,
            completed_games: 64,
            spread_steam: 12,
            reverse: 30,
            total_steam: 9,
            ml_steam: 7,
            arb: 2,
            avg_volatility: Some(2.41),
            max_volatility: Some(11.5),
            last_updated: 1_700_000_000,
        };
        upsert_season_stats(&pool, &stats).await.unwrap();
        stats.games = 104;
        upsert_season_stats(&pool, &stats).await.unwrap();

        let loaded = load_season_stats(&pool, 2024).await.unwrap().unwrap();
        assert_eq!(loaded, stats);
    }
}
