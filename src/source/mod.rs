//! Tiered slate resolution: database, then shared cache, then local file,
//! then generated demo data. Resolution is infallible; some tier always
//! answers.

pub mod cache;
pub mod demo;
pub mod file;

use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::games as db_games;
use crate::source::cache::SharedCache;
use crate::types::{GameRecord, SourceTier};

pub struct GameSource {
    pool: Option<SqlitePool>,
    cache: Option<SharedCache>,
    data_dir: String,
    loads: AtomicU64,
}

impl GameSource {
    pub fn new(
        pool: Option<SqlitePool>,
        cache: Option<SharedCache>,
        data_dir: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            cache,
            data_dir: data_dir.into(),
            loads: AtomicU64::new(0),
        }
    }

    /// Tier walks performed so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn cache_key(season: i32) -> String {
        format!("gridline:games:{season}")
    }

    /// Walk the tiers for one season. A tier that errors or comes back empty
    /// falls through to the next; the demo tier always produces.
    pub async fn load_season(&self, season: i32) -> (Vec<GameRecord>, SourceTier) {
        self.loads.fetch_add(1, Ordering::Relaxed);

        if let Some(pool) = &self.pool {
            match db_games::load_season(pool, season).await {
                Ok(games) if !games.is_empty() => {
                    self.write_back(season, &games).await;
                    return self.resolved(season, games, SourceTier::Database);
                }
                Ok(_) => {}
                Err(e) => warn!(season, error = %e, "Database tier failed"),
            }
        }

        if let Some(cache) = &self.cache {
            if let Some(games) = cache.get_games(&Self::cache_key(season)).await {
                if !games.is_empty() {
                    return self.resolved(season, games, SourceTier::SharedCache);
                }
            }
        }

        if let Some(games) = file::load_season(&self.data_dir, season) {
            self.write_back(season, &games).await;
            return self.resolved(season, games, SourceTier::LocalFile);
        }

        // Demo slates stay out of the shared cache so synthetic rows never
        // shadow real data for other instances.
        let games = demo::season_slate(season);
        self.resolved(season, games, SourceTier::Demo)
    }

    async fn write_back(&self, season: i32, games: &[GameRecord]) {
        if let Some(cache) = &self.cache {
            cache.put_games(&Self::cache_key(season), games).await;
        }
    }

    fn resolved(
        &self,
        season: i32,
        games: Vec<GameRecord>,
        tier: SourceTier,
    ) -> (Vec<GameRecord>, SourceTier) {
        info!(season, tier = %tier, games = games.len(), "Resolved season slate");
        (games, tier)
    }
}
