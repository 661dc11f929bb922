use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::engine;
use crate::source::GameSource;
use crate::types::{GameReport, SourceTier};

// ---------------------------------------------------------------------------
// SeasonSlate
// ---------------------------------------------------------------------------

/// One season's decorated slate plus where it came from. Cheap to clone;
/// readers share the report vector.
#[derive(Clone)]
pub struct SeasonSlate {
    pub reports: Arc<Vec<GameReport>>,
    pub tier: SourceTier,
    pub loaded_at: Instant,
}

// ---------------------------------------------------------------------------
// ReportHub
// ---------------------------------------------------------------------------

/// Serves decorated slates to every endpoint. Loads are memoized per season
/// with a TTL, and concurrent cold reads for the same season collapse into a
/// single tier walk. Expired slates are evicted on the next read or resolve
/// rather than lingering until process exit.
pub struct ReportHub {
    source: GameSource,
    /// season → decorated slate, valid for `ttl` after load
    memo: DashMap<i32, SeasonSlate>,
    /// season → load guard, present only while that season's load is in flight
    flights: DashMap<i32, Arc<Mutex<()>>>,
    ttl: Duration,
    latency: Arc<LatencyStats>,
    health: Arc<HealthState>,
}

impl ReportHub {
    pub fn new(
        source: GameSource,
        ttl: Duration,
        latency: Arc<LatencyStats>,
        health: Arc<HealthState>,
    ) -> Arc<Self> {
        Arc::new(Self {
            source,
            memo: DashMap::new(),
            flights: DashMap::new(),
            ttl,
            latency,
            health,
        })
    }

    /// Get a season's slate, loading and decorating it if the memo is cold.
    pub async fn season(&self, season: i32) -> SeasonSlate {
        if let Some(slate) = self.fresh(season) {
            return slate;
        }

        let flight = self
            .flights
            .entry(season)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = flight.lock().await;

        // Another task may have landed the slate while we waited on the lock.
        if let Some(slate) = self.fresh(season) {
            self.flights.remove(&season);
            return slate;
        }

        let started = Instant::now();
        let (games, tier) = self.source.load_season(season).await;
        let reports = engine::decorate_all(games);
        let elapsed = started.elapsed();
        self.latency.record(elapsed);

        let slate = SeasonSlate {
            reports: Arc::new(reports),
            tier,
            loaded_at: Instant::now(),
        };
        // Sweep seasons that expired while this load ran; eviction rides on
        // resolves instead of a background timer.
        self.memo
            .retain(|_, cached| cached.loaded_at.elapsed() <= self.ttl);
        self.memo.insert(season, slate.clone());
        // Waiters still queued on this flight hold their own handle to the
        // lock and will hit the memo on their re-check.
        self.flights.remove(&season);
        self.health.mark_resolve(tier);
        self.health.set_seasons_cached(self.memo.len() as u64);
        info!(
            season,
            tier = %tier,
            games = slate.reports.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Season slate refreshed"
        );
        slate
    }

    fn fresh(&self, season: i32) -> Option<SeasonSlate> {
        if let Some(slate) = self.memo.get(&season) {
            if slate.loaded_at.elapsed() <= self.ttl {
                return Some(slate.clone());
            }
        }
        // Evict rather than skip; remove_if re-checks staleness under the
        // shard lock so a slate another task just refreshed survives.
        self.memo
            .remove_if(&season, |_, slate| slate.loaded_at.elapsed() > self.ttl);
        None
    }

    pub fn source(&self) -> &GameSource {
        &self.source
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_hub(ttl: Duration) -> Arc<ReportHub> {
        ReportHub::new(
            GameSource::new(None, None, "no-such-dir"),
            ttl,
            Arc::new(LatencyStats::new()),
            Arc::new(HealthState::new()),
        )
    }

    #[tokio::test]
    async fn memo_serves_the_second_read() {
        let hub = demo_hub(Duration::from_secs(300));
        let a = hub.season(2024).await;
        let b = hub.season(2024).await;
        assert!(Arc::ptr_eq(&a.reports, &b.reports));
        assert_eq!(hub.source().load_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_cold_reads_walk_the_tiers_once() {
        let hub = demo_hub(Duration::from_secs(300));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let hub = hub.clone();
            handles.push(tokio::spawn(async move { hub.season(2024).await }));
        }
        for handle in handles {
            let slate = handle.await.unwrap();
            assert_eq!(slate.tier, SourceTier::Demo);
        }
        assert_eq!(hub.source().load_count(), 1);
        assert!(hub.flights.is_empty());
    }

    #[tokio::test]
    async fn seasons_are_memoized_independently() {
        let hub = demo_hub(Duration::from_secs(300));
        hub.season(2023).await;
        hub.season(2024).await;
        hub.season(2023).await;
        assert_eq!(hub.source().load_count(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_reloads_every_read() {
        let hub = demo_hub(Duration::ZERO);
        hub.season(2024).await;
        hub.season(2024).await;
        assert_eq!(hub.source().load_count(), 2);
    }

    #[tokio::test]
    async fn expired_seasons_are_evicted_not_retained() {
        let hub = demo_hub(Duration::from_secs(1));
        for season in 2020..2025 {
            hub.season(season).await;
        }
        assert_eq!(hub.memo.len(), 5);
        assert!(hub.flights.is_empty());

        tokio::time::sleep(Duration::from_millis(1200)).await;
        hub.season(2025).await;

        // The resolve swept every stale season; only the new one is resident.
        assert_eq!(hub.memo.len(), 1);
        assert!(hub.flights.is_empty());
        assert_eq!(hub.health.seasons_cached(), 1);
        assert_eq!(hub.source().load_count(), 6);
    }

    #[tokio::test]
    async fn stale_read_evicts_and_reloads() {
        let hub = demo_hub(Duration::from_millis(50));
        hub.season(2024).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        hub.season(2024).await;
        assert_eq!(hub.source().load_count(), 2);
        assert_eq!(hub.memo.len(), 1);
    }

    #[tokio::test]
    async fn resolves_are_timed_and_reported() {
        let hub = demo_hub(Duration::from_secs(300));
        let latency = hub.latency.clone();
        let health = hub.health.clone();
        hub.season(2024).await;
        assert_eq!(latency.len(), 1);
        assert_eq!(health.last_tier(), Some(SourceTier::Demo));
        assert_eq!(health.seasons_cached(), 1);
    }
}
