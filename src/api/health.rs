//! Shared health state for the /health endpoint.
//! Updated by the startup wiring and the report hub, read by the API.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::SourceTier;

/// Shared health metrics. Components record, API reads.
pub struct HealthState {
    /// True when the sqlite pool connected and migrated at startup.
    pub db_available: AtomicBool,
    /// True when a shared cache URL was configured.
    pub cache_configured: AtomicBool,
    /// Nanosecond timestamp of the last slate resolve (0 = none yet).
    pub last_resolve_at_ns: AtomicU64,
    /// Seasons currently held in the report memo.
    pub seasons_cached: AtomicU64,
    /// Tier of the last resolve as `SourceTier as u8`; u8::MAX = none yet.
    pub last_tier: AtomicU8,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            db_available: AtomicBool::new(false),
            cache_configured: AtomicBool::new(false),
            last_resolve_at_ns: AtomicU64::new(0),
            seasons_cached: AtomicU64::new(0),
            last_tier: AtomicU8::new(u8::MAX),
        }
    }

    pub fn set_db_available(&self, v: bool) {
        self.db_available.store(v, Ordering::Relaxed);
    }

    pub fn set_cache_configured(&self, v: bool) {
        self.cache_configured.store(v, Ordering::Relaxed);
    }

    pub fn set_seasons_cached(&self, n: u64) {
        self.seasons_cached.store(n, Ordering::Relaxed);
    }

    /// Note a completed slate resolve and which tier answered.
    pub fn mark_resolve(&self, tier: SourceTier) {
        self.last_tier.store(tier as u8, Ordering::Relaxed);
        self.last_resolve_at_ns.store(now_ns(), Ordering::Relaxed);
    }

    pub fn db_available(&self) -> bool {
        self.db_available.load(Ordering::Relaxed)
    }

    pub fn cache_configured(&self) -> bool {
        self.cache_configured.load(Ordering::Relaxed)
    }

    pub fn last_resolve_at_ns(&self) -> u64 {
        self.last_resolve_at_ns.load(Ordering::Relaxed)
    }

    pub fn seasons_cached(&self) -> u64 {
        self.seasons_cached.load(Ordering::Relaxed)
    }

    pub fn last_tier(&self) -> Option<SourceTier> {
        SourceTier::from_u8(self.last_tier.load(Ordering::Relaxed))
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
