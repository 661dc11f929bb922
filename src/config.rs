use crate::error::{AppError, Result};

/// Spread move (points, open to close) at or above which SPREAD STEAM fires.
/// Inclusive: a move of exactly 2.5 points is steam.
pub const SPREAD_STEAM_POINTS: f64 = 2.5;

/// Total move (points, open to close) at or above which TOTAL STEAM fires.
pub const TOTAL_STEAM_POINTS: f64 = 2.0;

/// Implied-probability shift (percentage points, larger side) at or above
/// which ML STEAM fires.
pub const ML_STEAM_PROB_POINTS: f64 = 5.0;

/// Season scorer update interval (seconds).
pub const SCORER_INTERVAL_SECS: u64 = 300;

/// Weeks generated per demo season (last week is the postseason slate).
pub const DEMO_WEEKS: u32 = 12;

/// Demo slates are seeded from this salt xor the season so restarts and
/// repeated requests serve identical data.
pub const DEMO_SEED_SALT: u64 = 0x6772_6964;

/// Weights for the composite volatility score. The score has no intrinsic
/// unit; it only ranks games against each other.
pub mod volatility_weights {
    pub const SPREAD_RANGE_WEIGHT: f64 = 0.5;
    pub const TOTAL_MOVE_WEIGHT: f64 = 0.5;
    pub const TOTAL_RANGE_WEIGHT: f64 = 0.25;
    /// The max probability shift enters the score divided by this.
    pub const PROB_SHIFT_DIVISOR: f64 = 5.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Directory searched for games_{season}.csv fallback files (DATA_DIR).
    pub data_dir: String,
    /// CSV ingested into the database at startup when set (INGEST_CSV).
    pub ingest_csv: Option<String>,
    /// Seasons served and scored (SEASONS, comma-separated years).
    /// Example: "2022,2023,2024"
    pub seasons: Vec<i32>,
    /// Shared REST cache base URL (CACHE_URL). Cache tier disabled when unset.
    pub cache_url: Option<String>,
    /// Bearer token for the shared cache (CACHE_TOKEN).
    pub cache_token: Option<String>,
    /// Shared cache request timeout in milliseconds (CACHE_TIMEOUT_MS).
    pub cache_timeout_ms: u64,
    /// TTL handed to shared cache writes, in seconds (CACHE_TTL_SECS).
    pub cache_ttl_secs: u64,
    /// In-process memo validity window in seconds (REPORT_TTL_SECS).
    pub report_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let seasons = std::env::var("SEASONS")
            .unwrap_or_else(|_| "2024".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i32>()
                    .map_err(|_| AppError::Config(format!("SEASONS entry '{s}' is not a year")))
            })
            .collect::<Result<Vec<i32>>>()?;
        if seasons.is_empty() {
            return Err(AppError::Config("SEASONS must list at least one year".to_string()));
        }

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "gridline.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            ingest_csv: std::env::var("INGEST_CSV").ok().filter(|s| !s.is_empty()),
            cache_url: std::env::var("CACHE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.trim_end_matches('/').to_string()),
            cache_token: std::env::var("CACHE_TOKEN").ok().filter(|s| !s.is_empty()),
            cache_timeout_ms: std::env::var("CACHE_TIMEOUT_MS")
                .unwrap_or_else(|_| "2500".to_string())
                .parse::<u64>()
                .unwrap_or(2500),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse::<u64>()
                .unwrap_or(3600),
            report_ttl_secs: std::env::var("REPORT_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .unwrap_or(300),
            seasons,
        })
    }

    /// Season served when a request does not name one: the latest configured.
    pub fn default_season(&self) -> i32 {
        self.seasons.last().copied().unwrap_or(2024)
    }
}
