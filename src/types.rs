use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Game record
// ---------------------------------------------------------------------------

/// One contest as ingested. Wire names are camelCase; nullable numerics
/// serialize as JSON null so clients never branch on missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: i64,
    pub season: i32,
    pub week: Option<i32>,
    #[serde(default)]
    pub season_type: SeasonType,
    pub start_date: DateTime<Utc>,
    pub home_team: String,
    pub home_conference: Option<String>,
    pub home_score: Option<i32>,
    pub away_team: String,
    pub away_conference: Option<String>,
    pub away_score: Option<i32>,
    pub completed: bool,
    /// Book that supplied the lines, when known.
    pub line_provider: Option<String>,
    #[serde(flatten)]
    pub markets: GameMarkets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SeasonType {
    #[default]
    Regular,
    Postseason,
}

impl SeasonType {
    /// Case-insensitive parse of provider spellings.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "regular_season" | "regularseason" => Some(SeasonType::Regular),
            "postseason" | "post" | "bowl" | "playoff" => Some(SeasonType::Postseason),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SeasonType::Regular => "Regular",
            SeasonType::Postseason => "Postseason",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Market data carried on a record
// ---------------------------------------------------------------------------

/// Everything a record can say about its betting markets. Values arrive in up
/// to three shapes: nested per-market histories, flat per-channel fields, and
/// bare closing scalars. The history extractor resolves them in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMarkets {
    #[serde(flatten)]
    pub lines: GameLines,
    pub spread_history: Option<SidedHistory>,
    pub total_history: Option<LineHistory>,
    pub moneyline_history: Option<SidedHistory>,
    pub spread_odds_history: Option<SidedHistory>,
    pub total_over_odds_history: Option<LineHistory>,
    pub total_under_odds_history: Option<LineHistory>,
}

/// One market channel's observed range over the betting window.
/// Every component is nullable; a tuple with no values is never attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineHistory {
    pub open: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub close: Option<f64>,
}

impl LineHistory {
    pub fn has_values(&self) -> bool {
        self.open.is_some() || self.min.is_some() || self.max.is_some() || self.close.is_some()
    }
}

/// Home/away pair of history tuples for two-sided markets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SidedHistory {
    pub home: Option<LineHistory>,
    pub away: Option<LineHistory>,
}

/// Flat canonical line fields. Spreads are home-relative points (negative
/// when the home side is favored); moneylines are American odds; prices are
/// the vig on the named bet, also in American odds. The ingest mapping table
/// is the only producer of these names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLines {
    // Closing scalars, used as a channel's close when no explicit close exists.
    pub spread: Option<f64>,
    pub over_under: Option<f64>,
    pub home_moneyline: Option<f64>,
    pub away_moneyline: Option<f64>,
    pub home_spread_price: Option<f64>,
    pub away_spread_price: Option<f64>,
    pub over_price: Option<f64>,
    pub under_price: Option<f64>,

    // Spread channels.
    pub home_line_open: Option<f64>,
    pub home_line_min: Option<f64>,
    pub home_line_max: Option<f64>,
    pub home_line_close: Option<f64>,
    pub away_line_open: Option<f64>,
    pub away_line_min: Option<f64>,
    pub away_line_max: Option<f64>,
    pub away_line_close: Option<f64>,

    // Moneyline channels.
    pub home_moneyline_open: Option<f64>,
    pub home_moneyline_min: Option<f64>,
    pub home_moneyline_max: Option<f64>,
    pub home_moneyline_close: Option<f64>,
    pub away_moneyline_open: Option<f64>,
    pub away_moneyline_min: Option<f64>,
    pub away_moneyline_max: Option<f64>,
    pub away_moneyline_close: Option<f64>,

    // Total channel.
    pub total_open: Option<f64>,
    pub total_min: Option<f64>,
    pub total_max: Option<f64>,
    pub total_close: Option<f64>,

    // Spread vig channels.
    pub home_spread_price_open: Option<f64>,
    pub home_spread_price_min: Option<f64>,
    pub home_spread_price_max: Option<f64>,
    pub home_spread_price_close: Option<f64>,
    pub away_spread_price_open: Option<f64>,
    pub away_spread_price_min: Option<f64>,
    pub away_spread_price_max: Option<f64>,
    pub away_spread_price_close: Option<f64>,

    // Total vig channels.
    pub over_price_open: Option<f64>,
    pub over_price_min: Option<f64>,
    pub over_price_max: Option<f64>,
    pub over_price_close: Option<f64>,
    pub under_price_open: Option<f64>,
    pub under_price_min: Option<f64>,
    pub under_price_max: Option<f64>,
    pub under_price_close: Option<f64>,
}

// ---------------------------------------------------------------------------
// Resolved market channels
// ---------------------------------------------------------------------------

/// Per-channel tuples after extraction. A channel is absent (and omitted from
/// output) when the record carried no usable values for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_spread: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_spread: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_moneyline: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_moneyline: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_spread_price: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_spread_price: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_price: Option<LineHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub under_price: Option<LineHistory>,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Movement signal vocabulary. Listed in detection order; a report's signal
/// list follows this order and holds each tag at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "SPREAD STEAM")]
    SpreadSteam,
    #[serde(rename = "REVERSE")]
    Reverse,
    #[serde(rename = "TOTAL STEAM")]
    TotalSteam,
    #[serde(rename = "ML STEAM")]
    MlSteam,
    #[serde(rename = "ARB")]
    Arb,
}

impl Signal {
    /// Parse a query-string spelling: case-insensitive, `_` or `-` for space.
    pub fn from_label(s: &str) -> Option<Self> {
        let key = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match key.as_str() {
            "SPREAD STEAM" => Some(Signal::SpreadSteam),
            "REVERSE" => Some(Signal::Reverse),
            "TOTAL STEAM" => Some(Signal::TotalSteam),
            "ML STEAM" => Some(Signal::MlSteam),
            "ARB" => Some(Signal::Arb),
            _ => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::SpreadSteam => "SPREAD STEAM",
            Signal::Reverse => "REVERSE",
            Signal::TotalSteam => "TOTAL STEAM",
            Signal::MlSteam => "ML STEAM",
            Signal::Arb => "ARB",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Decorated report
// ---------------------------------------------------------------------------

/// A game record augmented with derived line metrics. The input record is
/// flattened in unchanged; derived numerics are null when underivable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReport {
    #[serde(flatten)]
    pub game: GameRecord,
    /// Resolved channel tuples; empty channels are omitted.
    pub markets: MarketHistory,
    pub line_move: Option<f64>,
    pub total_move: Option<f64>,
    pub spread_range: Option<f64>,
    pub total_range: Option<f64>,
    pub clv: Option<f64>,
    pub home_probability_shift: Option<f64>,
    pub away_probability_shift: Option<f64>,
    pub best_home_moneyline: Option<f64>,
    pub best_home_decimal: Option<f64>,
    pub best_away_moneyline: Option<f64>,
    pub best_away_decimal: Option<f64>,
    pub arb_profit: Option<f64>,
    pub signals: Vec<Signal>,
    pub volatility_score: f64,
}

// ---------------------------------------------------------------------------
// Source resolution
// ---------------------------------------------------------------------------

/// Which fallback tier produced a slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Database,
    SharedCache,
    LocalFile,
    Demo,
}

impl SourceTier {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(SourceTier::Database),
            1 => Some(SourceTier::SharedCache),
            2 => Some(SourceTier::LocalFile),
            3 => Some(SourceTier::Demo),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceTier::Database => "database",
            SourceTier::SharedCache => "shared_cache",
            SourceTier::LocalFile => "local_file",
            SourceTier::Demo => "demo",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
