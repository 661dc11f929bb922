//! Periodic season aggregation.

mod season_scorer;

pub use season_scorer::{aggregate, SeasonScorer};
