//! Local CSV fallback tier.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::ingest::csv;
use crate::types::GameRecord;

/// Where a season's export lives under the data directory.
pub fn season_path(data_dir: &str, season: i32) -> PathBuf {
    Path::new(data_dir).join(format!("games_{season}.csv"))
}

/// Load a season from disk. `None` means the tier has nothing usable and the
/// resolver should fall through.
pub fn load_season(data_dir: &str, season: i32) -> Option<Vec<GameRecord>> {
    let path = season_path(data_dir, season);
    if !path.exists() {
        debug!(path = %path.display(), "No local slate file");
        return None;
    }
    match csv::load_file(&path) {
        Ok((games, _)) if games.is_empty() => {
            warn!(path = %path.display(), "Local slate file parsed to zero games");
            None
        }
        Ok((games, _)) => Some(games),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read local slate file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_path_is_per_season() {
        assert_eq!(
            season_path("data", 2024),
            Path::new("data").join("games_2024.csv")
        );
        assert_ne!(season_path("data", 2023), season_path("data", 2024));
    }

    #[test]
    fn missing_directory_is_a_clean_miss() {
        assert_eq!(load_season("no-such-dir", 2024), None);
    }
}
