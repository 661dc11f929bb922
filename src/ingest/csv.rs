//! CSV slate loading.
//!
//! Parsing never fails a whole file: malformed rows are logged and skipped so
//! one bad export line cannot take down ingestion.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ingest::normalize::{resolve_header, ColumnSpec, RowDraft};
use crate::types::GameRecord;

/// Per-file ingest accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows: usize,
    pub parsed: usize,
    pub skipped: usize,
}

/// Read and parse one CSV export.
pub fn load_file(path: &Path) -> Result<(Vec<GameRecord>, IngestStats)> {
    let text = std::fs::read_to_string(path)?;
    let (games, stats) = parse_records(&text);
    info!(
        path = %path.display(),
        rows = stats.rows,
        parsed = stats.parsed,
        skipped = stats.skipped,
        "Loaded CSV slate"
    );
    Ok((games, stats))
}

/// Parse CSV text into records. The first line is the header; recognized
/// columns come from the mapping table and everything else is ignored.
pub fn parse_records(text: &str) -> (Vec<GameRecord>, IngestStats) {
    let mut columns: Vec<Option<ColumnSpec>> = Vec::new();
    let mut games = Vec::new();
    let mut stats = IngestStats::default();

    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if i == 0 {
            columns = resolve_columns(line);
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        stats.rows += 1;
        match parse_row(line, &columns) {
            Ok(game) => {
                stats.parsed += 1;
                games.push(game);
            }
            Err(e) => {
                stats.skipped += 1;
                warn!(line = i + 1, error = %e, "Skipping malformed CSV row");
            }
        }
    }
    (games, stats)
}

fn resolve_columns(header: &str) -> Vec<Option<ColumnSpec>> {
    header
        .split(',')
        .map(|h| {
            let name = h.trim().trim_matches('"');
            let spec = resolve_header(name);
            if spec.is_none() {
                debug!(column = name, "Ignoring unrecognized CSV column");
            }
            spec
        })
        .collect()
}

fn parse_row(line: &str, columns: &[Option<ColumnSpec>]) -> std::result::Result<GameRecord, String> {
    // Plain comma split: the supported exports never quote commas inside fields.
    let cells: Vec<&str> = line.split(',').map(|c| c.trim().trim_matches('"')).collect();
    if cells.len() != columns.len() {
        return Err(format!(
            "expected {} fields, found {}",
            columns.len(),
            cells.len()
        ));
    }
    let mut draft = RowDraft::default();
    for (spec, cell) in columns.iter().zip(&cells) {
        if let Some(spec) = spec {
            draft.apply(spec, cell)?;
        }
    }
    draft.finish()
}
