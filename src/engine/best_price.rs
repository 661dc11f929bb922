//! Best-price selection across quoted American lines.

use crate::engine::odds::moneyline_to_decimal;

/// The most favorable quote found for one side, in both odds systems.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestPrice {
    /// The winning American line.
    pub value: Option<f64>,
    /// Its decimal equivalent, the comparison key.
    pub decimal: Option<f64>,
}

/// Pick the candidate with the highest decimal payout. Candidates that fail
/// conversion are skipped; on equal decimals the earliest candidate wins.
pub fn select_best_price(candidates: &[Option<f64>]) -> BestPrice {
    let mut best: Option<(f64, f64)> = None;
    for ml in candidates.iter().copied().flatten() {
        let Some(decimal) = moneyline_to_decimal(ml) else {
            continue;
        };
        if best.map_or(true, |(_, d)| decimal > d) {
            best = Some((ml, decimal));
        }
    }
    BestPrice {
        value: best.map(|(ml, _)| ml),
        decimal: best.map(|(_, d)| d),
    }
}
