//! Composite multi-horizon momentum.
//!
//! score = Σ_h (close[t] / close[t-h] - 1) over monthly closes, where `t` is
//! the evaluation month and `t-h` the calendar month `h` months earlier.
//! An instrument missing the evaluation month or any horizon month has no
//! score at all; it is never scored as zero.

use std::collections::BTreeMap;

use super::monthly::{monthly_closes, MonthlyClose};
use crate::domain::{MonthKey, PriceSeries, PriceTable, Symbol};

/// Lookback horizons in months.
pub const DEFAULT_HORIZONS: [u32; 4] = [1, 3, 6, 9];

/// Instrument → composite score. Absent means "not enough history".
pub type MomentumScores = BTreeMap<Symbol, f64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumScorer {
    horizons: Vec<u32>,
}

impl Default for MomentumScorer {
    fn default() -> Self {
        Self {
            horizons: DEFAULT_HORIZONS.to_vec(),
        }
    }
}

impl MomentumScorer {
    /// Returns `None` when `horizons` is empty or contains a zero.
    pub fn new(horizons: Vec<u32>) -> Option<Self> {
        if horizons.is_empty() || horizons.contains(&0) {
            return None;
        }
        Some(Self { horizons })
    }

    pub fn horizons(&self) -> &[u32] {
        &self.horizons
    }

    /// Longest horizon: the number of months of history needed before `t`.
    pub fn max_horizon(&self) -> u32 {
        self.horizons.iter().copied().max().unwrap_or(0)
    }

    /// Score a monthly series at `eval`.
    pub fn score_monthly(&self, monthly: &[MonthlyClose], eval: MonthKey) -> Option<f64> {
        let close_at = |month: MonthKey| {
            monthly
                .binary_search_by_key(&month, |m| m.month)
                .ok()
                .map(|i| monthly[i].close)
        };

        let now = close_at(eval)?;
        self.horizons.iter().try_fold(0.0, |acc, &h| {
            let then = close_at(eval.minus(h))?;
            Some(acc + (now / then - 1.0))
        })
    }

    pub fn score_series(&self, series: &PriceSeries, eval: MonthKey) -> Option<f64> {
        self.score_monthly(&monthly_closes(series), eval)
    }

    /// Score every instrument of the table; instruments without a full
    /// history are left out of the map.
    pub fn score(&self, table: &PriceTable, eval: MonthKey) -> MomentumScores {
        table
            .iter()
            .filter_map(|(symbol, series)| {
                self.score_series(series, eval)
                    .map(|score| (symbol.to_string(), score))
            })
            .collect()
    }
}
