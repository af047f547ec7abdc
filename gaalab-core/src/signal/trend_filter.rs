//! Price-above-moving-average eligibility gate.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{PriceTable, Symbol};
use crate::indicators::Sma;

/// Per-instrument trend diagnostics as of its latest observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendReading {
    pub last_date: NaiveDate,
    pub last_close: f64,
    /// `None` with fewer observations than the window.
    pub sma: Option<f64>,
    pub eligible: bool,
}

impl TrendReading {
    /// Close minus SMA, when the SMA exists.
    pub fn distance(&self) -> Option<f64> {
        self.sma.map(|sma| self.last_close - sma)
    }
}

pub type Eligibility = BTreeMap<Symbol, TrendReading>;

/// Eligible iff at least `sma.window()` observations exist and the latest
/// close is strictly above their mean.
pub fn trend_filter(table: &PriceTable, sma: Sma) -> Eligibility {
    table
        .iter()
        .filter_map(|(symbol, series)| {
            let last = series.last()?;
            let mean = sma.latest(series);
            let eligible = mean.is_some_and(|m| last.close > m);
            Some((
                symbol.to_string(),
                TrendReading {
                    last_date: last.date,
                    last_close: last.close,
                    sma: mean,
                    eligible,
                },
            ))
        })
        .collect()
}
