//! Daily closing prices per instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Symbol;

/// One daily observation: the closing price on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// A point is usable when its close is a finite, strictly positive number.
    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Chronological daily closes for a single instrument.
///
/// Invariant: dates strictly increasing, every close usable. Gaps (weekends,
/// holidays, vendor outages) are kept as gaps; nothing is forward-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from arbitrary points: sorts by date, keeps the first
    /// occurrence of each date and drops unusable closes.
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.retain(PricePoint::is_usable);
        // Stable sort keeps vendor order among equal dates, so dedup keeps the first.
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Points on or before `end`.
    pub fn truncate(&self, end: NaiveDate) -> PriceSeries {
        let cut = self.points.partition_point(|p| p.date <= end);
        PriceSeries {
            points: self.points[..cut].to_vec(),
        }
    }
}

/// Symbol → daily series. Ordered by symbol so every iteration is deterministic.
///
/// Empty series are never stored: an instrument either has usable data or is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    series: BTreeMap<Symbol, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series. Returns false (and stores nothing) when it is empty.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, series: PriceSeries) -> bool {
        if series.is_empty() {
            return false;
        }
        self.series.insert(symbol.into(), series);
        true
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The last date for which every instrument in the table has data at or
    /// before it: the minimum over instruments of their last observation.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.series
            .values()
            .filter_map(|s| s.last().map(|p| p.date))
            .min()
    }

    /// The most recent observation of any instrument.
    pub fn latest(&self) -> Option<NaiveDate> {
        self.series
            .values()
            .filter_map(|s| s.last().map(|p| p.date))
            .max()
    }

    /// A copy holding only points on or before `end`. Instruments left
    /// without data are dropped.
    pub fn truncate(&self, end: NaiveDate) -> PriceTable {
        let mut out = PriceTable::new();
        for (symbol, series) in &self.series {
            out.insert(symbol.clone(), series.truncate(end));
        }
        out
    }
}
