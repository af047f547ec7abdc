//! Synthetic price provider for dry runs and tests.
//!
//! Produces a deterministic random walk per symbol (seeded from a BLAKE3
//! hash of the symbol name). Results are tagged `DataSource::Synthetic` and
//! must never drive a real rebalance.

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::PricePoint;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    drift: f64,
    volatility: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            drift: 0.0003,
            volatility: 0.015,
        }
    }
}

impl SyntheticProvider {
    pub fn new(start_price: f64, drift: f64, volatility: f64) -> Self {
        Self {
            start_price,
            drift,
            volatility,
        }
    }

    /// Weekday closes from `start` to `end` inclusive.
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                let shock: f64 = rng.gen_range(-1.0..1.0) * self.volatility;
                price *= 1.0 + self.drift + shock;
                points.push(PricePoint::new(current, price));
            }
            current += Duration::days(1);
        }

        points
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let points = self.generate(symbol, start, end);
        if points.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            points,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let p = SyntheticProvider::default();
        let a = p.generate("SPY", d("2024-01-01"), d("2024-01-31"));
        let b = p.generate("SPY", d("2024-01-01"), d("2024-01-31"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_differ() {
        let p = SyntheticProvider::default();
        let spy = p.generate("SPY", d("2024-01-01"), d("2024-01-31"));
        let qqq = p.generate("QQQ", d("2024-01-01"), d("2024-01-31"));
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn skips_weekends() {
        let p = SyntheticProvider::default();
        // 2024-01-06 and 07 are Saturday and Sunday
        let points = p.generate("X", d("2024-01-05"), d("2024-01-08"));
        assert_eq!(points.len(), 2);
    }
}
