//! Price-derived indicators.
//!
//! All indicators are pure functions of a `PriceSeries` and operate on
//! observed days only (gaps are skipped, never forward-filled).

pub mod momentum;
pub mod monthly;
pub mod sma;
pub mod volatility;

pub use momentum::{MomentumScorer, MomentumScores, DEFAULT_HORIZONS};
pub use monthly::{monthly_closes, MonthlyClose};
pub use sma::Sma;
pub use volatility::RealizedVol;

/// Build a daily series from closes on consecutive calendar days starting at `start`.
#[cfg(test)]
pub fn make_series(start: chrono::NaiveDate, closes: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PricePoint, PriceSeries};
    PriceSeries::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
            .collect(),
    )
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
