//! Realized volatility of daily closes.
//!
//! Sample standard deviation of the last `window` simple daily returns,
//! annualised with 252 trading days.

use crate::domain::PriceSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizedVol {
    window: usize,
}

impl RealizedVol {
    /// Returns `None` below two returns, where a sample deviation is undefined.
    pub fn new(window: usize) -> Option<Self> {
        (window >= 2).then_some(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Annualised volatility as a fraction (`0.30` for 30%), or `None` with
    /// fewer than `window + 1` observations.
    pub fn latest(&self, series: &PriceSeries) -> Option<f64> {
        if series.len() < self.window + 1 {
            return None;
        }
        let tail: Vec<f64> = series.closes().rev().take(self.window + 1).collect();
        let returns: Vec<f64> = tail.windows(2).map(|w| w[0] / w[1] - 1.0).collect();

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
    }
}
