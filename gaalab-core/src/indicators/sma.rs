//! Simple Moving Average (SMA) over daily closes.
//!
//! Only observed days count toward the window, so a 150-day SMA spans the
//! last 150 trading days of that instrument.

use crate::domain::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sma {
    window: usize,
}

impl Sma {
    /// Returns `None` for a zero window.
    pub fn new(window: usize) -> Option<Self> {
        (window >= 1).then_some(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Mean of the last `window` closes, or `None` with fewer observations.
    pub fn latest(&self, series: &PriceSeries) -> Option<f64> {
        if series.len() < self.window {
            return None;
        }
        let sum: f64 = series.closes().rev().take(self.window).sum();
        Some(sum / self.window as f64)
    }
}
