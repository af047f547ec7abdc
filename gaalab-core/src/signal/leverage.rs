//! Leverage recommendation for a selection.
//!
//! Recommends the leveraged factor only when every selected instrument
//! trades above its long SMA and its realized volatility is below the
//! threshold. Anything else, an all-cash selection included, is 1x.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{PriceTable, Selection};
use crate::indicators::{RealizedVol, Sma};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeverageConfig {
    pub enabled: bool,
    /// About ten months of trading days.
    pub sma_window: usize,
    pub vol_window: usize,
    /// Annualised, as a fraction.
    pub max_vol: f64,
    pub factor: u32,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sma_window: 210,
            vol_window: 20,
            max_vol: 0.30,
            factor: 3,
        }
    }
}

/// Recommended exposure multiple, rendered as `3x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leverage(pub u32);

impl Leverage {
    pub const UNLEVERED: Leverage = Leverage(1);
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeverageGate {
    sma: Sma,
    vol: RealizedVol,
    max_vol: f64,
    factor: u32,
}

impl LeverageGate {
    /// Returns `None` for unusable windows, a non-positive threshold or a
    /// zero factor.
    pub fn new(config: &LeverageConfig) -> Option<Self> {
        let max_vol_ok = config.max_vol.is_finite() && config.max_vol > 0.0;
        if !max_vol_ok || config.factor == 0 {
            return None;
        }
        Some(Self {
            sma: Sma::new(config.sma_window)?,
            vol: RealizedVol::new(config.vol_window)?,
            max_vol: config.max_vol,
            factor: config.factor,
        })
    }

    /// Whether one instrument clears both conditions. Missing or short
    /// history never clears.
    pub fn clears(&self, table: &PriceTable, symbol: &str) -> bool {
        let Some(series) = table.get(symbol) else {
            return false;
        };
        let (Some(last), Some(sma), Some(vol)) =
            (series.last(), self.sma.latest(series), self.vol.latest(series))
        else {
            return false;
        };
        last.close > sma && vol < self.max_vol
    }

    pub fn recommend(&self, table: &PriceTable, selection: &Selection) -> Leverage {
        let mut instruments = selection.instruments().peekable();
        if instruments.peek().is_none() {
            return Leverage::UNLEVERED;
        }
        if instruments.all(|symbol| self.clears(table, symbol)) {
            Leverage(self.factor)
        } else {
            Leverage::UNLEVERED
        }
    }
}
