//! Strategies run by the notifier.
//!
//! A strategy never fails the run: whatever goes wrong is folded into
//! [`StrategyOutcome::Error`] so the remaining strategies still execute.

pub mod gaa;
pub mod spy_tips;

pub use gaa::GaaMomentum;
pub use spy_tips::{SpySignal, SpyTips};

use chrono::NaiveDate;
use gaalab_core::data::{DataError, PriceProvider};
use gaalab_core::{EngineError, Notification, StrategyOutcome};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("not enough history for '{symbol}' ({observations} observations)")]
    InsufficientHistory { symbol: String, observations: usize },

    #[error("decision log '{path}': {reason}")]
    Log { path: String, reason: String },
}

/// Inputs shared by every strategy of one invocation.
pub struct RunContext<'a> {
    pub today: NaiveDate,
    pub provider: &'a dyn PriceProvider,
}

impl<'a> RunContext<'a> {
    pub fn new(today: NaiveDate, provider: &'a dyn PriceProvider) -> Self {
        Self { today, provider }
    }
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when there is nothing to report this run.
    fn evaluate(&self, ctx: &RunContext<'_>) -> Result<Option<Notification>, StrategyError>;

    fn run(&self, ctx: &RunContext<'_>) -> StrategyOutcome {
        match self.evaluate(ctx) {
            Ok(Some(notification)) => StrategyOutcome::Signal(notification),
            Ok(None) => StrategyOutcome::NoSignal,
            Err(e) => StrategyOutcome::error(self.name(), &e),
        }
    }
}

/// The enabled strategies, in delivery order.
pub fn build_strategies(config: &AppConfig) -> Result<Vec<Box<dyn Strategy>>, StrategyError> {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
    if config.gaa.enabled {
        strategies.push(Box::new(GaaMomentum::from_config(
            &config.gaa,
            config.data.lookback_days,
        )?));
    }
    if config.spy_tips.enabled {
        strategies.push(Box::new(SpyTips::from_config(&config.spy_tips)));
    }
    Ok(strategies)
}
