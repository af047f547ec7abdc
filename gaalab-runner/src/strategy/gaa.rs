//! Monthly GAA momentum rotation.

use std::path::PathBuf;

use chrono::Duration;
use gaalab_core::data::{fetch_table, Universe};
use gaalab_core::format::format_report;
use gaalab_core::state::FileStateStore;
use gaalab_core::{Decision, Engine, Notification};
use tracing::{info, warn};

use super::{RunContext, Strategy, StrategyError};
use crate::config::GaaConfig;

pub struct GaaMomentum {
    label: String,
    universe: Universe,
    engine: Engine,
    state_file: PathBuf,
    lookback_days: u32,
}

impl GaaMomentum {
    pub fn new(
        label: impl Into<String>,
        universe: Universe,
        engine: Engine,
        state_file: impl Into<PathBuf>,
        lookback_days: u32,
    ) -> Self {
        Self {
            label: label.into(),
            universe,
            engine,
            state_file: state_file.into(),
            lookback_days,
        }
    }

    pub fn from_config(config: &GaaConfig, lookback_days: u32) -> Result<Self, StrategyError> {
        let engine = Engine::new(config.engine_config())?;
        Ok(Self::new(
            config.label.clone(),
            config.universe.clone(),
            engine,
            config.state_file.clone(),
            lookback_days,
        ))
    }
}

impl Strategy for GaaMomentum {
    fn name(&self) -> &str {
        "gaa_momentum"
    }

    fn evaluate(&self, ctx: &RunContext<'_>) -> Result<Option<Notification>, StrategyError> {
        let start = ctx.today - Duration::days(i64::from(self.lookback_days));
        let fetched = fetch_table(ctx.provider, &self.universe, start, ctx.today);
        if fetched.has_synthetic() {
            warn!(strategy = self.name(), "synthetic prices in use; signal is not real");
        }
        info!(
            strategy = self.name(),
            loaded = fetched.table.len(),
            missing = fetched.missing.len(),
            dataset = %fetched.dataset_hash,
            "universe fetched"
        );

        let mut store = FileStateStore::new(&self.state_file);
        match self.engine.reconcile(&fetched.table, ctx.today, &mut store)? {
            Decision::AlreadyProcessed { period_end } => {
                info!(strategy = self.name(), period = %period_end, "skipped");
                Ok(None)
            }
            Decision::Rebalanced(report) => {
                let missing: Vec<String> = fetched
                    .missing_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                Ok(Some(format_report(&self.label, &report, &missing)))
            }
        }
    }
}
