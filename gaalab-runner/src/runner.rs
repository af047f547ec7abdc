//! Run every strategy, collect what should be delivered.

use gaalab_core::{Notification, StrategyOutcome};
use tracing::{error, info};

use crate::sink::{NotificationSink, SinkError};
use crate::strategy::{RunContext, Strategy};

/// Outcome of one strategy in a run.
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub name: String,
    pub outcome: StrategyOutcome,
}

/// Run `strategies` in order. A failing strategy yields an `Error` outcome
/// and never stops the ones after it.
pub fn run_strategies(strategies: &[Box<dyn Strategy>], ctx: &RunContext<'_>) -> Vec<StrategyRun> {
    strategies
        .iter()
        .map(|strategy| {
            let name = strategy.name().to_string();
            let outcome = strategy.run(ctx);
            match &outcome {
                StrategyOutcome::NoSignal => info!(strategy = %name, "skipped"),
                StrategyOutcome::Signal(n) => info!(strategy = %name, headline = %n.headline, "signal"),
                StrategyOutcome::Error { message, .. } => {
                    error!(strategy = %name, error = %message, "strategy failed")
                }
            }
            StrategyRun { name, outcome }
        })
        .collect()
}

/// Notifications to deliver, in strategy order. `NoSignal` contributes nothing.
pub fn notifications(runs: &[StrategyRun]) -> Vec<Notification> {
    runs.iter()
        .filter_map(|run| run.outcome.notification())
        .collect()
}

/// Hand the run's notifications to every sink. Stops at the first failure.
pub fn deliver(runs: &[StrategyRun], sinks: &[Box<dyn NotificationSink>]) -> Result<usize, SinkError> {
    let batch = notifications(runs);
    for sink in sinks {
        sink.deliver(&batch)?;
        info!(sink = sink.name(), count = batch.len(), "delivered");
    }
    Ok(batch.len())
}
