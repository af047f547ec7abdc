//! GAALab Core: domain types, price providers, indicators, ranking,
//! rebalance state, reconciliation and message formatting.
//!
//! The pipeline for one invocation:
//! - Fetch a `PriceTable` for the universe through a `PriceProvider` chain
//! - Derive the rebalance period from the data's as-of date
//! - Score momentum on month-end closes, gate on price above the SMA
//! - Select the top N with cash padding, diff against the previous period
//! - Append the decision to the `RebalanceStateStore` and render a notification

pub mod data;
pub mod domain;
pub mod format;
pub mod indicators;
pub mod outcome;
pub mod reconcile;
pub mod signal;
pub mod state;

pub use outcome::{Notification, StrategyOutcome};
pub use reconcile::{
    Decision, Engine, EngineConfig, EngineError, Preview, RebalanceReport, ReconcileState,
};
