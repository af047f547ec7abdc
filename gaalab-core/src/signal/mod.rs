//! Decision logic: trend eligibility, top-N selection, selection diff and
//! the leverage recommendation.

pub mod diff;
pub mod leverage;
pub mod selector;
pub mod trend_filter;

pub use diff::Diff;
pub use leverage::{Leverage, LeverageConfig, LeverageGate};
pub use selector::{rank, select, SelectionMode};
pub use trend_filter::{trend_filter, Eligibility, TrendReading};
