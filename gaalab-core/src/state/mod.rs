//! Append-only log of monthly rebalance decisions.
//!
//! A record is written exactly once per period-end date and never rewritten.
//! The "previous selection" for a period is the latest record strictly before
//! it, so a retry of an already-recorded period never diffs against itself.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StateError;
pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Selection;

/// One persisted decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceRecord {
    pub period_end: NaiveDate,
    /// Persisted symbols in selection order; `CASH` for cash slots.
    pub holdings: Vec<String>,
}

impl RebalanceRecord {
    pub fn new(period_end: NaiveDate, holdings: Vec<String>) -> Self {
        Self {
            period_end,
            holdings,
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::from_symbols(&self.holdings)
    }
}

/// Storage behind the reconciliation engine.
///
/// Only `records` and `append` are required; the queries derive from them.
pub trait RebalanceStateStore {
    /// All records in append order.
    fn records(&self) -> Result<Vec<RebalanceRecord>, StateError>;

    /// Fails with [`StateError::DuplicatePeriod`] when `period_end` is already recorded.
    fn append(&mut self, period_end: NaiveDate, holdings: &[String]) -> Result<(), StateError>;

    fn already_recorded(&self, period_end: NaiveDate) -> Result<bool, StateError> {
        Ok(self.records()?.iter().any(|r| r.period_end == period_end))
    }

    /// The record with the latest period-end date.
    fn last_record(&self) -> Result<Option<RebalanceRecord>, StateError> {
        Ok(self.records()?.into_iter().max_by_key(|r| r.period_end))
    }

    /// Holdings of the latest record, empty when the store is uninitialized.
    fn last_selection(&self) -> Result<Vec<String>, StateError> {
        Ok(self.last_record()?.map(|r| r.holdings).unwrap_or_default())
    }

    /// Holdings of the latest record strictly before `period_end`.
    fn previous_before(&self, period_end: NaiveDate) -> Result<Vec<String>, StateError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.period_end < period_end)
            .max_by_key(|r| r.period_end)
            .map(|r| r.holdings)
            .unwrap_or_default())
    }
}

impl<S: RebalanceStateStore + ?Sized> RebalanceStateStore for &mut S {
    fn records(&self) -> Result<Vec<RebalanceRecord>, StateError> {
        (**self).records()
    }

    fn append(&mut self, period_end: NaiveDate, holdings: &[String]) -> Result<(), StateError> {
        (**self).append(period_end, holdings)
    }
}
