use chrono::NaiveDate;

use super::{RebalanceRecord, RebalanceStateStore, StateError};

/// Volatile store for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    records: Vec<RebalanceRecord>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RebalanceStateStore for MemoryStateStore {
    fn records(&self) -> Result<Vec<RebalanceRecord>, StateError> {
        Ok(self.records.clone())
    }

    fn append(&mut self, period_end: NaiveDate, holdings: &[String]) -> Result<(), StateError> {
        if self.records.iter().any(|r| r.period_end == period_end) {
            return Err(StateError::DuplicatePeriod { date: period_end });
        }
        self.records
            .push(RebalanceRecord::new(period_end, holdings.to_vec()));
        Ok(())
    }
}
