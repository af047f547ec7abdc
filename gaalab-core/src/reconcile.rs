//! Monthly reconciliation: at most one recorded decision per period.
//!
//! For each invocation the engine derives the period from the data, checks
//! the store, and only on a new period computes and persists a selection:
//!
//! 1. Empty table: [`EngineError::DataUnavailable`], store untouched.
//! 2. Period already recorded, or a record later than the period exists:
//!    [`Decision::AlreadyProcessed`], store untouched.
//! 3. Otherwise the table is cut at the period end, scored, filtered and
//!    ranked; the selection is appended and diffed against the previous
//!    period's record.
//!
//! A newly recorded period also carries a leverage recommendation and, when
//! the data runs past the period end, a preview of the month in progress.
//! Neither is persisted.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{rebalance_period, MonthKey, PriceTable, Selection};
use crate::indicators::{MomentumScorer, MomentumScores, Sma, DEFAULT_HORIZONS};
use crate::signal::{
    select, trend_filter, Diff, Eligibility, Leverage, LeverageConfig, LeverageGate, SelectionMode,
};
use crate::state::{RebalanceStateStore, StateError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no usable price data")]
    DataUnavailable,

    #[error("failed to persist rebalance state: {0}")]
    Persistence(#[from] StateError),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub top_n: usize,
    pub sma_window: usize,
    pub horizons: Vec<u32>,
    pub mode: SelectionMode,
    pub leverage: LeverageConfig,
    /// Evaluate the month in progress alongside the recorded period.
    pub preview: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            sma_window: 150,
            horizons: DEFAULT_HORIZONS.to_vec(),
            mode: SelectionMode::default(),
            leverage: LeverageConfig::default(),
            preview: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// No record existed before this run.
    Uninitialized,
    AlreadyProcessed,
    New,
}

/// Unofficial selection for the month in progress, compared with the
/// recorded one. `delta` reads buys as new, sells as out, holds as same.
#[derive(Debug, Clone)]
pub struct Preview {
    pub month: MonthKey,
    pub evaluated_at: NaiveDate,
    pub selection: Selection,
    pub leverage: Option<Leverage>,
    pub delta: Diff,
}

/// Everything computed for a newly recorded period.
#[derive(Debug, Clone)]
pub struct RebalanceReport {
    pub period_end: NaiveDate,
    pub state: ReconcileState,
    /// Last date every fetched instrument has data for.
    pub as_of: NaiveDate,
    /// Latest observation used for the decision (`<= period_end`).
    pub evaluated_at: NaiveDate,
    pub previous: Vec<String>,
    pub selection: Selection,
    pub diff: Diff,
    pub scores: MomentumScores,
    pub trend: Eligibility,
    /// `None` when the leverage gate is disabled.
    pub leverage: Option<Leverage>,
    pub preview: Option<Preview>,
}

impl RebalanceReport {
    pub fn period(&self) -> MonthKey {
        MonthKey::of(self.period_end)
    }

    /// A first run always counts as a rebalance.
    pub fn is_rebalance(&self) -> bool {
        self.state == ReconcileState::Uninitialized || !self.diff.is_unchanged()
    }
}

#[derive(Debug, Clone)]
pub enum Decision {
    AlreadyProcessed { period_end: NaiveDate },
    Rebalanced(RebalanceReport),
}

impl Decision {
    pub fn report(&self) -> Option<&RebalanceReport> {
        match self {
            Decision::Rebalanced(report) => Some(report),
            Decision::AlreadyProcessed { .. } => None,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    scorer: MomentumScorer,
    sma: Sma,
    leverage: Option<LeverageGate>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.top_n == 0 {
            return Err(EngineError::InvalidConfig("top_n must be at least 1".into()));
        }
        let sma = Sma::new(config.sma_window)
            .ok_or_else(|| EngineError::InvalidConfig("sma_window must be at least 1".into()))?;
        let scorer = MomentumScorer::new(config.horizons.clone()).ok_or_else(|| {
            EngineError::InvalidConfig("horizons must be non-empty and positive".into())
        })?;
        let leverage = if config.leverage.enabled {
            let gate = LeverageGate::new(&config.leverage).ok_or_else(|| {
                EngineError::InvalidConfig(
                    "leverage needs windows of at least 1 and 2, a positive max_vol and factor".into(),
                )
            })?;
            Some(gate)
        } else {
            None
        };
        Ok(Self {
            config,
            scorer,
            sma,
            leverage,
        })
    }

    fn leverage_for(&self, table: &PriceTable, selection: &Selection) -> Option<Leverage> {
        self.leverage.map(|gate| gate.recommend(table, selection))
    }

    /// Score the data after `period_end` (up to `today`) as if its month
    /// had closed. `None` when there is no such data.
    fn preview(
        &self,
        table: &PriceTable,
        today: NaiveDate,
        period_end: NaiveDate,
        official: &Selection,
    ) -> Option<Preview> {
        let view = table.truncate(today);
        let evaluated_at = view.latest().filter(|d| *d > period_end)?;
        let month = MonthKey::of(evaluated_at);

        let scores = self.scorer.score(&view, month);
        let trend = trend_filter(&view, self.sma);
        let selection = select(&scores, &trend, self.config.top_n, self.config.mode);
        let delta = Diff::between(&official.symbols(), &selection.symbols());
        debug!(month = %month, selection = %selection, "preview computed");

        Some(Preview {
            month,
            evaluated_at,
            leverage: self.leverage_for(&view, &selection),
            selection,
            delta,
        })
    }

    /// Reconcile `table` against `store` for the run happening on `today`.
    pub fn reconcile<S>(
        &self,
        table: &PriceTable,
        today: NaiveDate,
        store: &mut S,
    ) -> Result<Decision, EngineError>
    where
        S: RebalanceStateStore + ?Sized,
    {
        let as_of = table.as_of().ok_or(EngineError::DataUnavailable)?;
        let period_end = rebalance_period(as_of, today);
        debug!(%as_of, %today, period = %period_end, "period derived");

        if store.already_recorded(period_end)? {
            info!(period = %period_end, "period already processed");
            return Ok(Decision::AlreadyProcessed { period_end });
        }
        let last = store.last_record()?;
        if let Some(last) = last.as_ref().filter(|r| r.period_end > period_end) {
            warn!(
                period = %period_end,
                last_recorded = %last.period_end,
                "data is older than the latest record; nothing to do"
            );
            return Ok(Decision::AlreadyProcessed { period_end });
        }
        let state = if last.is_none() {
            ReconcileState::Uninitialized
        } else {
            ReconcileState::New
        };

        let view = table.truncate(period_end);
        let evaluated_at = view.latest().ok_or(EngineError::DataUnavailable)?;

        let scores = self.scorer.score(&view, MonthKey::of(period_end));
        let trend = trend_filter(&view, self.sma);
        let selection = select(&scores, &trend, self.config.top_n, self.config.mode);
        let current = selection.symbols();

        let leverage = self.leverage_for(&view, &selection);
        let previous = store.previous_before(period_end)?;
        let diff = Diff::between(&previous, &current);

        match store.append(period_end, &current) {
            Ok(()) => {}
            Err(StateError::DuplicatePeriod { .. }) => {
                info!(period = %period_end, "period recorded concurrently");
                return Ok(Decision::AlreadyProcessed { period_end });
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            period = %period_end,
            selection = %selection,
            full_cash = selection.is_full_cash(),
            scored = scores.len(),
            eligible = trend.values().filter(|r| r.eligible).count(),
            "rebalance recorded"
        );

        let preview = if self.config.preview {
            self.preview(table, today, period_end, &selection)
        } else {
            None
        };

        Ok(Decision::Rebalanced(RebalanceReport {
            period_end,
            state,
            as_of,
            evaluated_at,
            previous,
            selection,
            diff,
            scores,
            trend,
            leverage,
            preview,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePoint, PriceSeries};
    use crate::state::MemoryStateStore;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Daily series of `days` closes ending on `end`, growing by `step` per day.
    fn trending(end: NaiveDate, days: i64, step: f64) -> PriceSeries {
        PriceSeries::new(
            (0..days)
                .map(|i| {
                    let date = end - chrono::Duration::days(days - 1 - i);
                    PricePoint::new(date, 100.0 + step * i as f64)
                })
                .collect(),
        )
    }

    fn small_engine() -> Engine {
        Engine::new(EngineConfig {
            top_n: 2,
            sma_window: 20,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_table_is_an_error() {
        let mut store = MemoryStateStore::new();
        let err = small_engine()
            .reconcile(&PriceTable::new(), d(2024, 7, 2), &mut store)
            .unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable));
        assert!(store.is_empty());
    }

    #[test]
    fn first_run_records_and_reports_buys() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 7, 1), 400, 0.5));
        table.insert("DOWN", trending(d(2024, 7, 1), 400, -0.1));
        let mut store = MemoryStateStore::new();

        let decision = small_engine()
            .reconcile(&table, d(2024, 7, 2), &mut store)
            .unwrap();
        let report = decision.report().unwrap();
        assert_eq!(report.period_end, d(2024, 6, 30));
        assert_eq!(report.state, ReconcileState::Uninitialized);
        assert_eq!(report.evaluated_at, d(2024, 6, 30));
        assert_eq!(report.selection.symbols(), vec!["UP", "CASH"]);
        assert!(report.diff.buys.contains("UP"));
        assert!(report.is_rebalance());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn second_run_same_period_is_a_no_op() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 7, 1), 400, 0.5));
        let mut store = MemoryStateStore::new();
        let engine = small_engine();

        engine.reconcile(&table, d(2024, 7, 2), &mut store).unwrap();
        let again = engine.reconcile(&table, d(2024, 7, 3), &mut store).unwrap();
        assert!(matches!(again, Decision::AlreadyProcessed { period_end } if period_end == d(2024, 6, 30)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stale_data_after_newer_record_is_a_no_op() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 5, 15), 400, 0.5));
        let mut store = MemoryStateStore::new();
        store.append(d(2024, 6, 30), &["UP".to_string()]).unwrap();

        let decision = small_engine()
            .reconcile(&table, d(2024, 7, 2), &mut store)
            .unwrap();
        assert!(matches!(decision, Decision::AlreadyProcessed { period_end } if period_end == d(2024, 5, 31)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn utc_bar_ahead_of_local_date_records_the_closed_month() {
        let mut table = PriceTable::new();
        table.insert("BTC", trending(d(2024, 8, 1), 400, 0.5));
        let mut store = MemoryStateStore::new();
        let engine = small_engine();

        let evening = engine.reconcile(&table, d(2024, 7, 31), &mut store).unwrap();
        assert_eq!(evening.report().unwrap().period_end, d(2024, 6, 30));

        let next_day = engine.reconcile(&table, d(2024, 8, 2), &mut store).unwrap();
        assert_eq!(next_day.report().unwrap().period_end, d(2024, 7, 31));

        let recorded: Vec<NaiveDate> = store.records().unwrap().iter().map(|r| r.period_end).collect();
        assert_eq!(recorded, vec![d(2024, 6, 30), d(2024, 7, 31)]);
    }

    #[test]
    fn report_carries_leverage_and_month_in_progress() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 7, 15), 400, 0.5));
        table.insert("DOWN", trending(d(2024, 7, 15), 400, -0.1));
        let mut store = MemoryStateStore::new();

        let decision = small_engine()
            .reconcile(&table, d(2024, 7, 16), &mut store)
            .unwrap();
        let report = decision.report().unwrap();
        assert_eq!(report.period_end, d(2024, 6, 30));
        // Smooth uptrend: above the long SMA, almost no volatility
        assert_eq!(report.leverage, Some(Leverage(3)));

        let preview = report.preview.as_ref().unwrap();
        assert_eq!(preview.month, MonthKey::new(2024, 7).unwrap());
        assert_eq!(preview.evaluated_at, d(2024, 7, 15));
        assert_eq!(preview.selection.symbols(), vec!["UP", "CASH"]);
        assert!(preview.delta.is_unchanged());

        // Only the official selection is persisted
        assert_eq!(store.records().unwrap().len(), 1);
    }

    #[test]
    fn no_preview_when_data_ends_at_the_period() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 6, 28), 400, 0.5));
        let mut store = MemoryStateStore::new();
        let engine = Engine::new(EngineConfig {
            top_n: 2,
            sma_window: 20,
            leverage: LeverageConfig {
                enabled: false,
                ..LeverageConfig::default()
            },
            ..EngineConfig::default()
        })
        .unwrap();

        let decision = engine.reconcile(&table, d(2024, 7, 1), &mut store).unwrap();
        let report = decision.report().unwrap();
        assert!(report.preview.is_none());
        assert_eq!(report.leverage, None);
    }

    /// Reads fine, refuses every write.
    struct ReadOnlyStore;

    impl RebalanceStateStore for ReadOnlyStore {
        fn records(&self) -> Result<Vec<crate::state::RebalanceRecord>, StateError> {
            Ok(Vec::new())
        }

        fn append(&mut self, _: NaiveDate, _: &[String]) -> Result<(), StateError> {
            Err(StateError::Io(std::io::Error::other("read-only file system")))
        }
    }

    #[test]
    fn failed_append_is_a_persistence_error() {
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 7, 1), 400, 0.5));

        let result = small_engine().reconcile(&table, d(2024, 7, 2), &mut ReadOnlyStore);
        assert!(matches!(result, Err(EngineError::Persistence(StateError::Io(_)))));
    }

    #[test]
    fn unreadable_state_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the state file should be
        let mut store = crate::state::FileStateStore::new(dir.path());
        let mut table = PriceTable::new();
        table.insert("UP", trending(d(2024, 7, 1), 400, 0.5));

        let result = small_engine().reconcile(&table, d(2024, 7, 2), &mut store);
        assert!(matches!(result, Err(EngineError::Persistence(_))));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = EngineConfig {
            top_n: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(Engine::new(bad), Err(EngineError::InvalidConfig(_))));

        let bad_gate = EngineConfig {
            leverage: LeverageConfig {
                vol_window: 1,
                ..LeverageConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(Engine::new(bad_gate), Err(EngineError::InvalidConfig(_))));
    }
}
