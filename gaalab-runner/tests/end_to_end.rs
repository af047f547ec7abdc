//! Full runs against a deterministic stub provider: strategies, state file,
//! message file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use gaalab_core::data::{DataError, DataSource, FetchResult, PriceProvider};
use gaalab_core::domain::PricePoint;
use gaalab_core::StrategyOutcome;
use gaalab_runner::{
    build_strategies, deliver, run_strategies, AppConfig, MessageFileSink, NotificationSink,
    RunContext,
};

/// Daily closes `100 + slope * day` over the requested range.
struct Stub {
    slopes: HashMap<&'static str, f64>,
}

impl Stub {
    fn market() -> Self {
        Self {
            slopes: HashMap::from([
                ("EEM", 0.3),
                ("FEZ", 0.2),
                ("IEF", -0.05),
                ("NQ=F", 0.1),
                ("BTC-USD", 0.5),
                ("GC=F", -0.1),
                ("CL=F", 0.0),
                ("SPY", 0.2),
                ("TIP", 0.01),
            ]),
        }
    }
}

impl PriceProvider for Stub {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        let slope = *self.slopes.get(symbol).ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        let points = (0..=(end - start).num_days())
            .map(|i| PricePoint::new(start + Duration::days(i), 100.0 + slope * i as f64))
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            points,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct Down;

impl PriceProvider for Down {
    fn name(&self) -> &str {
        "down"
    }

    fn fetch(&self, _symbol: &str, _start: NaiveDate, _end: NaiveDate) -> Result<FetchResult, DataError> {
        Err(DataError::NetworkUnreachable("connection refused".into()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.message_file = dir.join("message.txt");
    config.gaa.state_file = dir.join("gaa_hist.csv");
    config
}

fn run_once(config: &AppConfig, provider: &dyn PriceProvider, today: NaiveDate) -> Vec<StrategyOutcome> {
    let strategies = build_strategies(config).unwrap();
    let ctx = RunContext::new(today, provider);
    let runs = run_strategies(&strategies, &ctx);
    let sinks: Vec<Box<dyn NotificationSink>> =
        vec![Box::new(MessageFileSink::new(&config.output.message_file))];
    deliver(&runs, &sinks).unwrap();
    runs.into_iter().map(|r| r.outcome).collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 2).unwrap()
}

#[test]
fn first_run_rebalances_and_second_run_is_silent_for_gaa() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Stub::market();

    let outcomes = run_once(&config, &provider, today());
    assert!(matches!(outcomes[0], StrategyOutcome::Signal(_)));
    let message = fs::read_to_string(&config.output.message_file).unwrap();
    assert!(message.starts_with("GAA Rebalance (Jun 2024)\n\nBuy: BTC=F, EEM, FEZ\n"));
    assert!(message.contains("Portfolio: BTC=F, EEM, FEZ\nLeverage: 3x\n"));
    assert!(message.contains(
        "In progress Jul 2024 (close 2024-07-02): BTC=F, EEM, FEZ\n\
         Leverage: 3x\n\
         New: none\n\
         Out: none\n\
         Same: BTC=F, EEM, FEZ"
    ));
    assert!(message.contains("GO BUY NOW\n\nThe SIGNAL is BUY"));
    assert!(message.ends_with("\n\n"));

    let state = fs::read_to_string(&config.gaa.state_file).unwrap();
    assert_eq!(state, "date;portfolio\n2024-06-30;BTC=F,EEM,FEZ\n");

    // Retry later the same month: GAA has nothing new, SPY/TIP still reports
    let outcomes = run_once(&config, &provider, today() + Duration::days(5));
    assert_eq!(outcomes[0], StrategyOutcome::NoSignal);
    let message = fs::read_to_string(&config.output.message_file).unwrap();
    assert!(message.starts_with("GO BUY NOW\n\n"));
    assert!(!message.contains("GAA"));
    assert_eq!(fs::read_to_string(&config.gaa.state_file).unwrap(), state);
}

#[test]
fn next_month_without_rotation_is_no_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.spy_tips.enabled = false;
    let provider = Stub::market();

    run_once(&config, &provider, today());
    let outcomes = run_once(&config, &provider, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
    let StrategyOutcome::Signal(n) = &outcomes[0] else {
        panic!("expected a signal, got {:?}", outcomes[0]);
    };
    assert_eq!(n.headline, "GAA No Change (Jul 2024)");
    assert!(n.body.contains("Hold: BTC=F, EEM, FEZ"));

    let state = fs::read_to_string(&config.gaa.state_file).unwrap();
    assert_eq!(state.lines().count(), 3);
}

#[test]
fn provider_outage_is_reported_without_touching_state() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let outcomes = run_once(&config, &Down, today());
    assert!(outcomes.iter().all(StrategyOutcome::is_error));

    let message = fs::read_to_string(&config.output.message_file).unwrap();
    assert!(message.starts_with("Error in gaa_momentum\n\nno usable price data\n\n"));
    assert!(message.contains("Error in spy_tips\n\n"));
    assert!(message.contains("connection refused"));
    assert!(!config.gaa.state_file.exists());
}

#[test]
fn missing_instruments_are_listed_and_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.spy_tips.enabled = false;
    let mut provider = Stub::market();
    provider.slopes.remove("BTC-USD");

    let outcomes = run_once(&config, &provider, today());
    let StrategyOutcome::Signal(n) = &outcomes[0] else {
        panic!("expected a signal");
    };
    assert!(n.body.contains("Portfolio: EEM, FEZ, NQ=F"));
    assert!(n.body.ends_with("Ignored (no data): BTC=F"));
}
