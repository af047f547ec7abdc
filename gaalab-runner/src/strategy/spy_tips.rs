//! SPY vs TIP one-year momentum switch.
//!
//! BUY while the risk asset's trailing return beats the safe asset's,
//! SELL otherwise. An optional comma-separated log keeps one decision per
//! as-of date; with `daily_notification = false` the strategy only speaks up
//! when the signal differs from the last logged one.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use gaalab_core::domain::PriceSeries;
use gaalab_core::format::signed_pct;
use gaalab_core::Notification;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{RunContext, Strategy, StrategyError};
use crate::config::SpyTipsConfig;

const LOG_HEADER: [&str; 4] = ["date", "signal", "spy_pct", "tips_pct"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpySignal {
    Buy,
    Sell,
}

impl SpySignal {
    /// BUY iff the spread is strictly positive.
    pub fn from_spread(spread: f64) -> Self {
        if spread > 0.0 {
            SpySignal::Buy
        } else {
            SpySignal::Sell
        }
    }
}

impl fmt::Display for SpySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpySignal::Buy => "BUY",
            SpySignal::Sell => "SELL",
        })
    }
}

impl FromStr for SpySignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(SpySignal::Buy),
            "SELL" => Ok(SpySignal::Sell),
            other => Err(format!("unknown signal '{other}'")),
        }
    }
}

/// One evaluated comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpyReading {
    pub as_of: NaiveDate,
    pub risk_return: f64,
    pub safe_return: f64,
    pub signal: SpySignal,
}

impl SpyReading {
    pub fn spread(&self) -> f64 {
        self.risk_return - self.safe_return
    }
}

/// A row of the decision log.
#[derive(Debug, Clone, PartialEq)]
struct LogEntry {
    date: NaiveDate,
    signal: SpySignal,
}

pub struct SpyTips {
    risk_symbol: String,
    safe_symbol: String,
    lookback_days: u32,
    daily_notification: bool,
    log_file: Option<PathBuf>,
}

impl SpyTips {
    pub fn from_config(config: &SpyTipsConfig) -> Self {
        Self {
            risk_symbol: config.risk_symbol.clone(),
            safe_symbol: config.safe_symbol.clone(),
            lookback_days: config.lookback_days,
            daily_notification: config.daily_notification,
            log_file: config.log_file.clone(),
        }
    }

    fn trailing_return(
        &self,
        ctx: &RunContext<'_>,
        symbol: &str,
    ) -> Result<(f64, NaiveDate), StrategyError> {
        let start = ctx.today - Duration::days(i64::from(self.lookback_days));
        let fetched = ctx.provider.fetch(symbol, start, ctx.today)?;
        let series = PriceSeries::new(fetched.points);
        match (series.first(), series.last()) {
            (Some(first), Some(last)) if series.len() >= 2 => {
                Ok((last.close / first.close - 1.0, last.date))
            }
            _ => Err(StrategyError::InsufficientHistory {
                symbol: symbol.to_string(),
                observations: series.len(),
            }),
        }
    }

    pub fn read(&self, ctx: &RunContext<'_>) -> Result<SpyReading, StrategyError> {
        let (risk_return, risk_date) = self.trailing_return(ctx, &self.risk_symbol)?;
        let (safe_return, safe_date) = self.trailing_return(ctx, &self.safe_symbol)?;
        Ok(SpyReading {
            as_of: risk_date.min(safe_date),
            risk_return,
            safe_return,
            signal: SpySignal::from_spread(risk_return - safe_return),
        })
    }

    pub fn render(&self, reading: &SpyReading) -> Notification {
        let body = [
            format!("The SIGNAL is {}", reading.signal),
            format!(
                "{} 1y return: {}",
                self.risk_symbol,
                signed_pct(Some(reading.risk_return))
            ),
            format!(
                "{} 1y return: {}",
                self.safe_symbol,
                signed_pct(Some(reading.safe_return))
            ),
            format!("Spread: {}", signed_pct(Some(reading.spread()))),
            format!("As of: {}", reading.as_of.format("%Y-%m-%d")),
        ]
        .join("\n");
        Notification::new(format!("GO {} NOW", reading.signal), body)
    }
}

impl Strategy for SpyTips {
    fn name(&self) -> &str {
        "spy_tips"
    }

    fn evaluate(&self, ctx: &RunContext<'_>) -> Result<Option<Notification>, StrategyError> {
        let reading = self.read(ctx)?;
        info!(
            strategy = self.name(),
            signal = %reading.signal,
            spread = reading.spread(),
            as_of = %reading.as_of,
            "signal computed"
        );

        let previous = match &self.log_file {
            Some(path) => {
                let entries = read_log(path)?;
                let last = entries.last().cloned();
                if entries.iter().any(|e| e.date == reading.as_of) {
                    debug!(strategy = self.name(), as_of = %reading.as_of, "already logged");
                } else {
                    append_log(path, &reading)?;
                }
                last
            }
            None => None,
        };

        let unchanged = previous.is_some_and(|p| p.signal == reading.signal);
        if !self.daily_notification && unchanged {
            info!(strategy = self.name(), "signal unchanged, skipped");
            return Ok(None);
        }
        Ok(Some(self.render(&reading)))
    }
}

fn log_error(path: &Path, reason: impl fmt::Display) -> StrategyError {
    StrategyError::Log {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_log(path: &Path) -> Result<Vec<LogEntry>, StrategyError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| log_error(path, e))?;

    let mut entries = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| log_error(path, e))?;
        let (Some(date), Some(signal)) = (row.get(0), row.get(1)) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| log_error(path, e))?;
        let signal = signal.parse::<SpySignal>().map_err(|e: String| log_error(path, e))?;
        entries.push(LogEntry { date, signal });
    }
    Ok(entries)
}

fn append_log(path: &Path, reading: &SpyReading) -> Result<(), StrategyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| log_error(path, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| log_error(path, e))?;
    let empty = file.metadata().map_err(|e| log_error(path, e))?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    if empty {
        writer
            .write_record(LOG_HEADER)
            .map_err(|e| log_error(path, e))?;
    }
    writer
        .write_record([
            reading.as_of.format("%Y-%m-%d").to_string(),
            reading.signal.to_string(),
            format!("{:.4}", reading.risk_return * 100.0),
            format!("{:.4}", reading.safe_return * 100.0),
        ])
        .map_err(|e| log_error(path, e))?;
    writer.flush().map_err(|e| log_error(path, e))?;
    Ok(())
}
