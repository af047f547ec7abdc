//! Target portfolio: exactly N slots, each an instrument or cash.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Symbol;

/// Sentinel written for an unused slot. Never a real instrument.
pub const CASH: &str = "CASH";

/// One slot of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Holding {
    Instrument(Symbol),
    Cash,
}

impl Holding {
    /// Parse a persisted symbol; `CASH` maps to the cash placeholder.
    pub fn parse(symbol: &str) -> Self {
        if symbol == CASH {
            Holding::Cash
        } else {
            Holding::Instrument(symbol.to_string())
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Holding::Instrument(s) => s,
            Holding::Cash => CASH,
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, Holding::Cash)
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Ordered selection in rank order, cash padding last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    holdings: Vec<Holding>,
}

impl Selection {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            holdings: symbols
                .into_iter()
                .map(|s| Holding::parse(s.as_ref()))
                .collect(),
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Real instruments in rank order.
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.holdings
            .iter()
            .filter(|h| !h.is_cash())
            .map(Holding::symbol)
    }

    pub fn cash_slots(&self) -> usize {
        self.holdings.iter().filter(|h| h.is_cash()).count()
    }

    pub fn is_full_cash(&self) -> bool {
        !self.holdings.is_empty() && self.holdings.iter().all(Holding::is_cash)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.holdings.iter().any(|h| h.symbol() == symbol)
    }

    /// Persisted form: one symbol per slot, `CASH` for cash.
    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol().to_string()).collect()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.holdings.iter().map(Holding::symbol).collect();
        f.write_str(&parts.join(", "))
    }
}
