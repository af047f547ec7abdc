//! Instrument universe.
//!
//! An instrument has a display name (used in selections, state and messages)
//! and optionally a different vendor symbol to fetch, e.g. `BTC=F` is
//! reported as such but fetched as `BTC-USD`.

use serde::{Deserialize, Serialize};

use crate::domain::CASH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_symbol: Option<String>,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_symbol: None,
        }
    }

    pub fn aliased(name: impl Into<String>, provider_symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_symbol: Some(provider_symbol.into()),
        }
    }

    /// Symbol sent to the data provider.
    pub fn fetch_symbol(&self) -> &str {
        self.provider_symbol.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered list of instruments. Order is kept for display only; ranking
/// never depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Universe {
    instruments: Vec<Instrument>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// ETFs plus futures/crypto used by the GAA momentum strategy.
    pub fn default_gaa() -> Self {
        Self::new(vec![
            Instrument::new("EEM"),
            Instrument::new("FEZ"),
            Instrument::new("IEF"),
            Instrument::new("NQ=F"),
            Instrument::aliased("BTC=F", "BTC-USD"),
            Instrument::new("GC=F"),
            Instrument::new("CL=F"),
        ])
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn names(&self) -> Vec<&str> {
        self.instruments.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Names must be unique, non-empty, free of the state file delimiters and
    /// distinct from the cash sentinel.
    pub fn validate(&self) -> Result<(), String> {
        if self.instruments.is_empty() {
            return Err("universe is empty".into());
        }
        let mut seen = std::collections::BTreeSet::new();
        for inst in &self.instruments {
            let name = inst.name.as_str();
            if name.trim().is_empty() {
                return Err("instrument name is empty".into());
            }
            if name.contains([';', ',']) || name.chars().any(char::is_whitespace) {
                return Err(format!("instrument name '{name}' contains ';', ',' or whitespace"));
            }
            if name == CASH {
                return Err(format!("'{CASH}' is reserved for the cash placeholder"));
            }
            if !seen.insert(name) {
                return Err(format!("duplicate instrument '{name}'"));
            }
        }
        Ok(())
    }
}
