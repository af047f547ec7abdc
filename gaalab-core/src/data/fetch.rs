//! Assemble a `PriceTable` for a universe.

use super::provider::{DataError, DataSource, PriceProvider};
use super::universe::{Instrument, Universe};
use crate::domain::{PriceSeries, PriceTable};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of fetching a universe: whatever could be loaded plus what could not.
#[derive(Debug)]
pub struct FetchReport {
    /// Canonical daily series keyed by instrument name.
    pub table: PriceTable,
    /// Instruments with no usable data and the reason.
    pub missing: Vec<(String, DataError)>,
    /// Provider that served each loaded instrument.
    pub sources: BTreeMap<String, DataSource>,
    /// BLAKE3 over every loaded point, in symbol order.
    pub dataset_hash: String,
}

impl FetchReport {
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn has_synthetic(&self) -> bool {
        self.sources.values().any(|s| *s == DataSource::Synthetic)
    }
}

/// Fetch every instrument of `universe`.
///
/// Fetches run in parallel; the result does not depend on completion order.
/// A failed or empty instrument is recorded in `missing` and otherwise
/// ignored. An empty table is returned as-is: deciding that "no data at all"
/// is fatal is the caller's job.
pub fn fetch_table(
    provider: &dyn PriceProvider,
    universe: &Universe,
    start: NaiveDate,
    end: NaiveDate,
) -> FetchReport {
    let results: Vec<(&Instrument, Result<(PriceSeries, DataSource), DataError>)> = universe
        .instruments()
        .par_iter()
        .map(|inst| {
            let result = provider
                .fetch(inst.fetch_symbol(), start, end)
                .and_then(|fetched| {
                    let raw = fetched.points.len();
                    let series = PriceSeries::new(fetched.points);
                    if series.len() < raw {
                        debug!(
                            instrument = %inst.name,
                            dropped = raw - series.len(),
                            "dropped duplicate or unusable points"
                        );
                    }
                    if series.is_empty() {
                        Err(DataError::NoData {
                            symbol: inst.fetch_symbol().to_string(),
                        })
                    } else {
                        Ok((series, fetched.source))
                    }
                });
            (inst, result)
        })
        .collect();

    let mut table = PriceTable::new();
    let mut missing = Vec::new();
    let mut sources = BTreeMap::new();

    for (inst, result) in results {
        match result {
            Ok((series, source)) => {
                table.insert(inst.name.clone(), series);
                sources.insert(inst.name.clone(), source);
            }
            Err(e) => {
                warn!(instrument = %inst.name, error = %e, "no data for instrument");
                missing.push((inst.name.clone(), e));
            }
        }
    }

    let dataset_hash = dataset_hash(&table);

    FetchReport {
        table,
        missing,
        sources,
        dataset_hash,
    }
}

/// Deterministic BLAKE3 hash over the table (symbols are already sorted).
pub fn dataset_hash(table: &PriceTable) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, series) in table.iter() {
        hasher.update(symbol.as_bytes());
        for point in series.points() {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.close.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
