//! CSV import provider: one `{SYMBOL}.csv` file per instrument.
//!
//! The file needs a header row with a `date` column and a `close` column
//! (`adj_close` is preferred when present). Header names are matched
//! case-insensitively; dates may carry a time suffix, only the first ten
//! characters are parsed.

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::PricePoint;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_points(path: &Path) -> Result<Vec<PricePoint>, DataError> {
        let err = |reason: String| DataError::CsvImport {
            path: path.display().to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| err(e.to_string()))?;

        let headers = reader.headers().map_err(|e| err(e.to_string()))?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        };
        let date_col = find("date").ok_or_else(|| err("missing 'date' column".into()))?;
        let close_col = find("adj_close")
            .or_else(|| find("adj close"))
            .or_else(|| find("close"))
            .ok_or_else(|| err("missing 'close' column".into()))?;

        let mut points = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| err(e.to_string()))?;
            let (Some(raw_date), Some(raw_close)) = (record.get(date_col), record.get(close_col))
            else {
                continue;
            };
            let date_part = raw_date.get(..10).unwrap_or(raw_date);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| err(format!("row {}: bad date '{raw_date}': {e}", i + 2)))?;
            // Empty or non-numeric closes are vendor gaps, not fatal
            if let Ok(close) = raw_close.parse::<f64>() {
                points.push(PricePoint::new(date, close));
            }
        }
        Ok(points)
    }
}

impl PriceProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let points: Vec<PricePoint> = Self::read_points(&path)?
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect();

        if points.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            points,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
