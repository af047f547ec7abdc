//! Flat-file store: `YYYY-MM-DD;SYM1,SYM2,CASH`, one record per line.
//!
//! The first line is a `date;portfolio` header when the store created the
//! file. Files written by hand without a header are read as well.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::{RebalanceRecord, RebalanceStateStore, StateError};

const HEADER: [&str; 2] = ["date", "portfolio"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<RebalanceRecord>, StateError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 1);
            let raw_date = row.get(0).unwrap_or_default();
            let period_end = match NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
                Ok(date) => date,
                Err(_) if i == 0 => continue,
                Err(e) => {
                    return Err(StateError::Parse {
                        line,
                        reason: format!("bad date '{raw_date}': {e}"),
                    })
                }
            };
            let holdings = row
                .get(1)
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            records.push(RebalanceRecord::new(period_end, holdings));
        }
        Ok(records)
    }

    /// Render `fields` as one `;`-delimited line with a trailing newline.
    fn encode_line(fields: &[&str]) -> Result<Vec<u8>, StateError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(fields)?;
        writer.into_inner().map_err(|e| StateError::Io(e.into_error()))
    }

    /// Whether the existing file is non-empty and lacks a trailing newline.
    fn needs_leading_newline(file: &mut File) -> Result<bool, StateError> {
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

impl RebalanceStateStore for FileStateStore {
    fn records(&self) -> Result<Vec<RebalanceRecord>, StateError> {
        self.read_all()
    }

    fn append(&mut self, period_end: NaiveDate, holdings: &[String]) -> Result<(), StateError> {
        if self.already_recorded(period_end)? {
            return Err(StateError::DuplicatePeriod { date: period_end });
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut buf = Vec::new();
        if file.metadata()?.len() == 0 {
            buf.extend(Self::encode_line(&HEADER)?);
        } else if Self::needs_leading_newline(&mut file)? {
            buf.push(b'\n');
        }
        let date = period_end.format(DATE_FORMAT).to_string();
        let portfolio = holdings.join(",");
        buf.extend(Self::encode_line(&[date.as_str(), portfolio.as_str()])?);

        file.write_all(&buf)?;
        file.sync_data()?;

        debug!(path = %self.path.display(), period = %period_end, "rebalance record appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn syms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("hist.csv"));
        assert!(store.records().unwrap().is_empty());
        assert!(store.last_selection().unwrap().is_empty());
    }

    #[test]
    fn append_writes_header_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hist.csv");
        let mut store = FileStateStore::new(&path);
        store
            .append(d(2024, 6, 30), &syms(&["EEM", "GC=F", "CASH"]))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "date;portfolio\n2024-06-30;EEM,GC=F,CASH\n");
        assert_eq!(
            store.last_selection().unwrap(),
            syms(&["EEM", "GC=F", "CASH"])
        );
    }

    #[test]
    fn headerless_file_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, "2024-05-31;A,B,C").unwrap();

        let mut store = FileStateStore::new(&path);
        assert_eq!(store.records().unwrap().len(), 1);

        store.append(d(2024, 6, 30), &syms(&["B", "C", "CASH"])).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "2024-05-31;A,B,C\n2024-06-30;B,C,CASH\n");
        assert_eq!(store.previous_before(d(2024, 6, 30)).unwrap(), syms(&["A", "B", "C"]));
    }

    #[test]
    fn empty_selection_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStateStore::new(dir.path().join("hist.csv"));
        store.append(d(2024, 1, 31), &[]).unwrap();
        let records = store.records().unwrap();
        assert_eq!(records, vec![RebalanceRecord::new(d(2024, 1, 31), vec![])]);
    }

    #[test]
    fn duplicate_period_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        let mut store = FileStateStore::new(&path);
        store.append(d(2024, 6, 30), &syms(&["A"])).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = store.append(d(2024, 6, 30), &syms(&["B"])).unwrap_err();
        assert!(matches!(err, StateError::DuplicatePeriod { date } if date == d(2024, 6, 30)));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn garbage_after_first_line_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        fs::write(&path, "date;portfolio\n2024-05-31;A\nnot-a-date;B\n").unwrap();
        let err = FileStateStore::new(&path).records().unwrap_err();
        assert!(matches!(err, StateError::Parse { line: 3, .. }));
    }
}
