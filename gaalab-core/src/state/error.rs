use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed state record on line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("a record for {date} already exists")]
    DuplicatePeriod { date: NaiveDate },
}
