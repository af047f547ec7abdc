//! Month-end sampling of daily closes.

use chrono::NaiveDate;

use crate::domain::{MonthKey, PriceSeries};

/// The last observed close of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyClose {
    pub month: MonthKey,
    /// Date of the observation actually used (last trading day seen).
    pub date: NaiveDate,
    pub close: f64,
}

/// One row per calendar month with data, chronologically ordered.
pub fn monthly_closes(series: &PriceSeries) -> Vec<MonthlyClose> {
    let mut out: Vec<MonthlyClose> = Vec::new();
    for point in series.points() {
        let month = MonthKey::of(point.date);
        let row = MonthlyClose {
            month,
            date: point.date,
            close: point.close,
        };
        match out.last_mut() {
            // Series is sorted, so a later point in the same month replaces the earlier one
            Some(last) if last.month == month => *last = row,
            _ => out.push(row),
        }
    }
    out
}
