//! Calendar-month arithmetic and rebalance period determination.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `n` months before this one.
    pub fn minus(self, n: u32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn prev(self) -> Self {
        self.minus(1)
    }

    /// Last calendar day of the month.
    pub fn month_end(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .expect("month is always in 1..=12")
    }

    /// Short label such as `Jun 2024`.
    pub fn label(self) -> String {
        self.month_end().format("%b %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The most recently completed month-end as seen from the data.
///
/// `as_of` is the last trading day present in the data, capped at `today`
/// (vendor bars stamped in UTC can run ahead of the local date). When it
/// falls in the same calendar month as `today`, that month is still in
/// progress and the period rolls back to the previous month-end. Otherwise
/// the month of `as_of` is complete and its calendar month-end is the period.
pub fn rebalance_period(as_of: NaiveDate, today: NaiveDate) -> NaiveDate {
    let data_month = MonthKey::of(as_of.min(today));
    if data_month == MonthKey::of(today) {
        data_month.prev().month_end()
    } else {
        data_month.month_end()
    }
}
