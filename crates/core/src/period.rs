use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Inclusive on both ends. An inverted range contains nothing.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Calendar-month bucket key, e.g. `2024-03`. Lexicographic order is
/// chronological order.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Start of a "most recent N months" window ending at `latest`.
/// Saturates at the earliest representable date rather than failing.
pub fn window_start(latest: NaiveDate, months: u32) -> NaiveDate {
    latest
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}
