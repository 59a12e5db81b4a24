//! Calendar windows used by dashboard statistics.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// Number of months shown on the revenue chart.
pub const CHART_MONTHS: u32 = 6;

/// Items taken from each entity for the activity feed.
pub const ACTIVITY_PER_ENTITY: i64 = 3;

/// Maximum items in the merged activity feed.
pub const ACTIVITY_FEED_LIMIT: usize = 10;

/// A half-open calendar month `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    /// Short label such as `"Mar 2026"`.
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// First day of the month containing `date`, and the first day of the next.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = start + Months::new(1);
    (start, end)
}

/// The `count` months ending with the month containing `today`, oldest first.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<MonthWindow> {
    let (current_start, _) = month_bounds(today);
    (0..count)
        .rev()
        .map(|back| {
            let start = current_start - Months::new(back);
            let end = start + Months::new(1);
            MonthWindow {
                label: start.format("%b %Y").to_string(),
                start,
                end,
            }
        })
        .collect()
}
