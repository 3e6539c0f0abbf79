//! Calendar windows anchored to a date.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Whether `date` falls within the range, including both ends.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The week containing `anchor_date`, starting on Monday.
pub fn week_bounds(anchor_date: Date) -> DateRange {
    let weekday_number = anchor_date.weekday().number_from_monday() as i64;
    let start = anchor_date - Duration::days(weekday_number - 1);
    let end = start + Duration::days(6);

    DateRange { start, end }
}

/// The calendar month containing `anchor_date`.
pub fn month_bounds(anchor_date: Date) -> DateRange {
    let start = anchor_date - Duration::days(anchor_date.day() as i64 - 1);
    let end = start
        + Duration::days(last_day_of_month(anchor_date.year(), anchor_date.month()) as i64 - 1);

    DateRange { start, end }
}

/// The calendar year containing `anchor_date`.
pub fn year_bounds(anchor_date: Date) -> DateRange {
    let start = anchor_date - Duration::days(anchor_date.ordinal() as i64 - 1);
    let end = start + Duration::days(time::util::days_in_year(anchor_date.year()) as i64 - 1);

    DateRange { start, end }
}

/// The number of the last day in `month`, accounting for leap years.
pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    month.length(year)
}
