//! Decides which calendar dates a recurring transaction falls on.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, window::last_day_of_month};

/// The longest gap between two occurrences of any rule.
const MAX_DAYS_BETWEEN_OCCURRENCES: usize = 31;

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Every day.
    Daily,
    /// On the same weekday as the origin date.
    Weekly,
    /// On the same day of the month as the origin date.
    ///
    /// If the month is too short, the last day of the month is used instead,
    /// e.g. an origin on the 31st recurs on the 30th of April and the 28th (or 29th) of February.
    Monthly,
}

impl Recurrence {
    /// The lowercase name used in the database and the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Whether `today` is an occurrence of a schedule that started on `origin`.
    ///
    /// The origin itself is never an occurrence, the original transaction already covers it.
    pub fn is_due(self, origin: Date, today: Date) -> bool {
        if today <= origin {
            return false;
        }

        match self {
            Recurrence::Daily => true,
            Recurrence::Weekly => today.weekday() == origin.weekday(),
            Recurrence::Monthly => {
                let last_day = last_day_of_month(today.year(), today.month());
                today.day() == origin.day().min(last_day)
            }
        }
    }

    /// The first occurrence strictly after `today`.
    ///
    /// Returns `None` only if the date would overflow the calendar.
    pub fn next_occurrence(self, origin: Date, today: Date) -> Option<Date> {
        let mut candidate = today.max(origin).next_day()?;

        for _ in 0..MAX_DAYS_BETWEEN_OCCURRENCES {
            if self.is_due(origin, candidate) {
                return Some(candidate);
            }

            candidate = candidate.next_day()?;
        }

        None
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a recurrence, expected daily, weekly or monthly"
            ))),
        }
    }
}

impl ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Recurrence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
