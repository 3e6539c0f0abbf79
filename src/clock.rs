//! Sources of "today" for the date-dependent calculations.
//!
//! Budget windows, goal deadlines and the recurrence sweep all depend on the
//! current calendar date. Passing a [Clock] around instead of reading the
//! system time directly lets tests pin the date.

use std::fmt::Debug;

use time::{Date, OffsetDateTime};

use crate::{Error, timezone::get_local_offset};

/// Provides the current calendar date.
pub trait Clock: Debug + Send + Sync {
    /// The calendar date right now.
    fn today(&self) -> Date;
}

/// A clock that reads the system time and converts it to a canonical timezone.
#[derive(Debug, Clone)]
pub struct SystemClock {
    timezone: String,
}

impl SystemClock {
    /// Create a clock for `timezone`, e.g. "Etc/UTC" or "Pacific/Auckland".
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezoneError] if `timezone` is not a canonical timezone name.
    pub fn new(timezone: &str) -> Result<Self, Error> {
        match get_local_offset(timezone) {
            Some(_) => Ok(Self {
                timezone: timezone.to_owned(),
            }),
            None => Err(Error::InvalidTimezoneError(timezone.to_owned())),
        }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        let now = OffsetDateTime::now_utc();

        // The offset is looked up on every call so that daylight saving changes are picked up.
        match get_local_offset(&self.timezone) {
            Some(offset) => now.to_offset(offset).date(),
            None => {
                tracing::warn!(
                    "Could not get offset for timezone {}, falling back to UTC",
                    self.timezone
                );
                now.date()
            }
        }
    }
}

/// A clock that is stuck on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
