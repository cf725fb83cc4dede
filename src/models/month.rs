//! Calendar month model.
//!
//! This module contains the [`Month`] type used to key piecework, rejections,
//! leave accounting and salary records by `YYYY-MM`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month, written as `YYYY-MM`.
///
/// Parsing is strict: a four-digit year, a hyphen and a two-digit month
/// between `01` and `12`. Anything else is rejected as invalid input.
///
/// # Example
///
/// ```
/// use survey_payroll::models::Month;
/// use chrono::NaiveDate;
///
/// let month: Month = "2024-02".parse().unwrap();
/// assert_eq!(month.days(), 29);
/// assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(month.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    first_day: NaiveDate,
}

impl Month {
    /// Creates a month from a year and a 1-based month number.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| {
                EngineError::invalid_input("month", format!("{}-{:02} is not a valid month", year, month))
            })
    }

    /// Returns the month a date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the month (28th, 29th, 30th or 31st).
    pub fn last_day(&self) -> NaiveDate {
        self.first_day + Days::new(u64::from(self.days() - 1))
    }

    /// The number of days in the month, honouring leap years.
    pub fn days(&self) -> u32 {
        // December of the last representable year has no successor month.
        self.first_day
            .checked_add_months(Months::new(1))
            .map_or(31, |next| (next - self.first_day).num_days() as u32)
    }

    /// Checks if a date falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }
}

/// Counts the days in the inclusive range `[start, end]`.
///
/// Returns zero when `end` is before `start`; a single-day range counts 1.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days).unwrap_or(u32::MAX)
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || EngineError::invalid_input("month", format!("expected YYYY-MM, got '{}'", s));

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(malformed());
        }
        let (year, month) = (&s[..4], &s[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        if !(1..=12).contains(&month) {
            return Err(malformed());
        }

        Month::new(year, month)
    }
}

impl TryFrom<String> for Month {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
