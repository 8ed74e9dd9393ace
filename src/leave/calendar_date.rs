use chrono::{Datelike, NaiveDate, Weekday};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CalendarDateError {
    #[display(fmt = "expected a date formatted as YYYY-MM-DD, got `{}`", _0)]
    Format(String),
    #[display(fmt = "`{}` is not a valid calendar date", _0)]
    OutOfRange(String),
}

impl std::error::Error for CalendarDateError {}

/// A plain calendar day. No time of day, no timezone.
///
/// Built once at the edge of the service (query strings, JSON bodies, DB rows)
/// and passed around by value afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Strict `YYYY-MM-DD`. chrono alone accepts `2024-5-6` and signed years,
    /// so the shape is checked before handing off.
    pub fn parse(s: &str) -> Result<Self, CalendarDateError> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(CalendarDateError::Format(s.to_string()));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(CalendarDate)
            .map_err(|_| CalendarDateError::OutOfRange(s.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(CalendarDate)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }
}

#[cfg(test)]
impl CalendarDate {
    pub fn is_weekend(self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn add_days(self, days: u64) -> Option<Self> {
        self.0.checked_add_days(chrono::Days::new(days)).map(CalendarDate)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = CalendarDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CalendarDate::parse(&value)
    }
}

impl FromStr for CalendarDate {
    type Err = CalendarDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarDate::parse(s)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
