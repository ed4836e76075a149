//! Calendar dates and timestamps.
//!
//! Stored timestamps are UTC and are shown as such; "today" is the local date of the machine.
use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A day in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Today's date in the local time zone.
    pub fn today() -> Self {
        Local::now().date_naive().into()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        // Months and days always fit.
        Self::new(date.year(), date.month() as u8, date.day() as u8)
    }
}

/// Formats as `DD/MM/YYYY`.
impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day, self.month, self.year)
    }
}

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp())
    }

    /// The instant in UTC. Out-of-range values clamp to the epoch.
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    pub fn date(self) -> CalendarDate {
        self.to_datetime().date_naive().into()
    }

    /// `DD/MM/YYYY às HH:MM`, used in post headers.
    pub fn format_long(self) -> String {
        self.to_datetime().format("%d/%m/%Y às %H:%M").to_string()
    }

    /// `DD/MM às HH:MM`, used in comment headers.
    pub fn format_short(self) -> String {
        self.to_datetime().format("%d/%m às %H:%M").to_string()
    }
}
