//! TimeKey: the two time encodings a chart series can use.
//!
//! Intraday sources are keyed by epoch seconds; date-only sources are keyed by
//! a calendar day (the "business day" representation). A single series never
//! mixes the two.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar day without a time-of-day component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl BusinessDay {
    /// Build a business day, rejecting impossible calendar dates.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from)
    }

    pub fn to_naive_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Epoch seconds at UTC midnight of this day.
    pub fn utc_midnight_secs(self) -> i64 {
        self.to_naive_date()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(i64::MIN)
    }
}

impl From<NaiveDate> for BusinessDay {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for BusinessDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Which encoding a series uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEncoding {
    Timestamp,
    BusinessDay,
}

/// Normalized time value of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeKey {
    /// Integer seconds since the Unix epoch.
    Timestamp(i64),
    /// Date-only calendar day.
    BusinessDay(BusinessDay),
}

impl TimeKey {
    pub fn business_day(year: i32, month: u32, day: u32) -> Option<Self> {
        BusinessDay::new(year, month, day).map(TimeKey::BusinessDay)
    }

    pub fn as_business_day(&self) -> Option<BusinessDay> {
        match self {
            TimeKey::BusinessDay(day) => Some(*day),
            TimeKey::Timestamp(_) => None,
        }
    }

    pub fn encoding(&self) -> TimeEncoding {
        match self {
            TimeKey::Timestamp(_) => TimeEncoding::Timestamp,
            TimeKey::BusinessDay(_) => TimeEncoding::BusinessDay,
        }
    }

    /// Comparable projection in seconds. Business days project to UTC midnight.
    pub fn sort_key(&self) -> i64 {
        match self {
            TimeKey::Timestamp(secs) => *secs,
            TimeKey::BusinessDay(day) => day.utc_midnight_secs(),
        }
    }

    /// Re-express this key in `encoding`.
    ///
    /// Timestamps collapse to the UTC calendar day they fall on; business days
    /// expand to their UTC midnight.
    pub fn convert(self, encoding: TimeEncoding) -> Option<Self> {
        match (self, encoding) {
            (TimeKey::Timestamp(_), TimeEncoding::Timestamp)
            | (TimeKey::BusinessDay(_), TimeEncoding::BusinessDay) => Some(self),
            (TimeKey::Timestamp(secs), TimeEncoding::BusinessDay) => DateTime::from_timestamp(secs, 0)
                .map(|dt| TimeKey::BusinessDay(BusinessDay::from(dt.date_naive()))),
            (TimeKey::BusinessDay(day), TimeEncoding::Timestamp) => day
                .to_naive_date()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| TimeKey::Timestamp(dt.and_utc().timestamp())),
        }
    }

    /// `YYYY-MM-DD` label for overlays. Timestamps use their UTC date.
    pub fn date_label(&self) -> String {
        match self {
            TimeKey::BusinessDay(day) => day.to_string(),
            TimeKey::Timestamp(secs) => DateTime::from_timestamp(*secs, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<BusinessDay> for TimeKey {
    fn from(day: BusinessDay) -> Self {
        TimeKey::BusinessDay(day)
    }
}

impl From<NaiveDate> for TimeKey {
    fn from(date: NaiveDate) -> Self {
        TimeKey::BusinessDay(BusinessDay::from(date))
    }
}
