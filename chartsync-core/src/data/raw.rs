//! Loosely typed bar records as they arrive from upstream.
//!
//! Upstream payloads disagree on field casing (`date`/`Date`, `close`/`Close`)
//! and on date encoding (ISO date, ISO datetime, slash dates, epoch numbers).
//! This module resolves both without ever failing: anything it cannot read
//! comes back as `None` and the normalizer drops the record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{BusinessDay, TimeKey};

/// Field aliases, first present wins.
pub const TIME_FIELDS: &[&str] = &["date", "Date", "time", "Time"];
pub const OPEN_FIELDS: &[&str] = &["open", "Open"];
pub const HIGH_FIELDS: &[&str] = &["high", "High"];
pub const LOW_FIELDS: &[&str] = &["low", "Low"];
pub const CLOSE_FIELDS: &[&str] = &["close", "Close"];
pub const VOLUME_FIELDS: &[&str] = &["volume", "Volume"];

/// Epoch numbers above this magnitude are read as milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// One upstream bar record: an arbitrary JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and adapters.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// First present, non-null value among `aliases`.
    pub fn field(&self, aliases: &[&str]) -> Option<&Value> {
        aliases
            .iter()
            .filter_map(|name| self.0.get(*name))
            .find(|v| !v.is_null())
    }

    pub fn time(&self) -> Option<TimeKey> {
        self.field(TIME_FIELDS).and_then(parse_time)
    }

    /// Numeric field; `None` when missing or not a number. May be non-finite.
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        self.field(aliases).and_then(parse_number)
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Read a JSON number or numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Resolve any supported time representation to a [`TimeKey`].
///
/// Strings with a time-of-day component become timestamps; date-only strings
/// become business days. JSON numbers are epoch seconds (or milliseconds when
/// large). Objects with `year`/`month`/`day` are taken as business days.
pub fn parse_time(value: &Value) -> Option<TimeKey> {
    match value {
        Value::String(s) => parse_time_str(s.trim()),
        Value::Number(n) => {
            let raw = n.as_f64()?;
            if !raw.is_finite() {
                return None;
            }
            let secs = if raw.abs() > MILLIS_THRESHOLD {
                (raw / 1000.0).floor()
            } else {
                raw.floor()
            };
            let secs = secs as i64;
            DateTime::from_timestamp(secs, 0)?;
            Some(TimeKey::Timestamp(secs))
        }
        Value::Object(map) => {
            let part = |k: &str| map.get(k).and_then(Value::as_i64);
            let (y, m, d) = (part("year")?, part("month")?, part("day")?);
            TimeKey::business_day(
                i32::try_from(y).ok()?,
                u32::try_from(m).ok()?,
                u32::try_from(d).ok()?,
            )
        }
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<TimeKey> {
    if s.is_empty() {
        return None;
    }
    if s.contains(':') {
        if let Some(ts) = parse_datetime(s) {
            return Some(TimeKey::Timestamp(ts));
        }
    }
    scan_date(s).map(TimeKey::BusinessDay)
}

/// Epoch seconds for an RFC 3339, RFC 2822 or naive datetime string.
/// Naive values are read as UTC.
fn parse_datetime(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// First `YYYY[-/]M[-/]D` occurrence anywhere in `s`.
fn scan_date(s: &str) -> Option<BusinessDay> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find_map(|start| date_at(bytes, start))
}

fn date_at(bytes: &[u8], start: usize) -> Option<BusinessDay> {
    let (year, mut pos) = digits(bytes, start, 4, 4)?;
    let sep = *bytes.get(pos)?;
    if sep != b'-' && sep != b'/' {
        return None;
    }
    let (month, next) = digits(bytes, pos + 1, 1, 2)?;
    pos = next;
    let sep2 = *bytes.get(pos)?;
    if sep2 != b'-' && sep2 != b'/' {
        return None;
    }
    let (day, _) = digits(bytes, pos + 1, 1, 2)?;
    NaiveDate::from_ymd_opt(year as i32, month, day).map(BusinessDay::from)
}

/// Greedy run of `min..=max` ASCII digits at `start`; returns value and end.
fn digits(bytes: &[u8], start: usize, min: usize, max: usize) -> Option<(u32, usize)> {
    let run = bytes
        .iter()
        .skip(start)
        .take(max)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if run < min {
        return None;
    }
    let value = bytes[start..start + run]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some((value, start + run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> TimeKey {
        TimeKey::business_day(y, m, d).unwrap()
    }

    #[test]
    fn iso_date_is_business_day() {
        assert_eq!(parse_time(&json!("2024-07-07")), Some(day(2024, 7, 7)));
    }

    #[test]
    fn slash_date_with_single_digits() {
        assert_eq!(parse_time(&json!("2024/7/7")), Some(day(2024, 7, 7)));
    }

    #[test]
    fn datetime_is_timestamp() {
        // 2024-07-07 14:30:00 UTC
        assert_eq!(parse_time(&json!("2024-07-07 14:30:00")), Some(TimeKey::Timestamp(1_720_362_600)));
        assert_eq!(parse_time(&json!("2024-07-07T14:30:00Z")), Some(TimeKey::Timestamp(1_720_362_600)));
        assert_eq!(
            parse_time(&json!("2024-07-07T22:30:00+08:00")),
            Some(TimeKey::Timestamp(1_720_362_600))
        );
        assert_eq!(parse_time(&json!("2024/07/07 14:30")), Some(TimeKey::Timestamp(1_720_362_600)));
    }

    #[test]
    fn unparseable_time_falls_back_to_embedded_date() {
        assert_eq!(parse_time(&json!("2024-07-07 99:99")), Some(day(2024, 7, 7)));
    }

    #[test]
    fn rfc2822_is_timestamp() {
        assert_eq!(
            parse_time(&json!("Sun, 07 Jul 2024 14:30:00 +0000")),
            Some(TimeKey::Timestamp(1_720_362_600))
        );
    }

    #[test]
    fn epoch_numbers_seconds_and_millis() {
        assert_eq!(parse_time(&json!(1_720_362_600)), Some(TimeKey::Timestamp(1_720_362_600)));
        assert_eq!(parse_time(&json!(1_720_362_600_000_i64)), Some(TimeKey::Timestamp(1_720_362_600)));
    }

    #[test]
    fn epoch_outside_calendar_range_is_rejected() {
        assert_eq!(parse_time(&json!(-1e300)), None);
        assert_eq!(parse_time(&json!(1e300)), None);
    }

    #[test]
    fn structured_object_is_business_day() {
        assert_eq!(parse_time(&json!({"year": 2024, "month": 7, "day": 7})), Some(day(2024, 7, 7)));
        assert_eq!(parse_time(&json!({"year": 2024, "month": 13, "day": 7})), None);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_time(&json!("yesterday")), None);
        assert_eq!(parse_time(&json!("")), None);
        assert_eq!(parse_time(&json!(true)), None);
        assert_eq!(parse_time(&json!("2024-02-30")), None);
    }

    #[test]
    fn field_aliases_first_present_wins() {
        let record = RawRecord::new()
            .with("Date", "2024-01-02")
            .with("close", "12.5")
            .with("Close", 99.0);
        assert_eq!(record.time(), Some(day(2024, 1, 2)));
        assert_eq!(record.number(CLOSE_FIELDS), Some(12.5));
    }

    #[test]
    fn null_field_falls_through_to_next_alias() {
        let record = RawRecord::new().with("date", Value::Null).with("time", "2024-01-02");
        assert_eq!(record.time(), Some(day(2024, 1, 2)));
    }

    #[test]
    fn non_numeric_strings_are_none() {
        assert_eq!(parse_number(&json!("abc")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert!(parse_number(&json!("NaN")).unwrap().is_nan());
    }
}
