//! Bar normalization: raw records in, canonical series out.
//!
//! Pipeline, in order:
//! 1. resolve each record's time (unparseable → dropped)
//! 2. read prices (non-finite OHLC, bad volume → dropped)
//! 3. pick one time encoding for the batch by majority, converting the rest
//! 4. stable sort by time
//! 5. dedupe by time, keeping the first occurrence after sorting
//! 6. optional trailing window
//!
//! Normalization never fails. Bad input yields a shorter (possibly empty)
//! series and the counts land in [`NormalizeReport`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::raw::{
    RawRecord, CLOSE_FIELDS, HIGH_FIELDS, LOW_FIELDS, OPEN_FIELDS, VOLUME_FIELDS,
};
use crate::domain::{Bar, CanonicalSeries, TimeEncoding, TimeKey};

/// Caller options for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Keep only the last N bars (applied after sort and dedupe).
    pub trailing: Option<usize>,
}

impl NormalizeOptions {
    pub fn trailing(n: usize) -> Self {
        Self { trailing: Some(n) }
    }
}

/// What a normalization pass filtered out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input: usize,
    pub unparseable_time: usize,
    pub invalid_price: usize,
    /// Records re-expressed in the batch's dominant encoding.
    pub converted: usize,
    pub duplicates: usize,
    pub truncated: usize,
    pub output: usize,
}

/// Converts loosely typed bar records into a [`CanonicalSeries`].
pub struct BarNormalizer;

impl BarNormalizer {
    pub fn normalize(records: &[RawRecord], options: NormalizeOptions) -> CanonicalSeries {
        Self::normalize_with_report(records, options).0
    }

    pub fn normalize_with_report(
        records: &[RawRecord],
        options: NormalizeOptions,
    ) -> (CanonicalSeries, NormalizeReport) {
        let mut report = NormalizeReport {
            input: records.len(),
            ..Default::default()
        };

        let mut parsed = Vec::with_capacity(records.len());
        for record in records {
            let Some(time) = record.time() else {
                report.unparseable_time += 1;
                continue;
            };
            match read_bar(record, time) {
                Some(bar) => parsed.push(bar),
                None => report.invalid_price += 1,
            }
        }

        let encoding = dominant_encoding(&parsed);
        let mut bars: Vec<Bar> = Vec::with_capacity(parsed.len());
        if let Some(encoding) = encoding {
            for mut bar in parsed {
                if bar.time.encoding() != encoding {
                    match bar.time.convert(encoding) {
                        Some(time) => {
                            bar.time = time;
                            report.converted += 1;
                        }
                        None => {
                            report.unparseable_time += 1;
                            continue;
                        }
                    }
                }
                bars.push(bar);
            }
        }

        // Vec::sort_by_key is stable, so equal keys keep source order.
        bars.sort_by_key(|b| b.time.sort_key());

        let before_dedupe = bars.len();
        bars.dedup_by(|later, earlier| later.time == earlier.time);
        report.duplicates = before_dedupe - bars.len();

        if let Some(n) = options.trailing {
            if bars.len() > n {
                report.truncated = bars.len() - n;
                bars.drain(..bars.len() - n);
            }
        }

        report.output = bars.len();
        if report.output < report.input {
            debug!(
                input = report.input,
                output = report.output,
                unparseable_time = report.unparseable_time,
                invalid_price = report.invalid_price,
                duplicates = report.duplicates,
                truncated = report.truncated,
                "normalization filtered records"
            );
        }

        let encoding = if bars.is_empty() { None } else { encoding };
        (CanonicalSeries::from_parts_unchecked(bars, encoding), report)
    }
}

/// Read prices for a record whose time already resolved.
fn read_bar(record: &RawRecord, time: TimeKey) -> Option<Bar> {
    let open = finite(record.number(OPEN_FIELDS))?;
    let close = finite(record.number(CLOSE_FIELDS))?;
    let high = finite(record.number(HIGH_FIELDS))?;
    let low = finite(record.number(LOW_FIELDS))?;
    let volume = match record.field(VOLUME_FIELDS) {
        None => 0.0,
        Some(_) => finite(record.number(VOLUME_FIELDS)).filter(|v| *v >= 0.0)?,
    };
    Some(Bar {
        time,
        open,
        high,
        low,
        close,
        volume,
    })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Majority encoding of the batch; ties go to business days.
fn dominant_encoding(bars: &[Bar]) -> Option<TimeEncoding> {
    if bars.is_empty() {
        return None;
    }
    let timestamps = bars
        .iter()
        .filter(|b| b.time.encoding() == TimeEncoding::Timestamp)
        .count();
    if timestamps * 2 > bars.len() {
        Some(TimeEncoding::Timestamp)
    } else {
        Some(TimeEncoding::BusinessDay)
    }
}

impl CanonicalSeries {
    /// Project back to raw records that normalize to this exact series.
    ///
    /// Timestamps are written as RFC 3339 UTC strings and business days as
    /// `YYYY-MM-DD`.
    pub fn to_raw_records(&self) -> Vec<RawRecord> {
        self.bars()
            .iter()
            .map(|bar| {
                let date = match bar.time {
                    TimeKey::Timestamp(secs) => chrono::DateTime::from_timestamp(secs, 0)
                        .map(|dt| Value::String(dt.to_rfc3339()))
                        .unwrap_or(Value::from(secs)),
                    TimeKey::BusinessDay(day) => Value::String(day.to_string()),
                };
                RawRecord::new()
                    .with("date", date)
                    .with("open", bar.open)
                    .with("high", bar.high)
                    .with("low", bar.low)
                    .with("close", bar.close)
                    .with("volume", bar.volume)
            })
            .collect()
    }
}
