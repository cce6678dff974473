//! Integration tests for bar normalization from upstream JSON payloads.

use serde_json::json;

use chartsync_core::data::{BarNormalizer, NormalizeOptions, Period, RawRecord};
use chartsync_core::domain::{TimeEncoding, TimeKey};

fn records(value: serde_json::Value) -> Vec<RawRecord> {
    serde_json::from_value(value).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> TimeKey {
    TimeKey::business_day(y, m, d).unwrap()
}

#[test]
fn messy_payload_becomes_strictly_ascending() {
    let input = records(json!([
        {"Date": "2024-03-05", "Open": "10.5", "High": 11, "Low": 10, "Close": 10.8, "Volume": 1200},
        {"date": "2024/03/01", "open": 10, "high": 10.6, "low": 9.8, "close": 10.2, "volume": "900"},
        {"date": "2024-03-04", "open": 10.2, "high": 10.7, "low": 10.1, "close": 10.5},
        {"date": "not a date", "open": 1, "high": 1, "low": 1, "close": 1},
        {"date": "2024-03-06", "open": 10.8, "high": null, "low": 10.5, "close": 10.9},
        {"date": "2024-03-04", "open": 99, "high": 99, "low": 99, "close": 99},
    ]));

    let (series, report) = BarNormalizer::normalize_with_report(&input, NormalizeOptions::default());

    assert_eq!(series.encoding(), Some(TimeEncoding::BusinessDay));
    assert_eq!(series.times(), vec![day(2024, 3, 1), day(2024, 3, 4), day(2024, 3, 5)]);
    // first occurrence of the duplicated day wins
    assert_eq!(series.get(1).unwrap().close, 10.5);
    // missing volume reads as zero, string volume parses
    assert_eq!(series.get(1).unwrap().volume, 0.0);
    assert_eq!(series.get(0).unwrap().volume, 900.0);

    assert_eq!(report.input, 6);
    assert_eq!(report.unparseable_time, 1);
    assert_eq!(report.invalid_price, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.output, 3);
}

#[test]
fn timestamp_majority_converts_dates() {
    let input = records(json!([
        {"time": "2024-03-01T14:30:00Z", "open": 1, "high": 2, "low": 0.5, "close": 1.5},
        {"time": 1709389800, "open": 1.5, "high": 2, "low": 1, "close": 1.8},
        {"time": "2024-03-05", "open": 1.8, "high": 2.2, "low": 1.7, "close": 2.0},
    ]));

    let (series, report) = BarNormalizer::normalize_with_report(&input, NormalizeOptions::default());
    assert_eq!(series.encoding(), Some(TimeEncoding::Timestamp));
    assert_eq!(series.len(), 3);
    assert_eq!(report.converted, 1);
    assert!(series.bars().iter().all(|b| b.time.encoding() == TimeEncoding::Timestamp));
}

#[test]
fn millisecond_epochs_are_scaled() {
    let input = records(json!([
        {"time": 1709303400000_i64, "open": 1, "high": 1, "low": 1, "close": 1},
    ]));
    let series = BarNormalizer::normalize(&input, NormalizeOptions::default());
    assert_eq!(series.get(0).unwrap().time, TimeKey::Timestamp(1_709_303_400));
}

#[test]
fn weekly_period_keeps_trailing_window() {
    let input: Vec<RawRecord> = (0..40)
        .map(|i| {
            RawRecord::new()
                .with("time", 1_700_000_000_i64 + i * 604_800)
                .with("open", 1.0)
                .with("high", 2.0)
                .with("low", 0.5)
                .with("close", 1.0 + i as f64)
        })
        .collect();

    let (series, report) =
        BarNormalizer::normalize_with_report(&input, Period::Weekly.normalize_options());
    assert_eq!(series.len(), 26);
    assert_eq!(report.truncated, 14);
    // newest bars survive
    assert_eq!(series.last().unwrap().close, 40.0);
    assert_eq!(series.get(0).unwrap().close, 15.0);

    let daily = BarNormalizer::normalize(&input, Period::Daily.normalize_options());
    assert_eq!(daily.len(), 40);
}

#[test]
fn empty_and_all_invalid_inputs_give_empty_series() {
    assert!(BarNormalizer::normalize(&[], NormalizeOptions::default()).is_empty());

    let junk = records(json!([
        {"date": "2024-01-02"},
        {"open": 1, "high": 1, "low": 1, "close": 1},
        {"date": "2024-01-03", "open": "abc", "high": 1, "low": 1, "close": 1},
    ]));
    let (series, report) = BarNormalizer::normalize_with_report(&junk, NormalizeOptions::default());
    assert!(series.is_empty());
    assert_eq!(series.encoding(), None);
    assert_eq!(report.output, 0);
}

#[test]
fn canonical_output_is_a_fixed_point() {
    let input = records(json!([
        {"date": "2024-01-03", "open": 2, "high": 3, "low": 1, "close": 2.5, "volume": 10},
        {"date": "2024-01-02", "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 20},
    ]));
    let once = BarNormalizer::normalize(&input, NormalizeOptions::default());
    let twice = BarNormalizer::normalize(&once.to_raw_records(), NormalizeOptions::default());
    assert_eq!(once, twice);
}

#[test]
fn out_of_range_epoch_is_dropped() {
    let input = records(json!([
        {"date": -1e300, "open": 1, "high": 1, "low": 1, "close": 1},
        {"date": 1_709_303_400, "open": 10, "high": 11, "low": 9, "close": 10.5},
    ]));
    let (series, report) = BarNormalizer::normalize_with_report(&input, NormalizeOptions::default());
    assert_eq!(series.times(), vec![TimeKey::Timestamp(1_709_303_400)]);
    assert_eq!(report.unparseable_time, 1);
}
