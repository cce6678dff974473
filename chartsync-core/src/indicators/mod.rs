//! Indicator engine.
//!
//! Every function here is pure: a canonical series (or a slice of values) in,
//! a time-aligned line out. Nothing is cached between calls, so a refresh is
//! always a full recompute.
//!
//! Derived lines are suffixes of the series time axis: a line with warm-up
//! `w` starts at bar `w` and runs to the last bar. Insufficient history yields
//! an empty line, never an error.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use bollinger::{bollinger, BandSnapshot, BollingerParams, BollingerSeries};
pub use ema::{ema, Ema, EmaState};
pub use macd::{macd, MacdParams, MacdSeries};
pub use rsi::{classify_rsi, RsiState, RsiThresholds};
pub use sma::{sma, sma_values, Sma};
pub use volume::volume_histogram;

use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalSeries, LineSeries};

/// Moving-average overlay periods drawn on the price pane by default.
pub const DEFAULT_MA_PERIODS: [usize; 3] = [5, 10, 20];

/// A single-line indicator over the close series.
///
/// Multi-line indicators (MACD, Bollinger) have their own result types and
/// are not forced through this trait.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g. "ma_20", "ema_12").
    fn name(&self) -> &str;

    /// Bars consumed before the first output point.
    fn lookback(&self) -> usize;

    /// Compute the line. Output length is `len - lookback()` or empty.
    fn compute(&self, series: &CanonicalSeries) -> LineSeries;
}

/// One moving-average overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub period: usize,
    pub points: LineSeries,
}

impl MovingAverage {
    pub fn name(&self) -> String {
        format!("MA{}", self.period)
    }
}

/// SMA overlay per period. Periods longer than the series give empty lines
/// so the overlay set always has one entry per requested period.
pub fn moving_averages(series: &CanonicalSeries, periods: &[usize]) -> Vec<MovingAverage> {
    periods
        .iter()
        .map(|&period| MovingAverage {
            period,
            points: Sma::new(period).compute(series),
        })
        .collect()
}

/// Build a business-day series from close prices for testing.
///
/// open = previous close (or close for the first bar), high/low = ±1 around
/// the body, volume = 1000. Dates start at 2024-01-02, one per day.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> CanonicalSeries {
    use crate::domain::{Bar, BusinessDay, TimeKey};
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: TimeKey::BusinessDay(BusinessDay::from(base + chrono::Duration::days(i as i64))),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    CanonicalSeries::from_sorted(bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
