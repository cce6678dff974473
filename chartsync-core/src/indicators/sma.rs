//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! Lookback: period - 1 (first point at index period-1).

use super::Indicator;
use crate::domain::{CanonicalSeries, IndicatorPoint, LineSeries};

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &CanonicalSeries) -> LineSeries {
        sma(series, self.period)
    }
}

/// SMA of closes, aligned to the tail of the series.
///
/// Empty when `period == 0` or `period > len`.
pub fn sma(series: &CanonicalSeries, period: usize) -> LineSeries {
    let closes = series.closes();
    let values = sma_values(&closes, period);
    let offset = series.len() - values.len();
    series.bars()[offset..]
        .iter()
        .zip(values)
        .map(|(bar, value)| IndicatorPoint::new(bar.time, value))
        .collect()
}

/// Trailing means of `values`; length `n - period + 1` (or 0).
///
/// Each window is summed fresh so long series don't accumulate
/// add/subtract rounding drift.
pub fn sma_values(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || period > values.len() {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}
