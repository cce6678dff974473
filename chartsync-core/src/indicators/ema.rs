//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: EMA[0] = x[0]. Output length equals input length; there is no
//! warm-up gap, which keeps downstream MACD indices simple.

use super::Indicator;
use crate::domain::{CanonicalSeries, IndicatorPoint, LineSeries};

/// Streaming EMA accumulator. O(1) state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaState {
    alpha: f64,
    current: Option<f64>,
}

impl EmaState {
    /// `None` for a zero period.
    pub fn new(period: usize) -> Option<Self> {
        (period > 0).then(|| Self {
            alpha: 2.0 / (period as f64 + 1.0),
            current: None,
        })
    }

    /// Feed the next value and return the updated average.
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current {
            None => value,
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
        };
        self.current = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.current
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// EMA of an arbitrary value slice. Empty for empty input or a zero period.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let Some(mut state) = EmaState::new(period) else {
        return Vec::new();
    };
    values.iter().map(|&v| state.update(v)).collect()
}

/// EMA of closes as an indicator line.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, series: &CanonicalSeries) -> LineSeries {
        let values = ema(&series.closes(), self.period);
        series
            .bars()
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint::new(bar.time, value))
            .collect()
    }
}
