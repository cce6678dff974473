//! MACD: difference of a fast and a slow EMA, its signal line, and the
//! histogram between them.
//!
//! Both EMAs are seeded with the first close (see [`super::ema`]). The MACD
//! line is defined from bar `slow-1`; the signal line is the EMA of that
//! line. All three outputs share one time axis starting at bar
//! `slow-1 + signal-1`, and the histogram at each point is `macd - signal`
//! of that same point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ema::ema;
use crate::chart::Palette;
use crate::domain::{CanonicalSeries, HistogramPoint, IndicatorPoint, LineSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl MacdParams {
    /// First bar index with output.
    pub fn warmup(&self) -> usize {
        (self.slow + self.signal).saturating_sub(2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: LineSeries,
    pub signal: LineSeries,
    pub histogram: LineSeries,
}

impl MacdSeries {
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    pub fn len(&self) -> usize {
        self.histogram.len()
    }

    /// Histogram bars colored by sign; zero counts as up.
    pub fn colored_histogram(&self, palette: &Palette) -> Vec<HistogramPoint> {
        self.histogram
            .iter()
            .map(|p| HistogramPoint {
                time: p.time,
                value: p.value,
                color: if p.value >= 0.0 {
                    palette.up_color().to_string()
                } else {
                    palette.down_color().to_string()
                },
            })
            .collect()
    }
}

pub fn macd(series: &CanonicalSeries, params: MacdParams) -> MacdSeries {
    let MacdParams { fast, slow, signal } = params;
    let n = series.len();
    if fast == 0 || slow == 0 || signal == 0 || n < slow {
        if n > 0 {
            debug!(bars = n, slow, "not enough history for MACD");
        }
        return MacdSeries::default();
    }

    let closes = series.closes();
    let fast_ema = ema(&closes, fast);
    let slow_ema = ema(&closes, slow);

    let start = slow - 1;
    let macd_line: Vec<f64> = (start..n).map(|i| fast_ema[i] - slow_ema[i]).collect();
    let signal_line = ema(&macd_line, signal);

    let skip = signal - 1;
    let mut out = MacdSeries::default();
    for (k, (m, s)) in macd_line.iter().zip(&signal_line).enumerate().skip(skip) {
        let time = series.bars()[start + k].time;
        out.macd.push(IndicatorPoint::new(time, *m));
        out.signal.push(IndicatorPoint::new(time, *s));
        out.histogram.push(IndicatorPoint::new(time, m - s));
    }
    out
}
