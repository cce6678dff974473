//! Marker detection.
//!
//! Markers are derived from a fully computed indicator set in one pass and
//! thrown away on the next refresh. Nothing here is incremental.

pub mod crossover;
pub mod thresholds;
pub mod verdict;

pub use crossover::{detect_sign_changes, histogram_crossovers, pair_crossovers, CrossDirection};
pub use thresholds::{band_break_marker, middle_cross_marker, rsi_marker};
pub use verdict::{trading_signal_markers, verdict_marker, Verdict};

use tracing::debug;

use crate::data::IndicatorSummary;
use crate::domain::{CanonicalSeries, Marker, SignalSource};
use crate::indicators::{BollingerSeries, MacdSeries, MovingAverage, RsiThresholds};

/// Everything marker detection reads, borrowed from a computed data set.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInputs<'a> {
    pub series: &'a CanonicalSeries,
    pub moving_averages: &'a [MovingAverage],
    pub macd: &'a MacdSeries,
    pub bollinger: &'a BollingerSeries,
    pub summary: &'a IndicatorSummary,
}

/// Runs every marker rule over one computed indicator set.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverDetector {
    pub rsi: RsiThresholds,
    /// MA periods compared for MA crossovers, `(fast, slow)`.
    pub ma_cross: Option<(usize, usize)>,
}

impl Default for CrossoverDetector {
    fn default() -> Self {
        Self {
            rsi: RsiThresholds::default(),
            ma_cross: Some((5, 10)),
        }
    }
}

impl CrossoverDetector {
    pub fn new(rsi: RsiThresholds, ma_cross: Option<(usize, usize)>) -> Self {
        Self { rsi, ma_cross }
    }

    /// All markers, ordered by time. Markers on the same bar keep rule order.
    pub fn detect(&self, inputs: &MarkerInputs<'_>) -> Vec<Marker> {
        let series = inputs.series;
        if series.is_empty() {
            return Vec::new();
        }
        let summary = inputs.summary;
        let mut markers = histogram_crossovers(&inputs.macd.histogram, SignalSource::Macd);

        if let Some((fast, slow)) = self.ma_cross {
            let line = |period: usize| {
                inputs
                    .moving_averages
                    .iter()
                    .find(|ma| ma.period == period)
                    .map(|ma| ma.points.as_slice())
            };
            if let (Some(f), Some(s)) = (line(fast), line(slow)) {
                markers.extend(pair_crossovers(f, s, SignalSource::MovingAverage { fast, slow }));
            }
        }

        if let Some(rsi) = summary.rsi_latest() {
            markers.extend(rsi_marker(series, rsi, &self.rsi));
        }

        // computed bands win; the upstream snapshot covers short histories
        let bands = inputs.bollinger.latest().or_else(|| summary.bollinger_latest());
        if let Some(bands) = bands {
            markers.extend(band_break_marker(series, &bands));
            let middles = &inputs.bollinger.middle;
            let (prev_mid, last_mid) = match middles.len() {
                n if n >= 2 => (middles[n - 2].value, middles[n - 1].value),
                _ => (bands.middle, bands.middle),
            };
            markers.extend(middle_cross_marker(series, prev_mid, last_mid));
        }

        markers.extend(trading_signal_markers(series, &summary.trading_signals));
        if let Some(signal_type) = summary.signal_type.as_deref() {
            markers.extend(verdict_marker(series, signal_type));
        }

        markers.sort_by_key(|m| m.time.sort_key());
        debug!(count = markers.len(), "markers detected");
        markers
    }
}
