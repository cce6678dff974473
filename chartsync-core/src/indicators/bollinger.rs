//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N). First point at index period-1.
//! A full redraw always recomputes all three lines from closes; the
//! [`BandSnapshot`] path exists only to seed overlays from an upstream summary.

use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalSeries, IndicatorPoint, LineSeries};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

/// Latest upper/middle/lower values, either computed or supplied upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BandSnapshot {
    pub fn is_finite(&self) -> bool {
        self.upper.is_finite() && self.middle.is_finite() && self.lower.is_finite()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSeries {
    pub upper: LineSeries,
    pub middle: LineSeries,
    pub lower: LineSeries,
}

impl BollingerSeries {
    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }

    pub fn len(&self) -> usize {
        self.middle.len()
    }

    /// Bands at the last computed point.
    pub fn latest(&self) -> Option<BandSnapshot> {
        Some(BandSnapshot {
            upper: self.upper.last()?.value,
            middle: self.middle.last()?.value,
            lower: self.lower.last()?.value,
        })
    }
}

pub fn bollinger(series: &CanonicalSeries, params: BollingerParams) -> BollingerSeries {
    let BollingerParams { period, multiplier } = params;
    let mut out = BollingerSeries::default();
    if period == 0 || period > series.len() {
        return out;
    }

    let closes = series.closes();
    for (i, window) in closes.windows(period).enumerate() {
        let time = series.bars()[i + period - 1].time;
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let width = multiplier * variance.sqrt();
        out.upper.push(IndicatorPoint::new(time, mean + width));
        out.middle.push(IndicatorPoint::new(time, mean));
        out.lower.push(IndicatorPoint::new(time, mean - width));
    }
    out
}
