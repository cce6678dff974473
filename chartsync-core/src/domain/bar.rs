//! Bar: the fundamental chart sample.

use serde::{Deserialize, Serialize};

use super::TimeKey;

/// OHLCV sample keyed by a normalized time.
///
/// Open/high/low/close are finite and volume is non-negative for every bar the
/// normalizer emits. The high/low envelope is checked by [`Bar::is_sane`] but
/// never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: TimeKey,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// True if every price is finite and volume is a finite non-negative number.
    pub fn is_valid(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.volume >= 0.0
    }

    /// Envelope check: high >= max(open, close), low <= min(open, close).
    pub fn is_sane(&self) -> bool {
        self.is_valid()
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }

    /// Up bars (close >= open) take the "up" color.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
