//! Pointer → bar resolution for the crosshair overlay.
//!
//! The renderer reports the pointer time in the series' own encoding when it
//! can, and only a pixel x-coordinate when it can't. Resolution tries, in
//! order: timestamp within tolerance, identical business day, then position
//! across the visible logical range. A miss is not an error; the overlay
//! just hides.

use serde::{Deserialize, Serialize};

use super::viewport::ViewportRange;
use crate::domain::{Bar, CanonicalSeries, TimeKey};

/// Default tolerance for timestamp matching, in seconds (exclusive).
pub const DEFAULT_TOLERANCE_SECS: i64 = 3600;

/// What the renderer tells us about the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub time: Option<TimeKey>,
    /// Pixel x-coordinate within the pane.
    pub x: Option<f64>,
}

/// Viewport geometry needed for the positional fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    pub range: ViewportRange,
    /// Pane width in pixels.
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceDelta {
    pub change: f64,
    pub change_percent: f64,
}

impl PriceDelta {
    fn between(previous: Option<&Bar>, current: &Bar) -> Self {
        match previous {
            Some(prev) if prev.close != 0.0 => {
                let change = current.close - prev.close;
                Self {
                    change,
                    change_percent: change / prev.close * 100.0,
                }
            }
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairSample {
    pub index: usize,
    pub bar: Bar,
    pub previous_bar: Option<Bar>,
    pub delta: PriceDelta,
}

impl CrosshairSample {
    pub fn date_label(&self) -> String {
        self.bar.time.date_label()
    }

    /// Display strings for the overlay panel.
    pub fn readout(&self) -> CrosshairReadout {
        CrosshairReadout {
            date: self.date_label(),
            open: format!("{:.2}", self.bar.open),
            high: format!("{:.2}", self.bar.high),
            low: format!("{:.2}", self.bar.low),
            close: format!("{:.2}", self.bar.close),
            // source locale counts volume in units of 10,000
            volume: format!("{:.0}万", self.bar.volume / 10_000.0),
            change: format!("{:.2}", self.delta.change),
            change_percent: format!("{:.2}%", self.delta.change_percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosshairReadout {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub change: String,
    pub change_percent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairResolver {
    pub tolerance_secs: i64,
}

impl Default for CrosshairResolver {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }
}

impl CrosshairResolver {
    pub fn new(tolerance_secs: i64) -> Self {
        Self { tolerance_secs }
    }

    /// Index of the bar under the pointer, if any.
    pub fn resolve_index(
        &self,
        series: &CanonicalSeries,
        pointer: &PointerEvent,
        geometry: Option<&ViewportGeometry>,
    ) -> Option<usize> {
        if series.is_empty() {
            return None;
        }
        let by_time = pointer.time.and_then(|t| self.match_time(series, t));
        by_time.or_else(|| {
            let x = pointer.x?;
            positional_index(series.len(), x, geometry?)
        })
    }

    pub fn resolve(
        &self,
        series: &CanonicalSeries,
        pointer: &PointerEvent,
        geometry: Option<&ViewportGeometry>,
    ) -> Option<CrosshairSample> {
        let index = self.resolve_index(series, pointer, geometry)?;
        let bar = *series.get(index)?;
        let previous_bar = index.checked_sub(1).and_then(|i| series.get(i)).copied();
        Some(CrosshairSample {
            index,
            bar,
            previous_bar,
            delta: PriceDelta::between(previous_bar.as_ref(), &bar),
        })
    }

    /// Same-encoding match only: a timestamp never matches a business day.
    fn match_time(&self, series: &CanonicalSeries, pointer: TimeKey) -> Option<usize> {
        match pointer {
            TimeKey::Timestamp(secs) => series.bars().iter().position(|b| match b.time {
                TimeKey::Timestamp(t) => {
                    i64::try_from(t.abs_diff(secs)).map_or(false, |d| d < self.tolerance_secs)
                }
                TimeKey::BusinessDay(_) => false,
            }),
            TimeKey::BusinessDay(day) => series
                .bars()
                .iter()
                .position(|b| b.time.as_business_day() == Some(day)),
        }
    }
}

/// `round(from + x/width * (to - from))`, rejected outside `[0, len)`.
fn positional_index(len: usize, x: f64, geometry: &ViewportGeometry) -> Option<usize> {
    if !(geometry.width > 0.0) || !x.is_finite() {
        return None;
    }
    let range = geometry.range;
    let estimate = (range.from + x / geometry.width * range.span()).round();
    if !estimate.is_finite() || estimate < 0.0 || estimate >= len as f64 {
        return None;
    }
    Some(estimate as usize)
}

/// Overlay state driven by pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "sample", rename_all = "snake_case")]
pub enum CrosshairOverlay {
    #[default]
    Hidden,
    Visible(CrosshairSample),
}

impl CrosshairOverlay {
    /// Apply a resolution result: a hit shows the sample, a miss hides.
    pub fn update(&mut self, sample: Option<CrosshairSample>) {
        *self = match sample {
            Some(s) => CrosshairOverlay::Visible(s),
            None => CrosshairOverlay::Hidden,
        };
    }

    /// Pointer left the chart area.
    pub fn hide(&mut self) {
        *self = CrosshairOverlay::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, CrosshairOverlay::Visible(_))
    }

    pub fn sample(&self) -> Option<&CrosshairSample> {
        match self {
            CrosshairOverlay::Visible(s) => Some(s),
            CrosshairOverlay::Hidden => None,
        }
    }
}
