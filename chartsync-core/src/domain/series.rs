//! Canonical bar sequence and the point types derived from it.

use serde::{Deserialize, Serialize};

use super::{Bar, TimeEncoding, TimeKey};

/// Ordered, deduplicated bar sequence owned by one pane/period.
///
/// Constructed only by the normalizer (or from bars that already satisfy the
/// ordering invariant) and never patched in place. Serializes as a plain bar
/// array; deserializing re-checks the ordering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct CanonicalSeries {
    bars: Vec<Bar>,
    encoding: Option<TimeEncoding>,
}

impl CanonicalSeries {
    /// Wrap bars that are already strictly time-ascending in a single encoding.
    ///
    /// Returns `None` when the ordering or encoding invariant is violated.
    pub fn from_sorted(bars: Vec<Bar>) -> Option<Self> {
        let encoding = bars.first().map(|b| b.time.encoding());
        let uniform = bars.iter().all(|b| Some(b.time.encoding()) == encoding);
        let ascending = bars
            .windows(2)
            .all(|w| w[0].time.sort_key() < w[1].time.sort_key());
        (uniform && ascending).then_some(Self { bars, encoding })
    }

    pub(crate) fn from_parts_unchecked(bars: Vec<Bar>, encoding: Option<TimeEncoding>) -> Self {
        Self { bars, encoding }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Encoding shared by every bar; `None` for an empty series.
    pub fn encoding(&self) -> Option<TimeEncoding> {
        self.encoding
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn times(&self) -> Vec<TimeKey> {
        self.bars.iter().map(|b| b.time).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bars are not strictly ascending in a single time encoding")]
pub struct UnorderedBars;

impl TryFrom<Vec<Bar>> for CanonicalSeries {
    type Error = UnorderedBars;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::from_sorted(bars).ok_or(UnorderedBars)
    }
}

impl From<CanonicalSeries> for Vec<Bar> {
    fn from(series: CanonicalSeries) -> Self {
        series.bars
    }
}

/// One value of a derived line, on the series time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub time: TimeKey,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn new(time: TimeKey, value: f64) -> Self {
        Self { time, value }
    }
}

/// A derived line: a time-aligned suffix of the canonical series.
pub type LineSeries = Vec<IndicatorPoint>;

/// Histogram bar with its display color (volume, MACD histogram).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub time: TimeKey,
    pub value: f64,
    pub color: String,
}
