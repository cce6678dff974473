//! Renderer capability interface.
//!
//! One trait, one adapter per drawing backend. The crate ships
//! [`RecordingRenderer`], which keeps the emitted scene in memory so tests
//! and the CLI can inspect or serialize exactly what a backend would draw.

use serde::{Deserialize, Serialize};

use super::palette::Palette;
use super::viewport::{PaneId, ViewportRange, ViewportSink};
use crate::domain::{Bar, HistogramPoint, IndicatorPoint, Marker, MarkerShape, MarkerSide, TimeKey};
use crate::error::ChartError;

/// Handle to a series created on a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub usize);

/// A marker as the drawing backend sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub time: TimeKey,
    pub position: MarkerSide,
    pub shape: MarkerShape,
    pub text: String,
    pub size: f64,
    pub color: String,
}

impl MarkerSpec {
    /// Bullish markers take the palette's up color, bearish the down color.
    pub fn from_marker(marker: &Marker, palette: &Palette) -> Self {
        let color = if marker.kind.is_bullish() {
            palette.up_color()
        } else {
            palette.down_color()
        };
        Self {
            time: marker.time,
            position: marker.side,
            shape: marker.shape(),
            text: marker.label(),
            size: marker.magnitude,
            color: color.to_string(),
        }
    }
}

pub trait Renderer {
    fn add_candlestick_series(
        &mut self,
        pane: &PaneId,
        bars: &[Bar],
        palette: &Palette,
    ) -> Result<SeriesId, ChartError>;

    fn add_line_series(
        &mut self,
        pane: &PaneId,
        name: &str,
        color: &str,
        points: &[IndicatorPoint],
    ) -> Result<SeriesId, ChartError>;

    fn add_histogram_series(
        &mut self,
        pane: &PaneId,
        name: &str,
        points: &[HistogramPoint],
    ) -> Result<SeriesId, ChartError>;

    /// Replace all markers attached to `series`.
    fn set_markers(&mut self, series: SeriesId, markers: &[MarkerSpec]) -> Result<(), ChartError>;

    fn set_visible_range(&mut self, pane: &PaneId, range: ViewportRange);

    /// Drop every series, for a fresh construction.
    fn clear(&mut self);
}

/// Routes viewport pushes from the coordinator into a renderer.
pub struct RendererSink<'a, R: Renderer + ?Sized>(pub &'a mut R);

impl<R: Renderer + ?Sized> ViewportSink for RendererSink<'_, R> {
    fn apply_range(&mut self, pane: &PaneId, range: ViewportRange) {
        self.0.set_visible_range(pane, range);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeriesData {
    Candlestick { bars: Vec<Bar>, up_color: String, down_color: String },
    Line { color: String, points: Vec<IndicatorPoint> },
    Histogram { points: Vec<HistogramPoint> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSeries {
    pub id: SeriesId,
    pub pane: PaneId,
    pub name: String,
    pub data: SeriesData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerSpec>,
}

/// In-memory scene of everything drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingRenderer {
    pub series: Vec<RecordedSeries>,
    pub ranges: Vec<(PaneId, ViewportRange)>,
    /// Panes that reject new series, to exercise failure paths.
    #[serde(skip)]
    failing: Vec<PaneId>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `add_*` call on `pane` fail.
    pub fn fail_on(mut self, pane: PaneId) -> Self {
        self.failing.push(pane);
        self
    }

    pub fn on_pane<'a>(&'a self, pane: &'a PaneId) -> impl Iterator<Item = &'a RecordedSeries> + 'a {
        self.series.iter().filter(move |s| &s.pane == pane)
    }

    pub fn find(&self, name: &str) -> Option<&RecordedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn range(&self, pane: &PaneId) -> Option<ViewportRange> {
        self.ranges.iter().find(|(p, _)| p == pane).map(|(_, r)| *r)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.series.iter().flat_map(|s| s.markers.iter())
    }

    fn push(&mut self, pane: &PaneId, name: &str, data: SeriesData) -> Result<SeriesId, ChartError> {
        if self.failing.contains(pane) {
            return Err(ChartError::Render {
                pane: pane.clone(),
                message: format!("cannot add series '{name}'"),
            });
        }
        let id = SeriesId(self.series.len());
        self.series.push(RecordedSeries {
            id,
            pane: pane.clone(),
            name: name.to_string(),
            data,
            markers: Vec::new(),
        });
        Ok(id)
    }
}

impl Renderer for RecordingRenderer {
    fn add_candlestick_series(
        &mut self,
        pane: &PaneId,
        bars: &[Bar],
        palette: &Palette,
    ) -> Result<SeriesId, ChartError> {
        let data = SeriesData::Candlestick {
            bars: bars.to_vec(),
            up_color: palette.up_color().to_string(),
            down_color: palette.down_color().to_string(),
        };
        self.push(pane, "candles", data)
    }

    fn add_line_series(
        &mut self,
        pane: &PaneId,
        name: &str,
        color: &str,
        points: &[IndicatorPoint],
    ) -> Result<SeriesId, ChartError> {
        let data = SeriesData::Line {
            color: color.to_string(),
            points: points.to_vec(),
        };
        self.push(pane, name, data)
    }

    fn add_histogram_series(
        &mut self,
        pane: &PaneId,
        name: &str,
        points: &[HistogramPoint],
    ) -> Result<SeriesId, ChartError> {
        self.push(pane, name, SeriesData::Histogram { points: points.to_vec() })
    }

    fn set_markers(&mut self, series: SeriesId, markers: &[MarkerSpec]) -> Result<(), ChartError> {
        let Some(target) = self.series.get_mut(series.0) else {
            return Err(ChartError::Render {
                pane: PaneId::Price,
                message: format!("unknown series {}", series.0),
            });
        };
        target.markers = markers.to_vec();
        Ok(())
    }

    fn set_visible_range(&mut self, pane: &PaneId, range: ViewportRange) {
        match self.ranges.iter_mut().find(|(p, _)| p == pane) {
            Some((_, stored)) => *stored = range,
            None => self.ranges.push((pane.clone(), range)),
        }
    }

    fn clear(&mut self) {
        self.series.clear();
        self.ranges.clear();
    }
}
