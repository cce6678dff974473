//! Chart data set assembly and the session that draws it.
//!
//! A [`ChartDataSet`] is the unit of replacement: bars, every derived line
//! and the markers are built together by [`ChartDataSet::build`] and can't be
//! patched afterwards. A [`ChartSession`] owns the per-chart state (readiness
//! guard, viewport coordinator, crosshair overlay) and swaps whole data sets.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::crosshair::{CrosshairOverlay, CrosshairResolver, CrosshairSample, PointerEvent, ViewportGeometry};
use super::lifecycle::{ChartLifecycleGuard, PollOutcome, Sleeper, SurfaceProbe};
use super::palette::Palette;
use super::renderer::{MarkerSpec, Renderer, RendererSink, SeriesId};
use super::viewport::{PaneId, SyncOutcome, ViewportRange, ViewportSyncCoordinator};
use crate::config::ChartConfig;
use crate::data::{BarNormalizer, IndicatorSummary, NormalizeReport, Period, RawRecord};
use crate::domain::{CanonicalSeries, HistogramPoint, IndicatorPoint, Marker};
use crate::error::ChartError;
use crate::indicators::{
    bollinger, macd, moving_averages, volume_histogram, BandSnapshot, BollingerSeries, MacdSeries,
    MovingAverage,
};
use crate::signals::MarkerInputs;

/// Everything one chart shows for one (instrument, period) selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataSet {
    period: Period,
    series: CanonicalSeries,
    report: NormalizeReport,
    moving_averages: Vec<MovingAverage>,
    macd: MacdSeries,
    bollinger: BollingerSeries,
    volume: Vec<HistogramPoint>,
    macd_histogram: Vec<HistogramPoint>,
    markers: Vec<Marker>,
    summary: IndicatorSummary,
    palette: Palette,
}

impl ChartDataSet {
    /// Normalize `records` and derive every indicator and marker.
    pub fn build(
        records: &[RawRecord],
        summary: IndicatorSummary,
        period: Period,
        config: &ChartConfig,
    ) -> Self {
        let (series, report) = BarNormalizer::normalize_with_report(records, period.normalize_options());
        Self::assemble(series, report, summary, period, config)
    }

    /// Same as [`build`](Self::build) for bars that are already canonical.
    pub fn from_series(
        series: CanonicalSeries,
        summary: IndicatorSummary,
        period: Period,
        config: &ChartConfig,
    ) -> Self {
        let report = NormalizeReport {
            input: series.len(),
            output: series.len(),
            ..Default::default()
        };
        Self::assemble(series, report, summary, period, config)
    }

    fn assemble(
        series: CanonicalSeries,
        report: NormalizeReport,
        summary: IndicatorSummary,
        period: Period,
        config: &ChartConfig,
    ) -> Self {
        let ind = &config.indicators;
        let palette = config.palette.clone();

        let moving_averages = moving_averages(&series, &ind.ma_periods);
        let macd = macd(&series, ind.macd);
        let bollinger = bollinger(&series, ind.bollinger);
        let volume = volume_histogram(&series, &palette);
        let macd_histogram = macd.colored_histogram(&palette);

        let markers = config.crossover_detector().detect(&MarkerInputs {
            series: &series,
            moving_averages: &moving_averages,
            macd: &macd,
            bollinger: &bollinger,
            summary: &summary,
        });

        debug!(
            %period,
            bars = series.len(),
            macd_points = macd.len(),
            band_points = bollinger.len(),
            markers = markers.len(),
            "chart data set built"
        );

        Self {
            period,
            series,
            report,
            moving_averages,
            macd,
            bollinger,
            volume,
            macd_histogram,
            markers,
            summary,
            palette,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn series(&self) -> &CanonicalSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    pub fn moving_averages(&self) -> &[MovingAverage] {
        &self.moving_averages
    }

    pub fn macd(&self) -> &MacdSeries {
        &self.macd
    }

    pub fn bollinger(&self) -> &BollingerSeries {
        &self.bollinger
    }

    pub fn volume(&self) -> &[HistogramPoint] {
        &self.volume
    }

    pub fn macd_histogram(&self) -> &[HistogramPoint] {
        &self.macd_histogram
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn summary(&self) -> &IndicatorSummary {
        &self.summary
    }

    /// Latest bands to display: computed when history allows, otherwise the
    /// upstream snapshot.
    pub fn display_bands(&self) -> Option<BandSnapshot> {
        self.bollinger
            .latest()
            .or_else(|| self.summary.bollinger_latest())
    }

    /// Emit the whole data set. Returns the candlestick series handle.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<SeriesId, ChartError> {
        let palette = &self.palette;
        let price = PaneId::Price;

        let candles = renderer.add_candlestick_series(&price, self.series.bars(), palette)?;
        for (i, ma) in self.moving_averages.iter().enumerate() {
            if !ma.points.is_empty() {
                renderer.add_line_series(&price, &ma.name(), palette.ma_color(i), &ma.points)?;
            }
        }
        for (name, line) in self.band_lines() {
            renderer.add_line_series(&price, name, &palette.bollinger, &line)?;
        }
        let specs: Vec<MarkerSpec> = self
            .markers
            .iter()
            .map(|m| MarkerSpec::from_marker(m, palette))
            .collect();
        renderer.set_markers(candles, &specs)?;

        renderer.add_histogram_series(&PaneId::Volume, "volume", &self.volume)?;

        if !self.macd.is_empty() {
            let osc = PaneId::Oscillator;
            renderer.add_line_series(&osc, "MACD", &palette.macd_line, &self.macd.macd)?;
            renderer.add_line_series(&osc, "Signal", &palette.signal_line, &self.macd.signal)?;
            renderer.add_histogram_series(&osc, "MACD histogram", &self.macd_histogram)?;
        }
        Ok(candles)
    }

    /// Computed band lines, or single-point lines on the last bar seeded from
    /// the upstream snapshot when the series is too short.
    fn band_lines(&self) -> Vec<(&'static str, Vec<IndicatorPoint>)> {
        if !self.bollinger.is_empty() {
            return vec![
                ("BOLL upper", self.bollinger.upper.clone()),
                ("BOLL middle", self.bollinger.middle.clone()),
                ("BOLL lower", self.bollinger.lower.clone()),
            ];
        }
        match (self.series.last(), self.summary.bollinger_latest()) {
            (Some(last), Some(snap)) => vec![
                ("BOLL upper", vec![IndicatorPoint::new(last.time, snap.upper)]),
                ("BOLL middle", vec![IndicatorPoint::new(last.time, snap.middle)]),
                ("BOLL lower", vec![IndicatorPoint::new(last.time, snap.lower)]),
            ],
            _ => Vec::new(),
        }
    }
}

/// Per-chart state across data set replacements.
#[derive(Debug)]
pub struct ChartSession {
    guard: ChartLifecycleGuard,
    viewport: ViewportSyncCoordinator,
    crosshair: CrosshairResolver,
    overlay: CrosshairOverlay,
    pending: Option<ChartDataSet>,
    current: Option<ChartDataSet>,
    generation: u64,
}

impl ChartSession {
    pub fn new(config: &ChartConfig) -> Self {
        let viewport = ViewportSyncCoordinator::standard();
        let surfaces = std::iter::once(viewport.primary().clone())
            .chain(viewport.siblings().cloned())
            .collect::<Vec<_>>();
        Self {
            guard: ChartLifecycleGuard::new(config.lifecycle, surfaces),
            viewport,
            crosshair: config.crosshair_resolver(),
            overlay: CrosshairOverlay::Hidden,
            pending: None,
            current: None,
            generation: 0,
        }
    }

    /// Start a new construction. Supersedes both the drawn data set and any
    /// construction still waiting on its surfaces.
    pub fn begin(&mut self, data: ChartDataSet) -> u64 {
        self.generation += 1;
        self.pending = Some(data);
        self.current = None;
        self.guard.reset();
        self.viewport.reset();
        self.overlay.hide();
        self.generation
    }

    /// One readiness check; renders the pending data set once surfaces are up.
    pub fn advance(
        &mut self,
        probe: &dyn SurfaceProbe,
        renderer: &mut dyn Renderer,
    ) -> Result<PollOutcome, ChartError> {
        if self.pending.is_none() {
            return Ok(PollOutcome::Ready);
        }
        let outcome = self.guard.poll(probe)?;
        if outcome == PollOutcome::Ready {
            self.finish(renderer)?;
        }
        Ok(outcome)
    }

    /// [`begin`](Self::begin), wait for the surfaces, render, fit.
    ///
    /// Returns the fitted range, or `None` for an empty data set.
    pub fn construct(
        &mut self,
        data: ChartDataSet,
        probe: &dyn SurfaceProbe,
        sleeper: &mut dyn Sleeper,
        renderer: &mut dyn Renderer,
    ) -> Result<Option<ViewportRange>, ChartError> {
        self.begin(data);
        self.guard.wait_until_ready(probe, sleeper)?;
        self.finish(renderer)
    }

    fn finish(&mut self, renderer: &mut dyn Renderer) -> Result<Option<ViewportRange>, ChartError> {
        let Some(data) = self.pending.take() else {
            return Ok(None);
        };
        renderer.clear();
        if let Err(err) = data.render(renderer) {
            renderer.clear();
            return Err(err);
        }
        let fitted = self.viewport.fit_primary(data.len(), &mut RendererSink(renderer));
        info!(
            generation = self.generation,
            period = %data.period(),
            bars = data.len(),
            markers = data.markers().len(),
            "chart constructed"
        );
        self.current = Some(data);
        Ok(fitted)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn data(&self) -> Option<&ChartDataSet> {
        self.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn viewport(&self) -> &ViewportSyncCoordinator {
        &self.viewport
    }

    pub fn overlay(&self) -> &CrosshairOverlay {
        &self.overlay
    }

    pub fn attempts(&self) -> u32 {
        self.guard.attempts()
    }

    /// A pane reported a new visible range.
    pub fn on_range_changed(
        &mut self,
        pane: &PaneId,
        range: ViewportRange,
        renderer: &mut dyn Renderer,
    ) -> SyncOutcome {
        self.viewport.on_range_changed(pane, range, &mut RendererSink(renderer))
    }

    /// Resolve the pointer and update the overlay. A miss hides it.
    pub fn on_pointer_move(
        &mut self,
        pointer: &PointerEvent,
        width: Option<f64>,
    ) -> Option<&CrosshairSample> {
        let sample = self.current.as_ref().and_then(|data| {
            let geometry = self
                .viewport
                .range(self.viewport.primary())
                .zip(width)
                .map(|(range, width)| ViewportGeometry { range, width });
            self.crosshair.resolve(data.series(), pointer, geometry.as_ref())
        });
        self.overlay.update(sample);
        self.overlay.sample()
    }

    pub fn on_pointer_leave(&mut self) {
        self.overlay.hide();
    }
}
