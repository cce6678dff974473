//! Chart-side state: panes, viewport sync, crosshair, readiness, rendering.
//!
//! Nothing here draws pixels. A host implements [`Renderer`] and
//! [`SurfaceProbe`]; the rest is plain state driven by host events.

pub mod crosshair;
pub mod dataset;
pub mod lifecycle;
pub mod palette;
pub mod renderer;
pub mod viewport;

pub use crosshair::{
    CrosshairOverlay, CrosshairReadout, CrosshairResolver, CrosshairSample, PointerEvent,
    PriceDelta, ViewportGeometry, DEFAULT_TOLERANCE_SECS,
};
pub use dataset::{ChartDataSet, ChartSession};
pub use lifecycle::{
    ChartLifecycleGuard, LifecycleConfig, PollOutcome, Sleeper, SurfaceProbe, SurfaceSize,
};
pub use palette::{Palette, Polarity};
pub use renderer::{
    MarkerSpec, RecordedSeries, RecordingRenderer, Renderer, RendererSink, SeriesData, SeriesId,
};
pub use viewport::{NullSink, PaneId, SyncOutcome, ViewportRange, ViewportSink, ViewportSyncCoordinator};
