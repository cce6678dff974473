//! Domain types for chartsync

pub mod bar;
pub mod marker;
pub mod series;
pub mod time_key;

pub use bar::Bar;
pub use marker::{Marker, MarkerKind, MarkerShape, MarkerSide, SignalSource};
pub use series::{CanonicalSeries, HistogramPoint, IndicatorPoint, LineSeries, UnorderedBars};
pub use time_key::{BusinessDay, TimeEncoding, TimeKey};
