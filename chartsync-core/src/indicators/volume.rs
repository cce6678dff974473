//! Volume histogram for the volume pane.

use crate::chart::Palette;
use crate::domain::{CanonicalSeries, HistogramPoint};

/// One bar per candle, colored by the candle's up/down polarity.
pub fn volume_histogram(series: &CanonicalSeries, palette: &Palette) -> Vec<HistogramPoint> {
    series
        .bars()
        .iter()
        .map(|bar| HistogramPoint {
            time: bar.time,
            value: bar.volume,
            color: palette.bar_color(bar).to_string(),
        })
        .collect()
}
