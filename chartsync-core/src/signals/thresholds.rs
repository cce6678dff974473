//! Threshold markers on the most recent bar.
//!
//! Unlike crossovers these never scan history: they look at the last bar
//! (and, for the middle band, the one before it) only.

use crate::domain::{CanonicalSeries, Marker, MarkerKind, SignalSource};
use crate::indicators::{classify_rsi, BandSnapshot, RsiState, RsiThresholds};

/// Overbought/oversold marker for the latest RSI reading.
pub fn rsi_marker(series: &CanonicalSeries, rsi: f64, thresholds: &RsiThresholds) -> Option<Marker> {
    let last = series.last()?;
    let kind = match classify_rsi(rsi, thresholds) {
        RsiState::Oversold => MarkerKind::Oversold,
        RsiState::Overbought => MarkerKind::Overbought,
        RsiState::Neutral => return None,
    };
    Some(Marker::new(last.time, kind, SignalSource::Rsi { value: rsi }))
}

/// Latest close outside the outer bands.
pub fn band_break_marker(series: &CanonicalSeries, bands: &BandSnapshot) -> Option<Marker> {
    let last = series.last()?;
    let kind = if last.close > bands.upper {
        MarkerKind::BandBreakUpper
    } else if last.close < bands.lower {
        MarkerKind::BandBreakLower
    } else {
        return None;
    };
    Some(Marker::new(last.time, kind, SignalSource::Bollinger))
}

/// Close crossing the middle band between the last two bars.
///
/// `previous_middle` / `latest_middle` are the band values at those two bars;
/// pass the same value twice when only a single (upstream) middle is known.
/// Touching the band on the earlier bar still counts as coming from that side.
pub fn middle_cross_marker(
    series: &CanonicalSeries,
    previous_middle: f64,
    latest_middle: f64,
) -> Option<Marker> {
    let n = series.len();
    if n < 2 {
        return None;
    }
    let prev = series.get(n - 2)?.close;
    let last = series.get(n - 1)?;
    let kind = if prev <= previous_middle && last.close > latest_middle {
        MarkerKind::MiddleBandCrossUp
    } else if prev >= previous_middle && last.close < latest_middle {
        MarkerKind::MiddleBandCrossDown
    } else {
        return None;
    };
    Some(Marker::new(last.time, kind, SignalSource::Bollinger))
}
