//! Markers from upstream verdicts: the summary's overall `signal_type` and
//! its recent `trading_signals` list.

use serde::{Deserialize, Serialize};

use crate::data::TradingSignal;
use crate::domain::{CanonicalSeries, Marker, MarkerKind, SignalSource};

/// Magnitude of the overall verdict marker on the latest bar.
pub const VERDICT_MAGNITUDE: f64 = 2.0;
/// Magnitude of each `trading_signals` marker.
pub const TRADING_SIGNAL_MAGNITUDE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Read a free-form verdict in English or the source locale.
    /// Unknown text is `Hold`.
    pub fn parse(text: &str) -> Self {
        let compact: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        if compact.contains("strongbuy") || compact.contains("强烈买入") {
            Verdict::StrongBuy
        } else if compact.contains("strongsell") || compact.contains("强烈卖出") {
            Verdict::StrongSell
        } else if compact.contains("sell") || compact.contains("卖出") {
            Verdict::Sell
        } else if compact.contains("buy") || compact.contains("买入") {
            Verdict::Buy
        } else {
            Verdict::Hold
        }
    }

    pub fn marker_kind(&self) -> Option<MarkerKind> {
        match self {
            Verdict::StrongBuy => Some(MarkerKind::StrongBuy),
            Verdict::Buy => Some(MarkerKind::Buy),
            Verdict::Hold => None,
            Verdict::Sell => Some(MarkerKind::Sell),
            Verdict::StrongSell => Some(MarkerKind::StrongSell),
        }
    }
}

/// Overall verdict on the latest bar. Hold produces nothing.
pub fn verdict_marker(series: &CanonicalSeries, signal_type: &str) -> Option<Marker> {
    let last = series.last()?;
    let kind = Verdict::parse(signal_type).marker_kind()?;
    Some(Marker::new(last.time, kind, SignalSource::Verdict).with_magnitude(VERDICT_MAGNITUDE))
}

/// One marker per actionable entry, oldest entry on the earliest bar.
///
/// Entry `i` of `L` lands on bar `len - L + i` (clamped to the first bar);
/// entries beyond the series length are skipped.
pub fn trading_signal_markers(series: &CanonicalSeries, signals: &[TradingSignal]) -> Vec<Marker> {
    let n = series.len();
    let total = signals.len();
    signals
        .iter()
        .enumerate()
        .take_while(|(i, _)| *i < n)
        .filter_map(|(i, signal)| {
            let kind = Verdict::parse(signal.kind.as_deref()?).marker_kind()?;
            let bar = series.get((n + i).saturating_sub(total))?;
            Some(Marker::new(bar.time, kind, SignalSource::Verdict).with_magnitude(TRADING_SIGNAL_MAGNITUDE))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarkerSide;
    use crate::indicators::make_series;

    fn signal(kind: &str) -> TradingSignal {
        TradingSignal {
            kind: Some(kind.to_string()),
            reason: None,
        }
    }

    #[test]
    fn parses_english_and_source_locale() {
        assert_eq!(Verdict::parse("Strong Buy"), Verdict::StrongBuy);
        assert_eq!(Verdict::parse("strong_sell"), Verdict::StrongSell);
        assert_eq!(Verdict::parse("SELL"), Verdict::Sell);
        assert_eq!(Verdict::parse("buy"), Verdict::Buy);
        assert_eq!(Verdict::parse("hold"), Verdict::Hold);
        assert_eq!(Verdict::parse("强烈买入"), Verdict::StrongBuy);
        assert_eq!(Verdict::parse("强烈卖出"), Verdict::StrongSell);
        assert_eq!(Verdict::parse("建议卖出"), Verdict::Sell);
        assert_eq!(Verdict::parse("买入"), Verdict::Buy);
        assert_eq!(Verdict::parse("持有"), Verdict::Hold);
    }

    #[test]
    fn verdict_marks_latest_bar_large() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let m = verdict_marker(&series, "strong buy").unwrap();
        assert_eq!(m.kind, MarkerKind::StrongBuy);
        assert_eq!(m.side, MarkerSide::Below);
        assert_eq!(m.magnitude, 2.0);
        assert_eq!(m.time, series.last().unwrap().time);
        assert!(verdict_marker(&series, "hold").is_none());
        assert!(verdict_marker(&CanonicalSeries::empty(), "buy").is_none());
    }

    #[test]
    fn trading_signals_fill_the_tail() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0]);
        let markers = trading_signal_markers(&series, &[signal("buy"), signal("hold"), signal("sell")]);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].time, series.bars()[1].time);
        assert_eq!(markers[0].kind, MarkerKind::Buy);
        assert_eq!(markers[1].time, series.bars()[3].time);
        assert_eq!(markers[1].kind, MarkerKind::Sell);
        assert_eq!(markers[1].side, MarkerSide::Above);
        assert_eq!(markers[1].magnitude, 1.2);
    }

    #[test]
    fn more_signals_than_bars_clamp_to_first_bar() {
        let series = make_series(&[1.0, 2.0]);
        let markers = trading_signal_markers(&series, &[signal("buy"), signal("buy"), signal("sell")]);
        // only the first two entries fit; both land on bar 0
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.time == series.bars()[0].time));
    }
}
