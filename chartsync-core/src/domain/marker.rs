//! Marker: a discrete annotation derived from indicator events.
//!
//! Markers are recomputed wholesale on every refresh and have no identity of
//! their own. The kind enum is closed so every consumer handles every case.

use serde::{Deserialize, Serialize};

use super::TimeKey;

/// What happened at the marked bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Upward crossing (histogram turns positive, fast MA rises through slow).
    GoldenCross,
    /// Downward crossing.
    DeathCross,
    Overbought,
    Oversold,
    /// Close above the upper Bollinger band.
    BandBreakUpper,
    /// Close below the lower Bollinger band.
    BandBreakLower,
    MiddleBandCrossUp,
    MiddleBandCrossDown,
    Buy,
    StrongBuy,
    Sell,
    StrongSell,
}

impl MarkerKind {
    /// Bullish kinds annotate below the bar, bearish kinds above it.
    pub fn is_bullish(&self) -> bool {
        match self {
            MarkerKind::GoldenCross
            | MarkerKind::Oversold
            | MarkerKind::BandBreakUpper
            | MarkerKind::MiddleBandCrossUp
            | MarkerKind::Buy
            | MarkerKind::StrongBuy => true,
            MarkerKind::DeathCross
            | MarkerKind::Overbought
            | MarkerKind::BandBreakLower
            | MarkerKind::MiddleBandCrossDown
            | MarkerKind::Sell
            | MarkerKind::StrongSell => false,
        }
    }

    pub fn side(&self) -> MarkerSide {
        if self.is_bullish() {
            MarkerSide::Below
        } else {
            MarkerSide::Above
        }
    }

    /// Relative size hint for the renderer.
    pub fn default_magnitude(&self) -> f64 {
        match self {
            MarkerKind::GoldenCross | MarkerKind::DeathCross => 1.5,
            MarkerKind::Overbought | MarkerKind::Oversold => 1.3,
            MarkerKind::BandBreakUpper | MarkerKind::BandBreakLower => 1.4,
            MarkerKind::MiddleBandCrossUp | MarkerKind::MiddleBandCrossDown => 1.1,
            MarkerKind::Buy | MarkerKind::Sell => 1.2,
            MarkerKind::StrongBuy | MarkerKind::StrongSell => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSide {
    Above,
    Below,
}

/// Computation that produced a marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalSource {
    Macd,
    MovingAverage { fast: usize, slow: usize },
    Rsi { value: f64 },
    Bollinger,
    /// Upstream verdict (summary `signal_type` or `trading_signals`).
    Verdict,
}

/// Renderer shape hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
    Circle,
    Square,
    TriangleUp,
    TriangleDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub time: TimeKey,
    pub kind: MarkerKind,
    pub side: MarkerSide,
    pub magnitude: f64,
    pub source: SignalSource,
}

impl Marker {
    /// Marker with the kind's default side and magnitude.
    pub fn new(time: TimeKey, kind: MarkerKind, source: SignalSource) -> Self {
        Self {
            time,
            kind,
            side: kind.side(),
            magnitude: kind.default_magnitude(),
            source,
        }
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn shape(&self) -> MarkerShape {
        match (self.source, self.kind.is_bullish()) {
            (SignalSource::Macd, _) | (SignalSource::Bollinger, _)
                if matches!(
                    self.kind,
                    MarkerKind::GoldenCross
                        | MarkerKind::DeathCross
                        | MarkerKind::MiddleBandCrossUp
                        | MarkerKind::MiddleBandCrossDown
                ) =>
            {
                MarkerShape::Circle
            }
            (SignalSource::Rsi { .. }, _) => MarkerShape::Square,
            (SignalSource::MovingAverage { .. }, true) => MarkerShape::TriangleUp,
            (SignalSource::MovingAverage { .. }, false) => MarkerShape::TriangleDown,
            (_, true) => MarkerShape::ArrowUp,
            (_, false) => MarkerShape::ArrowDown,
        }
    }

    /// Short caption shown next to the marker.
    pub fn label(&self) -> String {
        match (self.source, self.kind) {
            (SignalSource::Macd, MarkerKind::GoldenCross) => "MACD golden cross".to_string(),
            (SignalSource::Macd, MarkerKind::DeathCross) => "MACD death cross".to_string(),
            (SignalSource::MovingAverage { fast, slow }, MarkerKind::GoldenCross) => {
                format!("MA{fast} crosses above MA{slow}")
            }
            (SignalSource::MovingAverage { fast, slow }, MarkerKind::DeathCross) => {
                format!("MA{fast} crosses below MA{slow}")
            }
            (SignalSource::Rsi { value }, MarkerKind::Oversold) => format!("RSI oversold {value:.1}"),
            (SignalSource::Rsi { value }, MarkerKind::Overbought) => {
                format!("RSI overbought {value:.1}")
            }
            (_, MarkerKind::BandBreakUpper) => "Upper band break".to_string(),
            (_, MarkerKind::BandBreakLower) => "Lower band break".to_string(),
            (_, MarkerKind::MiddleBandCrossUp) => "Crosses above middle band".to_string(),
            (_, MarkerKind::MiddleBandCrossDown) => "Crosses below middle band".to_string(),
            (_, MarkerKind::StrongBuy) => "Strong buy".to_string(),
            (_, MarkerKind::Buy) => "Buy".to_string(),
            (_, MarkerKind::StrongSell) => "Strong sell".to_string(),
            (_, MarkerKind::Sell) => "Sell".to_string(),
            (_, kind) => format!("{kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> TimeKey {
        TimeKey::Timestamp(0)
    }

    #[test]
    fn bullish_markers_sit_below_the_bar() {
        assert_eq!(MarkerKind::GoldenCross.side(), MarkerSide::Below);
        assert_eq!(MarkerKind::Oversold.side(), MarkerSide::Below);
        assert_eq!(MarkerKind::BandBreakUpper.side(), MarkerSide::Below);
        assert_eq!(MarkerKind::DeathCross.side(), MarkerSide::Above);
        assert_eq!(MarkerKind::Overbought.side(), MarkerSide::Above);
        assert_eq!(MarkerKind::BandBreakLower.side(), MarkerSide::Above);
    }

    #[test]
    fn shapes_follow_source() {
        let macd = Marker::new(t(), MarkerKind::GoldenCross, SignalSource::Macd);
        assert_eq!(macd.shape(), MarkerShape::Circle);

        let ma = Marker::new(t(), MarkerKind::DeathCross, SignalSource::MovingAverage { fast: 5, slow: 10 });
        assert_eq!(ma.shape(), MarkerShape::TriangleDown);

        let rsi = Marker::new(t(), MarkerKind::Oversold, SignalSource::Rsi { value: 25.0 });
        assert_eq!(rsi.shape(), MarkerShape::Square);

        let band = Marker::new(t(), MarkerKind::BandBreakLower, SignalSource::Bollinger);
        assert_eq!(band.shape(), MarkerShape::ArrowDown);
    }

    #[test]
    fn labels_name_their_inputs() {
        let ma = Marker::new(t(), MarkerKind::GoldenCross, SignalSource::MovingAverage { fast: 5, slow: 10 });
        assert_eq!(ma.label(), "MA5 crosses above MA10");

        let rsi = Marker::new(t(), MarkerKind::Overbought, SignalSource::Rsi { value: 72.34 });
        assert_eq!(rsi.label(), "RSI overbought 72.3");
    }

    #[test]
    fn with_magnitude_overrides_default() {
        let m = Marker::new(t(), MarkerKind::Buy, SignalSource::Verdict).with_magnitude(2.0);
        assert_eq!(m.magnitude, 2.0);
        assert_eq!(m.side, MarkerSide::Below);
    }
}
