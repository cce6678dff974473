//! RSI classification.
//!
//! RSI arrives precomputed in the upstream summary. It is only classified
//! against thresholds here, never recomputed from closes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiState {
    Oversold,
    Neutral,
    Overbought,
}

/// Strict comparisons: exactly 30 or 70 is neutral. NaN is neutral.
pub fn classify_rsi(latest: f64, thresholds: &RsiThresholds) -> RsiState {
    if latest < thresholds.oversold {
        RsiState::Oversold
    } else if latest > thresholds.overbought {
        RsiState::Overbought
    } else {
        RsiState::Neutral
    }
}
