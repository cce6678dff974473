//! Upstream indicator summary.
//!
//! The analysis backend ships a per-period summary next to the bars: latest
//! RSI/MACD values, the latest Bollinger bands, an overall verdict and a list
//! of recent trading signals. Only those fields are read here. Anything else
//! in the payload (chip distribution, fundamentals, backtests) is ignored.

use serde::{Deserialize, Serialize};

use crate::indicators::BandSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    #[serde(default, alias = "MACD")]
    pub macd: Option<LatestValue>,
    #[serde(default, alias = "RSI")]
    pub rsi: Option<LatestValue>,
    #[serde(default, alias = "BOLL")]
    pub bollinger: Option<BollingerSummary>,
    /// Overall verdict, e.g. "strong buy" or "强烈买入".
    #[serde(default)]
    pub signal_type: Option<String>,
    #[serde(default)]
    pub trading_signals: Vec<TradingSignal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestValue {
    #[serde(default)]
    pub latest_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSummary {
    #[serde(default)]
    pub latest_values: Option<BandSnapshot>,
}

/// One entry of the upstream `trading_signals` list, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    #[serde(default, rename = "type", alias = "signal_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl IndicatorSummary {
    /// Parse a summary from JSON. The payload may be the summary itself or
    /// wrap it as `{ "signals": ... }` / `{ "indicators": ... }`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut summary: IndicatorSummary = match value.get("signals") {
            Some(inner) if inner.is_object() => serde_json::from_value(inner.clone())?,
            _ => serde_json::from_value(value.clone())?,
        };
        if let Some(indicators) = value
            .get("signals")
            .unwrap_or(value)
            .get("indicators")
            .filter(|v| v.is_object())
        {
            let nested: IndicatorSummary = serde_json::from_value(indicators.clone())?;
            summary.macd = summary.macd.or(nested.macd);
            summary.rsi = summary.rsi.or(nested.rsi);
            summary.bollinger = summary.bollinger.or(nested.bollinger);
        }
        Ok(summary)
    }

    pub fn rsi_latest(&self) -> Option<f64> {
        self.rsi.and_then(|r| r.latest_value).filter(|v| v.is_finite())
    }

    pub fn bollinger_latest(&self) -> Option<BandSnapshot> {
        self.bollinger
            .and_then(|b| b.latest_values)
            .filter(BandSnapshot::is_finite)
    }
}
