//! Chart configuration, loadable from TOML.
//!
//! Every section is optional; missing keys take the defaults below.
//!
//! ```toml
//! [indicators]
//! ma_periods = [5, 10, 20]
//! ma_cross = [5, 10]
//!
//! [indicators.macd]
//! fast = 12
//! slow = 26
//! signal = 9
//!
//! [rsi]
//! oversold = 30.0
//! overbought = 70.0
//!
//! [palette]
//! polarity = "up_red"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::{CrosshairResolver, LifecycleConfig, Palette};
use crate::error::ConfigError;
use crate::indicators::{BollingerParams, MacdParams, RsiThresholds, DEFAULT_MA_PERIODS};
use crate::signals::CrossoverDetector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma_periods: Vec<usize>,
    /// `(fast, slow)` MA pair checked for crossovers; both must be in `ma_periods`.
    pub ma_cross: Option<(usize, usize)>,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_periods: DEFAULT_MA_PERIODS.to_vec(),
            ma_cross: Some((5, 10)),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairConfig {
    pub tolerance_secs: i64,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        Self {
            tolerance_secs: crate::chart::crosshair::DEFAULT_TOLERANCE_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub indicators: IndicatorConfig,
    pub rsi: RsiThresholds,
    pub crosshair: CrosshairConfig,
    pub lifecycle: LifecycleConfig,
    pub palette: Palette,
}

impl ChartConfig {
    /// Parse and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.ma_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::invalid("indicators.ma_periods", "periods must be at least 1"));
        }
        if let Some((fast, slow)) = ind.ma_cross {
            if fast >= slow {
                return Err(ConfigError::invalid(
                    "indicators.ma_cross",
                    format!("fast period {fast} must be below slow period {slow}"),
                ));
            }
            if let Some(missing) = [fast, slow].into_iter().find(|p| !ind.ma_periods.contains(p)) {
                return Err(ConfigError::invalid(
                    "indicators.ma_cross",
                    format!("period {missing} is not one of ma_periods"),
                ));
            }
        }

        let MacdParams { fast, slow, signal } = ind.macd;
        if fast == 0 || slow == 0 || signal == 0 {
            return Err(ConfigError::invalid("indicators.macd", "periods must be at least 1"));
        }
        if fast >= slow {
            return Err(ConfigError::invalid(
                "indicators.macd",
                format!("fast period {fast} must be below slow period {slow}"),
            ));
        }

        if ind.bollinger.period == 0 {
            return Err(ConfigError::invalid("indicators.bollinger.period", "must be at least 1"));
        }
        if !(ind.bollinger.multiplier > 0.0) || !ind.bollinger.multiplier.is_finite() {
            return Err(ConfigError::invalid(
                "indicators.bollinger.multiplier",
                "must be a positive number",
            ));
        }

        if !(self.rsi.oversold < self.rsi.overbought) {
            return Err(ConfigError::invalid(
                "rsi",
                format!(
                    "oversold ({}) must be below overbought ({})",
                    self.rsi.oversold, self.rsi.overbought
                ),
            ));
        }

        if self.crosshair.tolerance_secs <= 0 {
            return Err(ConfigError::invalid("crosshair.tolerance_secs", "must be positive"));
        }

        if self.lifecycle.max_attempts == 0 {
            return Err(ConfigError::invalid("lifecycle.max_attempts", "must be at least 1"));
        }
        Ok(())
    }

    pub fn crosshair_resolver(&self) -> CrosshairResolver {
        CrosshairResolver::new(self.crosshair.tolerance_secs)
    }

    pub fn crossover_detector(&self) -> CrossoverDetector {
        CrossoverDetector::new(self.rsi, self.indicators.ma_cross)
    }
}
