//! Chart colors.
//!
//! Which of red/green means "up" is a market convention, not logic: the
//! source locale draws rising candles red. Keep it configurable.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Rising bars red, falling bars green.
    #[default]
    UpRed,
    /// Rising bars green, falling bars red.
    UpGreen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub polarity: Polarity,
    pub red: String,
    pub green: String,
    /// One color per moving-average overlay, cycled when there are more MAs.
    pub ma_lines: Vec<String>,
    pub bollinger: String,
    pub macd_line: String,
    pub signal_line: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            polarity: Polarity::UpRed,
            red: "#ff4976".to_string(),
            green: "#00ff88".to_string(),
            ma_lines: vec![
                "#ffd700".to_string(),
                "#00bfff".to_string(),
                "#ff69b4".to_string(),
            ],
            bollinger: "#9c27b0".to_string(),
            macd_line: "#2196f3".to_string(),
            signal_line: "#ff9800".to_string(),
        }
    }
}

impl Palette {
    pub fn up_color(&self) -> &str {
        match self.polarity {
            Polarity::UpRed => &self.red,
            Polarity::UpGreen => &self.green,
        }
    }

    pub fn down_color(&self) -> &str {
        match self.polarity {
            Polarity::UpRed => &self.green,
            Polarity::UpGreen => &self.red,
        }
    }

    /// Color for a candle (or its volume bar); `close >= open` is up.
    pub fn bar_color(&self, bar: &Bar) -> &str {
        if bar.is_up() {
            self.up_color()
        } else {
            self.down_color()
        }
    }

    pub fn ma_color(&self, index: usize) -> &str {
        if self.ma_lines.is_empty() {
            return &self.bollinger;
        }
        &self.ma_lines[index % self.ma_lines.len()]
    }
}
