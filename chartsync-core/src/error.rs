//! Error types.
//!
//! Only resource failures surface as errors. Bad bars are filtered during
//! normalization and short histories give empty indicator lines; neither
//! reaches these enums.

use std::path::PathBuf;

use crate::chart::PaneId;

/// Failures while preparing or drawing a chart.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("chart surface '{pane}' not available after {attempts} attempts")]
    SurfaceMissing { pane: PaneId, attempts: u32 },

    #[error("chart surface '{pane}' has no usable size ({width}x{height}) after {attempts} attempts")]
    SurfaceUnsized {
        pane: PaneId,
        width: f64,
        height: f64,
        attempts: u32,
    },

    #[error("render failed on pane '{pane}': {message}")]
    Render { pane: PaneId, message: String },
}

/// Failures loading or validating a [`crate::config::ChartConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_errors_name_the_pane() {
        let err = ChartError::SurfaceMissing {
            pane: PaneId::Volume,
            attempts: 15,
        };
        assert_eq!(err.to_string(), "chart surface 'volume' not available after 15 attempts");

        let err = ChartError::SurfaceUnsized {
            pane: PaneId::Price,
            width: 0.0,
            height: 300.0,
            attempts: 15,
        };
        assert!(err.to_string().contains("'price'"));
        assert!(err.to_string().contains("0x300"));
    }

    #[test]
    fn invalid_config_message() {
        let err = ConfigError::invalid("indicators.macd", "fast must be below slow");
        assert_eq!(
            err.to_string(),
            "invalid config value for indicators.macd: fast must be below slow"
        );
    }
}
