//! chartsync core: bar normalization, indicators, markers, synchronized panes.
//!
//! This crate holds everything a multi-pane stock chart needs apart from
//! drawing:
//! - Bar normalization from loosely-typed upstream records
//! - Indicator engine (MA, EMA, MACD, Bollinger, volume)
//! - Marker detection from indicator crossings and upstream verdicts
//! - Crosshair resolution and viewport synchronization across panes
//! - Chart lifecycle guard and the renderer seam

pub mod chart;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod signals;

pub use config::ChartConfig;
pub use error::{ChartError, ConfigError};
