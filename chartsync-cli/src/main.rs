//! chartsync CLI: build a chart scene headlessly from JSON inputs.
//!
//! Commands:
//! - `analyze`: normalize bars, compute indicators and markers, render into a
//!   recording renderer and print the resulting scene as JSON
//! - `markers`: print the detected markers as a table
//! - `config`: print the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chartsync_core::chart::{
    ChartDataSet, ChartSession, PaneId, PointerEvent, PollOutcome, RecordingRenderer,
    SurfaceProbe, SurfaceSize,
};
use chartsync_core::data::{parse_time, IndicatorSummary, Period, RawRecord};
use chartsync_core::domain::{TimeEncoding, TimeKey};
use chartsync_core::ChartConfig;

#[derive(Parser)]
#[command(name = "chartsync", about = "chartsync CLI: synchronized stock chart scenes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Inputs {
    /// Bar records as JSON: an array, or an object with a `data` or `bars` array.
    bars: PathBuf,

    /// Upstream indicator summary JSON.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Chart configuration TOML. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bar period: daily, weekly, or monthly.
    #[arg(long, default_value = "daily")]
    period: Period,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full chart scene and print it as JSON.
    Analyze {
        #[command(flatten)]
        inputs: Inputs,

        /// Resolve the crosshair at this time (date or RFC 3339 timestamp).
        #[arg(long)]
        pointer: Option<String>,

        /// Write the scene here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print detected markers.
    Markers {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the default configuration.
    Config,
}

/// Every pane is laid out at a fixed size; there is no window to wait for.
struct HeadlessSurfaces;

impl SurfaceProbe for HeadlessSurfaces {
    fn measure(&self, _pane: &PaneId) -> Option<SurfaceSize> {
        Some(SurfaceSize::new(1200.0, 400.0))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            inputs,
            pointer,
            output,
        } => run_analyze(&inputs, pointer.as_deref(), output.as_deref()),
        Commands::Markers { inputs } => run_markers(&inputs),
        Commands::Config => {
            let text = toml::to_string_pretty(&ChartConfig::default())
                .context("failed to serialize default config")?;
            print!("{text}");
            Ok(())
        }
    }
}

fn run_analyze(inputs: &Inputs, pointer: Option<&str>, output: Option<&Path>) -> Result<()> {
    let config = load_config(inputs.config.as_deref())?;
    let data = build_data_set(inputs, &config)?;

    let mut session = ChartSession::new(&config);
    let mut renderer = RecordingRenderer::new();
    session.begin(data);
    match session.advance(&HeadlessSurfaces, &mut renderer)? {
        PollOutcome::Ready => {}
        PollOutcome::Retry { attempt, .. } => {
            bail!("chart surfaces not ready after {attempt} attempt(s)")
        }
    }
    let Some(data) = session.data().cloned() else {
        bail!("chart construction produced no data set");
    };

    let crosshair = match pointer {
        Some(text) => {
            let time = pointer_time(text, data.series().encoding())
                .with_context(|| format!("unrecognized pointer time '{text}'"))?;
            let event = PointerEvent {
                time: Some(time),
                x: None,
            };
            match session.on_pointer_move(&event, None) {
                Some(sample) => Some(sample.readout()),
                None => {
                    warn!(pointer = text, "pointer does not match any bar");
                    None
                }
            }
        }
        None => None,
    };

    let scene = json!({
        "period": data.period(),
        "report": data.report(),
        "bars": data.len(),
        "markers": data.markers(),
        "display_bands": data.display_bands(),
        "renderer": renderer,
        "crosshair": crosshair,
    });
    let text = serde_json::to_string_pretty(&scene)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "scene written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn run_markers(inputs: &Inputs) -> Result<()> {
    let config = load_config(inputs.config.as_deref())?;
    let data = build_data_set(inputs, &config)?;

    if data.markers().is_empty() {
        println!("No markers ({} bars).", data.len());
        return Ok(());
    }
    println!("{:<22} {:<8} {:<12} {:<14}", "Time", "Side", "Label", "Source");
    println!("{}", "-".repeat(58));
    for marker in data.markers() {
        println!(
            "{:<22} {:<8} {:<12} {:<14}",
            marker.time.date_label(),
            format!("{:?}", marker.side).to_lowercase(),
            marker.label(),
            format!("{:?}", marker.source),
        );
    }
    Ok(())
}

/// Parse a pointer time and bring it into the series encoding.
fn pointer_time(text: &str, encoding: Option<TimeEncoding>) -> Option<TimeKey> {
    let time = parse_time(&Value::String(text.to_string()))?;
    match encoding {
        Some(encoding) => time.convert(encoding),
        None => Some(time),
    }
}

fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ChartConfig::default()),
    }
}

fn build_data_set(inputs: &Inputs, config: &ChartConfig) -> Result<ChartDataSet> {
    let records = read_records(&inputs.bars)?;
    let summary = match &inputs.summary {
        Some(path) => {
            let value = read_json(path)?;
            IndicatorSummary::from_json(&value)
                .with_context(|| format!("invalid indicator summary in {}", path.display()))?
        }
        None => IndicatorSummary::default(),
    };

    let data = ChartDataSet::build(&records, summary, inputs.period, config);
    let report = data.report();
    if report.output < report.input {
        info!(
            input = report.input,
            output = report.output,
            unparseable_time = report.unparseable_time,
            invalid_price = report.invalid_price,
            duplicates = report.duplicates,
            truncated = report.truncated,
            "records dropped during normalization"
        );
    }
    Ok(data)
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let value = read_json(path)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("bars")) {
            Some(Value::Array(items)) => items,
            _ => bail!("{}: expected a `data` or `bars` array", path.display()),
        },
        _ => bail!("{}: expected an array of bar records", path.display()),
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(RawRecord::from(map)),
            _ => None,
        })
        .collect();
    if records.len() < total {
        warn!(skipped = total - records.len(), "non-object bar records skipped");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_follows_series_encoding() {
        let day = TimeKey::business_day(2024, 3, 1).unwrap();
        assert_eq!(pointer_time("2024-03-01", Some(TimeEncoding::BusinessDay)), Some(day));
        assert_eq!(
            pointer_time("2024-03-01", Some(TimeEncoding::Timestamp)),
            Some(TimeKey::Timestamp(1_709_251_200))
        );
        assert_eq!(
            pointer_time("2024-03-01T14:30:00Z", Some(TimeEncoding::BusinessDay)),
            Some(day)
        );
        assert_eq!(pointer_time("soon", None), None);
    }
}
