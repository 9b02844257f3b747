//! Plot artifacts.
//!
//! Plots are written as JSON plot specifications (axes, scales and one
//! series per distance) rather than images, so any renderer can draw them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::export::SweepResults;

/// File name of the threshold plot.
pub const THRESHOLD_PLOT_FILE: &str = "threshold_plot.json";

/// File name of the energy plot.
pub const ENERGY_PLOT_FILE: &str = "energy_plot.json";

/// Shown next to written plot paths: the files describe plots, they are
/// not images.
pub const PLOT_RENDER_NOTE: &str =
    "Plots are JSON plot specifications; render them with an external plotting tool (e.g. matplotlib or Vega).";

/// Axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    Log,
}

/// One labelled line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub label: String,
    pub marker: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A renderer-independent plot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub grid: bool,
    pub series: Vec<PlotSeries>,
}

/// Logical vs physical error rate, log-log, one line per distance.
pub fn threshold_plot(results: &SweepResults) -> PlotSpec {
    PlotSpec {
        title: "Surface Code Threshold Plot".into(),
        x_label: "Physical Error Rate (p)".into(),
        y_label: "Logical Error Rate".into(),
        x_scale: AxisScale::Log,
        y_scale: AxisScale::Log,
        grid: true,
        series: results
            .iter()
            .map(|(d, s)| PlotSeries {
                label: format!("d={d}"),
                marker: "o".into(),
                x: s.p.clone(),
                y: s.logical_error_rate.clone(),
            })
            .collect(),
    }
}

/// Average energy per shot vs physical error rate, log x axis.
pub fn energy_plot(results: &SweepResults) -> PlotSpec {
    PlotSpec {
        title: "Energy Consumption vs Physical Error Rate".into(),
        x_label: "Physical Error Rate (p)".into(),
        y_label: "Average Energy per Shot (units)".into(),
        x_scale: AxisScale::Log,
        y_scale: AxisScale::Linear,
        grid: true,
        series: results
            .iter()
            .map(|(d, s)| PlotSeries {
                label: format!("d={d}"),
                marker: "s".into(),
                x: s.p.clone(),
                y: s.energy.clone(),
            })
            .collect(),
    }
}

/// Write both plots into `dir`, creating it if needed.
pub fn write_plots(results: &SweepResults, dir: &Path) -> EngineResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .map_err(|e| EngineError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

    let mut written = Vec::with_capacity(2);
    for (file, spec) in [
        (THRESHOLD_PLOT_FILE, threshold_plot(results)),
        (ENERGY_PLOT_FILE, energy_plot(results)),
    ] {
        let path = dir.join(file);
        let json = serde_json::to_string_pretty(&spec)?;
        std::fs::write(&path, json)
            .map_err(|e| EngineError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), series = spec.series.len(), "wrote plot");
        written.push(path);
    }
    Ok(written)
}
