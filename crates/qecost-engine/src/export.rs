//! Persisted sweep results.
//!
//! The results file is a JSON object keyed by code distance. Keys are
//! written as strings and read back as integers:
//!
//! ```json
//! {
//!   "3": { "p": [0.001, ...], "logical_error_rate": [...], "energy": [...] }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default results file name.
pub const RESULTS_FILE: &str = "simulation_results.json";

/// Results of one distance, aligned by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceSeries {
    /// Physical error rates.
    pub p: Vec<f64>,
    /// Logical error rate at each `p`.
    pub logical_error_rate: Vec<f64>,
    /// Average energy per shot at each `p`.
    pub energy: Vec<f64>,
}

impl DistanceSeries {
    /// Append one point.
    pub fn push(&mut self, p: f64, logical_error_rate: f64, energy: f64) {
        self.p.push(p);
        self.logical_error_rate.push(logical_error_rate);
        self.energy.push(energy);
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
}

/// Sweep results keyed by distance.
pub type SweepResults = BTreeMap<u32, DistanceSeries>;

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Serialize results to a JSON string.
pub fn to_json(results: &SweepResults, config: &ExportConfig) -> EngineResult<String> {
    if config.pretty {
        serde_json::to_string_pretty(results).map_err(EngineError::from)
    } else {
        serde_json::to_string(results).map_err(EngineError::from)
    }
}

/// Write results to `path`.
pub fn save_results(results: &SweepResults, path: &Path, config: &ExportConfig) -> EngineResult<()> {
    let json = to_json(results, config)?;
    std::fs::write(path, json)
        .map_err(|e| EngineError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

/// Read results written by [`save_results`].
pub fn load_results(path: &Path) -> EngineResult<SweepResults> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| EngineError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let results: SweepResults = serde_json::from_str(&json)?;
    for (distance, series) in &results {
        let aligned = series.logical_error_rate.len() == series.p.len()
            && series.energy.len() == series.p.len();
        if !aligned {
            return Err(EngineError::Serialization(format!(
                "Series for distance {distance} has mismatched lengths"
            )));
        }
    }
    Ok(results)
}
