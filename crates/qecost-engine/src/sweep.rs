//! Parameter sweeps over code distance and physical error rate.
//!
//! Each `(distance, p)` point is an independent [`Simulation`] run. Points
//! are dispatched on the rayon pool and collected back in configuration
//! order. A failed point is recorded and the rest of the sweep continues.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use qecost_codes::{MemoryBasis, RotatedSurfaceCode};
use qecost_decode::{MatchingDecoder, ParityDecoder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::energy::EnergyModel;
use crate::error::{EngineError, EngineResult, check_probability};
use crate::export::SweepResults;
use crate::result::SimulationResult;
use crate::simulation::Simulation;

/// Which decoder a sweep uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderKind {
    /// Minimum-weight perfect matching.
    #[default]
    Matching,
    /// Detector-parity baseline.
    Parity,
}

/// Sweep configuration. Missing fields take their defaults.
///
/// ```yaml
/// distances: [3, 5]
/// physical_error_rates: [0.001, 0.005, 0.01]
/// shots: 2000
/// seed: 7
/// energy_model:
///   decoding_event_cost: 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub distances: Vec<u32>,
    pub physical_error_rates: Vec<f64>,
    pub shots: u64,
    /// Syndrome rounds; `None` uses the distance.
    pub rounds: Option<u32>,
    pub basis: MemoryBasis,
    pub decoder: DecoderKind,
    pub energy_model: EnergyModel,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            distances: vec![3, 5, 7],
            physical_error_rates: logspace(-3.0, -1.0, 10),
            shots: 10_000,
            rounds: None,
            basis: MemoryBasis::X,
            decoder: DecoderKind::Matching,
            energy_model: EnergyModel::default(),
            seed: 0,
        }
    }
}

impl SweepConfig {
    /// Load a configuration; `.yaml`/`.yml` files are YAML, anything else JSON.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let config: Self = if is_yaml {
            serde_yaml_ng::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> EngineResult<()> {
        if self.distances.is_empty() {
            return Err(EngineError::InvalidParameter {
                name: "distances",
                value: 0.0,
                expected: "at least one distance",
            });
        }
        if let Some(&d) = self.distances.iter().find(|&&d| d == 0) {
            return Err(EngineError::InvalidParameter {
                name: "distance",
                value: f64::from(d),
                expected: "a distance of at least 1",
            });
        }
        if self.physical_error_rates.is_empty() {
            return Err(EngineError::InvalidParameter {
                name: "physical_error_rates",
                value: 0.0,
                expected: "at least one error rate",
            });
        }
        for &p in &self.physical_error_rates {
            check_probability("physical_error_rate", p)?;
        }
        if self.shots == 0 {
            return Err(EngineError::InvalidParameter {
                name: "shots",
                value: self.shots as f64,
                expected: "at least one shot",
            });
        }
        if self.rounds == Some(0) {
            return Err(EngineError::InvalidParameter {
                name: "rounds",
                value: 0.0,
                expected: "at least one round",
            });
        }
        self.energy_model.validate()
    }

    /// Number of `(distance, p)` points.
    pub fn num_points(&self) -> usize {
        self.distances.len() * self.physical_error_rates.len()
    }

    /// Run a single point with an explicit seed.
    pub fn run_point(&self, distance: u32, physical_error_rate: f64, seed: u64) -> EngineResult<SimulationResult> {
        let code = RotatedSurfaceCode::new(distance, self.rounds.unwrap_or(distance))?.with_basis(self.basis);
        let simulation = Simulation::new(code, self.energy_model).with_seed(seed);
        match self.decoder {
            DecoderKind::Matching => simulation.run(physical_error_rate, self.shots, MatchingDecoder::from_circuit),
            DecoderKind::Parity => simulation.run(physical_error_rate, self.shots, |circuit| {
                Ok(ParityDecoder::from_circuit(circuit))
            }),
        }
    }
}

/// `n` points evenly spaced in log10 between `10^start` and `10^end`.
#[allow(clippy::cast_precision_loss)]
pub fn logspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| 10f64.powf(start + step * i as f64)).collect()
        }
    }
}

/// Seed of one sweep point, independent of scheduling.
pub fn point_seed(seed: u64, distance: u32, index: usize) -> u64 {
    // splitmix64 finalizer
    let mut z = seed ^ (u64::from(distance) << 32) ^ index as u64;
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A completed sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub distance: u32,
    pub result: SimulationResult,
}

/// A sweep point that could not be run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub distance: u32,
    pub physical_error_rate: f64,
    pub message: String,
}

/// Everything a sweep produced, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    pub points: Vec<SweepPoint>,
    pub failures: Vec<SweepFailure>,
}

impl SweepOutcome {
    /// True when the sweep had points and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.points.is_empty() && !self.failures.is_empty()
    }

    /// Collapse the points into per-distance series.
    pub fn to_results(&self) -> EngineResult<SweepResults> {
        let mut results = SweepResults::new();
        for point in &self.points {
            results.entry(point.distance).or_default().push(
                point.result.physical_error_rate(),
                point.result.logical_error_rate()?,
                point.result.average_energy_per_shot()?,
            );
        }
        Ok(results)
    }
}

/// A validated sweep.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: SweepConfig,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn run(&self) -> SweepOutcome {
        self.run_with_progress(|_, _| {})
    }

    /// Run every point; `on_point(completed, total)` is called as points finish.
    pub fn run_with_progress<F>(&self, on_point: F) -> SweepOutcome
    where
        F: Fn(usize, usize) + Sync,
    {
        let config = &self.config;
        let jobs: Vec<(u32, usize, f64)> = config
            .distances
            .iter()
            .flat_map(|&d| {
                config
                    .physical_error_rates
                    .iter()
                    .enumerate()
                    .map(move |(i, &p)| (d, i, p))
            })
            .collect();
        let total = jobs.len();
        let completed = AtomicUsize::new(0);

        info!(
            points = total,
            shots = config.shots,
            decoder = ?config.decoder,
            "starting sweep"
        );

        let outcomes: Vec<Result<SweepPoint, SweepFailure>> = jobs
            .par_iter()
            .map(|&(distance, index, p)| {
                let outcome = config
                    .run_point(distance, p, point_seed(config.seed, distance, index))
                    .map(|result| SweepPoint { distance, result })
                    .map_err(|e| {
                        warn!(distance, p, error = %e, "sweep point failed");
                        SweepFailure {
                            distance,
                            physical_error_rate: p,
                            message: e.to_string(),
                        }
                    });
                on_point(completed.fetch_add(1, Ordering::Relaxed) + 1, total);
                outcome
            })
            .collect();

        let mut outcome = SweepOutcome::default();
        for item in outcomes {
            match item {
                Ok(point) => outcome.points.push(point),
                Err(failure) => outcome.failures.push(failure),
            }
        }
        info!(
            succeeded = outcome.points.len(),
            failed = outcome.failures.len(),
            "sweep complete"
        );
        outcome
    }
}
