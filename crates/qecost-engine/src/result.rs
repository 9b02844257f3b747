//! Outcome of one simulation run.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Tallies of a `(code, physical error rate)` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    logical_errors: u64,
    total_shots: u64,
    total_energy: f64,
    physical_error_rate: f64,
    circuit_energy: f64,
    decoding_energy: f64,
    detection_events: u64,
}

impl SimulationResult {
    /// Assemble a result; `logical_errors` may not exceed `total_shots`.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(
        physical_error_rate: f64,
        logical_errors: u64,
        total_shots: u64,
        circuit_energy: f64,
        detection_events: u64,
        decoding_energy: f64,
    ) -> EngineResult<Self> {
        if logical_errors > total_shots {
            return Err(EngineError::InvalidParameter {
                name: "logical_errors",
                value: logical_errors as f64,
                expected: "at most the number of shots",
            });
        }
        let total_energy = circuit_energy * total_shots as f64 + decoding_energy;
        Ok(Self {
            logical_errors,
            total_shots,
            total_energy,
            physical_error_rate,
            circuit_energy,
            decoding_energy,
            detection_events,
        })
    }

    pub fn logical_errors(&self) -> u64 {
        self.logical_errors
    }

    pub fn total_shots(&self) -> u64 {
        self.total_shots
    }

    /// Static energy of every shot plus all decoding energy.
    pub fn total_energy(&self) -> f64 {
        self.total_energy
    }

    pub fn physical_error_rate(&self) -> f64 {
        self.physical_error_rate
    }

    /// Static energy of one shot.
    pub fn circuit_energy(&self) -> f64 {
        self.circuit_energy
    }

    pub fn decoding_energy(&self) -> f64 {
        self.decoding_energy
    }

    /// Detection events summed over all shots.
    pub fn detection_events(&self) -> u64 {
        self.detection_events
    }

    /// Fraction of shots with a logical error.
    #[allow(clippy::cast_precision_loss)]
    pub fn logical_error_rate(&self) -> EngineResult<f64> {
        self.require_shots()?;
        Ok(self.logical_errors as f64 / self.total_shots as f64)
    }

    /// Mean energy per shot.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_energy_per_shot(&self) -> EngineResult<f64> {
        self.require_shots()?;
        Ok(self.total_energy / self.total_shots as f64)
    }

    /// Wilson score interval for the logical error rate at `z` standard
    /// deviations (1.96 for 95%).
    #[allow(clippy::cast_precision_loss)]
    pub fn confidence_interval(&self, z: f64) -> EngineResult<(f64, f64)> {
        let rate = self.logical_error_rate()?;
        let n = self.total_shots as f64;
        let z2 = z * z;
        let denom = 1.0 + z2 / n;
        let center = (rate + z2 / (2.0 * n)) / denom;
        let half = z * (rate * (1.0 - rate) / n + z2 / (4.0 * n * n)).sqrt() / denom;
        Ok(((center - half).max(0.0), (center + half).min(1.0)))
    }

    fn require_shots(&self) -> EngineResult<()> {
        if self.total_shots == 0 {
            return Err(EngineError::InvalidParameter {
                name: "total_shots",
                value: 0.0,
                expected: "at least one shot",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rates() {
        let result = SimulationResult::new(0.01, 25, 1000, 10.0, 400, 400.0).unwrap();
        assert_eq!(result.logical_error_rate().unwrap(), 0.025);
        assert_eq!(result.total_energy(), 10_400.0);
        assert_eq!(result.average_energy_per_shot().unwrap(), 10.4);
    }

    #[test]
    fn test_more_errors_than_shots_rejected() {
        assert!(SimulationResult::new(0.1, 11, 10, 1.0, 0, 0.0).is_err());
    }

    #[test]
    fn test_zero_shots() {
        let result = SimulationResult::new(0.1, 0, 0, 1.0, 0, 0.0).unwrap();
        assert!(result.logical_error_rate().is_err());
        assert!(result.average_energy_per_shot().is_err());
        assert!(result.confidence_interval(1.96).is_err());
    }

    #[test]
    fn test_wilson_interval_contains_estimate() {
        let result = SimulationResult::new(0.01, 30, 10_000, 1.0, 0, 0.0).unwrap();
        let (lo, hi) = result.confidence_interval(1.96).unwrap();
        let rate = result.logical_error_rate().unwrap();
        assert!(lo < rate && rate < hi);
        assert!(lo > 0.0 && hi < 0.01);
    }

    #[test]
    fn test_wilson_interval_at_zero_errors() {
        let result = SimulationResult::new(0.001, 0, 100, 1.0, 0, 0.0).unwrap();
        let (lo, hi) = result.confidence_interval(1.96).unwrap();
        assert!(lo < 1e-12);
        assert!(hi > 0.0 && hi < 0.05);
    }
}
