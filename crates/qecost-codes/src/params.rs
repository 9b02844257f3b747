//! Circuit-level noise parameters for generated circuits.

use qecost_ir::check_probability;
use serde::{Deserialize, Serialize};

use crate::error::{CodeError, CodeResult};

/// Probabilities of the four noise locations a generator inserts.
///
/// A zero probability omits the corresponding channel from the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// `DEPOLARIZE1`/`DEPOLARIZE2` after every Clifford gate.
    pub after_clifford_depolarization: f64,
    /// Flip opposite to the reset basis after every reset.
    pub after_reset_flip_probability: f64,
    /// Flip opposite to the measurement basis before every measurement.
    pub before_measure_flip_probability: f64,
    /// `DEPOLARIZE1` on every data qubit at the start of each round.
    pub before_round_data_depolarization: f64,
}

impl NoiseParameters {
    /// All four locations at the same probability.
    pub fn uniform(p: f64) -> Self {
        Self {
            after_clifford_depolarization: p,
            after_reset_flip_probability: p,
            before_measure_flip_probability: p,
            before_round_data_depolarization: p,
        }
    }

    /// Every probability must lie in `[0, 1]`.
    pub fn validate(&self) -> CodeResult<()> {
        for (name, p) in [
            ("after_clifford_depolarization", self.after_clifford_depolarization),
            ("after_reset_flip_probability", self.after_reset_flip_probability),
            ("before_measure_flip_probability", self.before_measure_flip_probability),
            ("before_round_data_depolarization", self.before_round_data_depolarization),
        ] {
            check_probability(name, p).map_err(|_| CodeError::InvalidParameter {
                name,
                value: p,
                expected: "a probability in [0, 1]",
            })?;
        }
        Ok(())
    }

    /// Whether every channel would be omitted.
    pub fn is_noiseless(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_validates() {
        assert!(NoiseParameters::uniform(0.01).validate().is_ok());
        assert!(NoiseParameters::uniform(0.0).is_noiseless());
    }

    #[test]
    fn test_out_of_range_names_parameter() {
        let params = NoiseParameters {
            before_measure_flip_probability: 1.5,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("before_measure_flip_probability"));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(NoiseParameters::uniform(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let params: NoiseParameters =
            serde_json::from_str(r#"{"after_clifford_depolarization": 0.002}"#).unwrap();
        assert_eq!(params.after_clifford_depolarization, 0.002);
        assert_eq!(params.after_reset_flip_probability, 0.0);
    }
}
