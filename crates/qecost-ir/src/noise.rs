//! Circuit-level noise models.
//!
//! A [`NoiseModel`] describes one stochastic Pauli process. Applying it to a
//! circuit appends the matching channel on every qubit of the register and
//! returns a new circuit; the input is never modified.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::IrResult;
use crate::gate::Gate;
use crate::instruction::{Instruction, check_probability};

/// A noise channel model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum NoiseModel {
    /// Depolarizing channel: X, Y or Z each with probability `p / 3`.
    Depolarizing {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },

    /// Amplitude damping, approximated as a Pauli-X channel with probability `gamma`.
    AmplitudeDamping {
        /// Damping parameter (0.0 to 1.0).
        gamma: f64,
    },

    /// Bit-flip channel: applies X with probability `p`.
    BitFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },

    /// Phase-flip channel: applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },
}

impl NoiseModel {
    /// Get a human-readable name for this noise model.
    pub fn name(&self) -> &str {
        match self {
            NoiseModel::Depolarizing { .. } => "depolarizing",
            NoiseModel::AmplitudeDamping { .. } => "amplitude_damping",
            NoiseModel::BitFlip { .. } => "bit_flip",
            NoiseModel::PhaseFlip { .. } => "phase_flip",
        }
    }

    /// Get the primary error parameter of this noise model.
    pub fn error_param(&self) -> f64 {
        match self {
            NoiseModel::Depolarizing { p }
            | NoiseModel::BitFlip { p }
            | NoiseModel::PhaseFlip { p } => *p,
            NoiseModel::AmplitudeDamping { gamma } => *gamma,
        }
    }

    /// The channel instruction this model appends, without targets.
    fn channel(&self) -> IrResult<(Gate, Vec<f64>)> {
        let p = check_probability("noise probability", self.error_param())?;
        Ok(match self {
            NoiseModel::Depolarizing { .. } => (Gate::Depolarize1, vec![p]),
            NoiseModel::AmplitudeDamping { .. } => (Gate::PauliChannel1, vec![p, 0.0, 0.0]),
            NoiseModel::BitFlip { .. } => (Gate::XError, vec![p]),
            NoiseModel::PhaseFlip { .. } => (Gate::ZError, vec![p]),
        })
    }

    /// Return a copy of `circuit` with this channel appended on qubits
    /// `0..circuit.num_qubits()`.
    ///
    /// Fails with [`IrError::InvalidParameter`](crate::IrError::InvalidParameter)
    /// if the probability is outside `[0, 1]`.
    pub fn apply(&self, circuit: &Circuit) -> IrResult<Circuit> {
        let (gate, args) = self.channel()?;
        let mut noisy = circuit.clone();
        let qubits: Vec<u32> = (0..circuit.num_qubits()).collect();
        if !qubits.is_empty() {
            noisy.push(Instruction::on_qubits(gate, &qubits, &args)?);
        }
        Ok(noisy)
    }
}

impl std::fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseModel::AmplitudeDamping { gamma } => {
                write!(f, "amplitude_damping(γ={gamma:.4})")
            }
            other => write!(f, "{}(p={:.4})", other.name(), other.error_param()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IrError;

    fn bell() -> Circuit {
        "H 0\nCX 0 1\nM 0 1\n".parse().unwrap()
    }

    #[test]
    fn test_depolarizing_appends_channel() {
        let noisy = NoiseModel::Depolarizing { p: 0.01 }.apply(&bell()).unwrap();
        assert_eq!(noisy.to_string(), "H 0\nCX 0 1\nM 0 1\nDEPOLARIZE1(0.01) 0 1\n");
    }

    #[test]
    fn test_amplitude_damping_is_x_channel() {
        let noisy = NoiseModel::AmplitudeDamping { gamma: 0.2 }
            .apply(&bell())
            .unwrap();
        assert!(noisy.to_string().ends_with("PAULI_CHANNEL_1(0.2, 0, 0) 0 1\n"));
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let original = bell();
        let snapshot = original.clone();
        let _ = NoiseModel::BitFlip { p: 0.5 }.apply(&original).unwrap();
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_out_of_range_probability() {
        for model in [
            NoiseModel::Depolarizing { p: -0.1 },
            NoiseModel::PhaseFlip { p: 1.01 },
            NoiseModel::AmplitudeDamping { gamma: f64::NAN },
        ] {
            assert!(matches!(
                model.apply(&bell()),
                Err(IrError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_empty_circuit_unchanged() {
        let noisy = NoiseModel::Depolarizing { p: 0.1 }
            .apply(&Circuit::new())
            .unwrap();
        assert!(noisy.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NoiseModel::Depolarizing { p: 0.03 }.to_string(),
            "depolarizing(p=0.0300)"
        );
    }
}
