//! Circuit instructions combining a gate with its targets and arguments.

use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, OpClass};
use crate::target::Target;

/// Largest accepted qubit or observable index. Counts are one past the
/// largest index, so they always fit in a `u32`.
pub const MAX_INDEX: u32 = u32::MAX - 1;

/// One circuit instruction.
///
/// Instructions are validated on construction, so a value of this type
/// always has targets and arguments consistent with its gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    gate: Gate,
    targets: Vec<Target>,
    args: Vec<f64>,
}

impl Instruction {
    /// Create and validate an instruction.
    pub fn new(gate: Gate, targets: Vec<Target>, args: Vec<f64>) -> IrResult<Self> {
        let instruction = Self {
            gate,
            targets,
            args,
        };
        instruction.validate()?;
        Ok(instruction)
    }

    /// Create an instruction acting on qubit targets.
    pub fn on_qubits(gate: Gate, qubits: &[u32], args: &[f64]) -> IrResult<Self> {
        Self::new(
            gate,
            qubits.iter().map(|&q| Target::Qubit(q)).collect(),
            args.to_vec(),
        )
    }

    /// Create a `DETECTOR` over the given record lookbacks (`k` means `rec[-k]`).
    pub fn detector(lookbacks: &[u32], coords: &[f64]) -> IrResult<Self> {
        Self::new(
            Gate::Detector,
            lookbacks.iter().map(|&k| Target::Rec(k)).collect(),
            coords.to_vec(),
        )
    }

    /// Create an `OBSERVABLE_INCLUDE(index)` over the given record lookbacks.
    pub fn observable_include(index: u32, lookbacks: &[u32]) -> IrResult<Self> {
        Self::new(
            Gate::ObservableInclude,
            lookbacks.iter().map(|&k| Target::Rec(k)).collect(),
            vec![f64::from(index)],
        )
    }

    /// Create a `TICK`.
    pub fn tick() -> Self {
        Self {
            gate: Gate::Tick,
            targets: vec![],
            args: vec![],
        }
    }

    /// The gate.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Instruction targets in order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Parenthesized arguments (probabilities, coordinates or observable index).
    pub fn args(&self) -> &[f64] {
        &self.args
    }

    /// Operation class of the gate.
    pub fn class(&self) -> OpClass {
        self.gate.class()
    }

    /// Qubit targets in order (record targets are skipped).
    pub fn qubits(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.iter().filter_map(|t| t.qubit())
    }

    /// Number of measurement results this instruction appends to the record.
    pub fn num_measurements(&self) -> u64 {
        if self.gate.produces_measurements() {
            self.targets.len() as u64
        } else {
            0
        }
    }

    /// Observable index of an `OBSERVABLE_INCLUDE`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn observable_index(&self) -> Option<u32> {
        match self.gate {
            Gate::ObservableInclude => self.args.first().map(|&a| a as u32),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn validate(&self) -> IrResult<()> {
        if let Some(q) = self.qubits().find(|&q| q > MAX_INDEX) {
            return Err(self.invalid_targets(format!("qubit index {q} exceeds {MAX_INDEX}")));
        }
        if let Gate::Unknown(_) = self.gate {
            return Ok(());
        }

        if self.gate.takes_record_targets() {
            self.require_record_targets()?;
        } else {
            self.require_qubit_targets()?;
        }

        match self.gate.class() {
            OpClass::Noise => self.validate_noise_args()?,
            OpClass::Annotation => self.validate_annotation()?,
            _ => self.require_arg_count(0, "0")?,
        }

        let group = self.gate.target_group_size();
        if group == 2 {
            if self.targets.len() % 2 != 0 {
                return Err(self.invalid_targets(format!(
                    "expected an even number of targets, got {}",
                    self.targets.len()
                )));
            }
            for pair in self.targets.chunks_exact(2) {
                if pair[0] == pair[1] {
                    return Err(
                        self.invalid_targets(format!("pair acts twice on qubit {}", pair[0]))
                    );
                }
            }
        }
        Ok(())
    }

    fn validate_noise_args(&self) -> IrResult<()> {
        if self.gate == Gate::PauliChannel1 {
            self.require_arg_count(3, "3")?;
            for &p in &self.args {
                check_probability("pauli channel probability", p)?;
            }
            let total: f64 = self.args.iter().sum();
            if total > 1.0 {
                return Err(IrError::InvalidParameter {
                    name: "pauli channel total probability",
                    value: total,
                    expected: "a sum of at most 1",
                });
            }
        } else {
            self.require_arg_count(1, "1")?;
            check_probability("error probability", self.args[0])?;
        }
        Ok(())
    }

    fn validate_annotation(&self) -> IrResult<()> {
        match self.gate {
            Gate::Tick => {
                self.require_arg_count(0, "0")?;
                self.require_no_targets()
            }
            Gate::ShiftCoords => self.require_no_targets(),
            Gate::ObservableInclude => {
                self.require_arg_count(1, "1")?;
                let index = self.args[0];
                if index < 0.0 || index.fract() != 0.0 || index > f64::from(MAX_INDEX) {
                    return Err(IrError::InvalidParameter {
                        name: "observable index",
                        value: index,
                        expected: "an integer in [0, 2^32 - 2]",
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn require_record_targets(&self) -> IrResult<()> {
        for target in &self.targets {
            match target {
                Target::Rec(0) => {
                    return Err(self.invalid_targets("rec[-0] is not a valid lookback".into()));
                }
                Target::Rec(_) => {}
                Target::Qubit(q) => {
                    return Err(
                        self.invalid_targets(format!("expected record targets, got qubit {q}"))
                    );
                }
            }
        }
        Ok(())
    }

    fn require_qubit_targets(&self) -> IrResult<()> {
        if let Some(rec) = self.targets.iter().find(|t| t.lookback().is_some()) {
            return Err(self.invalid_targets(format!("expected qubit targets, got {rec}")));
        }
        Ok(())
    }

    fn require_no_targets(&self) -> IrResult<()> {
        if self.targets.is_empty() {
            Ok(())
        } else {
            Err(self.invalid_targets("takes no targets".into()))
        }
    }

    fn require_arg_count(&self, expected: usize, text: &'static str) -> IrResult<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(IrError::ArgCountMismatch {
                gate_name: self.gate.name().to_string(),
                expected: text,
                got: self.args.len(),
            })
        }
    }

    fn invalid_targets(&self, reason: String) -> IrError {
        IrError::InvalidTargets {
            gate_name: self.gate.name().to_string(),
            reason,
        }
    }
}

/// Check that `p` is a probability in `[0, 1]`.
pub fn check_probability(name: &'static str, p: f64) -> IrResult<f64> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(IrError::InvalidParameter {
            name,
            value: p,
            expected: "a probability in [0, 1]",
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        for target in &self.targets {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let inst = Instruction::on_qubits(Gate::Depolarize2, &[0, 1, 2, 3], &[0.01]).unwrap();
        assert_eq!(inst.to_string(), "DEPOLARIZE2(0.01) 0 1 2 3");

        let det = Instruction::detector(&[1, 9], &[2.0, 4.0, 0.0]).unwrap();
        assert_eq!(det.to_string(), "DETECTOR(2, 4, 0) rec[-1] rec[-9]");
    }

    #[test]
    fn test_two_qubit_validation() {
        assert!(Instruction::on_qubits(Gate::CX, &[0, 1, 2], &[]).is_err());
        assert!(matches!(
            Instruction::on_qubits(Gate::CX, &[3, 3], &[]),
            Err(IrError::InvalidTargets { .. })
        ));
        assert!(Instruction::on_qubits(Gate::CX, &[0, 1, 1, 2], &[]).is_ok());
    }

    #[test]
    fn test_noise_probability_validation() {
        assert!(matches!(
            Instruction::on_qubits(Gate::XError, &[0], &[1.5]),
            Err(IrError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Instruction::on_qubits(Gate::Depolarize1, &[0], &[]),
            Err(IrError::ArgCountMismatch { .. })
        ));
        assert!(matches!(
            Instruction::on_qubits(Gate::PauliChannel1, &[0], &[0.5, 0.4, 0.3]),
            Err(IrError::InvalidParameter { .. })
        ));
        assert!(Instruction::on_qubits(Gate::PauliChannel1, &[0], &[0.1, 0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_record_targets() {
        assert!(Instruction::detector(&[0], &[]).is_err());
        assert!(Instruction::new(Gate::Detector, vec![Target::Qubit(1)], vec![]).is_err());
        assert!(Instruction::new(Gate::H, vec![Target::Rec(1)], vec![]).is_err());

        let obs = Instruction::observable_include(2, &[1]).unwrap();
        assert_eq!(obs.observable_index(), Some(2));
    }

    #[test]
    fn test_measurement_count() {
        let m = Instruction::on_qubits(Gate::MR, &[4, 5, 6], &[]).unwrap();
        assert_eq!(m.num_measurements(), 3);
        let r = Instruction::on_qubits(Gate::R, &[4, 5, 6], &[]).unwrap();
        assert_eq!(r.num_measurements(), 0);
    }

    #[test]
    fn test_index_limits() {
        assert!(Instruction::on_qubits(Gate::H, &[MAX_INDEX], &[]).is_ok());
        assert!(matches!(
            Instruction::on_qubits(Gate::H, &[u32::MAX], &[]),
            Err(IrError::InvalidTargets { .. })
        ));
        assert!(Instruction::observable_include(MAX_INDEX, &[1]).is_ok());
        assert!(matches!(
            Instruction::observable_include(u32::MAX, &[1]),
            Err(IrError::InvalidParameter { .. })
        ));
    }
}
