//! Instruction names and their operation classes.

use serde::{Deserialize, Serialize};

/// Broad category of an instruction, used for energy accounting and
/// by the sampler to decide how an instruction acts on the Pauli frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpClass {
    /// Single-qubit Clifford gate.
    SingleQubit,
    /// Two-qubit Clifford gate (targets come in pairs).
    TwoQubit,
    /// Destructive-free measurement (`M`, `MX`).
    Measurement,
    /// Reset (`R`, `RX`).
    Reset,
    /// Measurement immediately followed by reset (`MR`, `MRX`).
    MeasureReset,
    /// Stochastic Pauli channel.
    Noise,
    /// Detector, observable, coordinate and timing annotations.
    Annotation,
    /// Anything this crate does not recognize.
    Unknown,
}

/// A circuit instruction name.
///
/// Parsing is case-insensitive and accepts the usual aliases
/// (`CNOT`/`ZCX` for `CX`, `MZ` for `M`, `RZ` for `R`, ...). Unrecognized
/// names are preserved verbatim in [`Gate::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    SDag,
    SqrtX,
    SqrtXDag,
    CX,
    CY,
    CZ,
    Swap,
    M,
    MX,
    R,
    RX,
    MR,
    MRX,
    XError,
    YError,
    ZError,
    Depolarize1,
    Depolarize2,
    PauliChannel1,
    Detector,
    ObservableInclude,
    QubitCoords,
    ShiftCoords,
    Tick,
    Unknown(String),
}

impl Gate {
    /// Look up a gate by name.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "I" => Gate::I,
            "X" => Gate::X,
            "Y" => Gate::Y,
            "Z" => Gate::Z,
            "H" | "H_XZ" => Gate::H,
            "S" | "SQRT_Z" => Gate::S,
            "S_DAG" | "SQRT_Z_DAG" => Gate::SDag,
            "SQRT_X" => Gate::SqrtX,
            "SQRT_X_DAG" => Gate::SqrtXDag,
            "CX" | "CNOT" | "ZCX" => Gate::CX,
            "CY" | "ZCY" => Gate::CY,
            "CZ" | "ZCZ" => Gate::CZ,
            "SWAP" => Gate::Swap,
            "M" | "MZ" => Gate::M,
            "MX" => Gate::MX,
            "R" | "RZ" => Gate::R,
            "RX" => Gate::RX,
            "MR" | "MRZ" => Gate::MR,
            "MRX" => Gate::MRX,
            "X_ERROR" => Gate::XError,
            "Y_ERROR" => Gate::YError,
            "Z_ERROR" => Gate::ZError,
            "DEPOLARIZE1" => Gate::Depolarize1,
            "DEPOLARIZE2" => Gate::Depolarize2,
            "PAULI_CHANNEL_1" => Gate::PauliChannel1,
            "DETECTOR" => Gate::Detector,
            "OBSERVABLE_INCLUDE" => Gate::ObservableInclude,
            "QUBIT_COORDS" => Gate::QubitCoords,
            "SHIFT_COORDS" => Gate::ShiftCoords,
            "TICK" => Gate::Tick,
            _ => Gate::Unknown(name.to_string()),
        }
    }

    /// Canonical instruction name.
    pub fn name(&self) -> &str {
        match self {
            Gate::I => "I",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::SDag => "S_DAG",
            Gate::SqrtX => "SQRT_X",
            Gate::SqrtXDag => "SQRT_X_DAG",
            Gate::CX => "CX",
            Gate::CY => "CY",
            Gate::CZ => "CZ",
            Gate::Swap => "SWAP",
            Gate::M => "M",
            Gate::MX => "MX",
            Gate::R => "R",
            Gate::RX => "RX",
            Gate::MR => "MR",
            Gate::MRX => "MRX",
            Gate::XError => "X_ERROR",
            Gate::YError => "Y_ERROR",
            Gate::ZError => "Z_ERROR",
            Gate::Depolarize1 => "DEPOLARIZE1",
            Gate::Depolarize2 => "DEPOLARIZE2",
            Gate::PauliChannel1 => "PAULI_CHANNEL_1",
            Gate::Detector => "DETECTOR",
            Gate::ObservableInclude => "OBSERVABLE_INCLUDE",
            Gate::QubitCoords => "QUBIT_COORDS",
            Gate::ShiftCoords => "SHIFT_COORDS",
            Gate::Tick => "TICK",
            Gate::Unknown(name) => name,
        }
    }

    /// Operation class of this gate.
    pub fn class(&self) -> OpClass {
        match self {
            Gate::I
            | Gate::X
            | Gate::Y
            | Gate::Z
            | Gate::H
            | Gate::S
            | Gate::SDag
            | Gate::SqrtX
            | Gate::SqrtXDag => OpClass::SingleQubit,
            Gate::CX | Gate::CY | Gate::CZ | Gate::Swap => OpClass::TwoQubit,
            Gate::M | Gate::MX => OpClass::Measurement,
            Gate::R | Gate::RX => OpClass::Reset,
            Gate::MR | Gate::MRX => OpClass::MeasureReset,
            Gate::XError
            | Gate::YError
            | Gate::ZError
            | Gate::Depolarize1
            | Gate::Depolarize2
            | Gate::PauliChannel1 => OpClass::Noise,
            Gate::Detector
            | Gate::ObservableInclude
            | Gate::QubitCoords
            | Gate::ShiftCoords
            | Gate::Tick => OpClass::Annotation,
            Gate::Unknown(_) => OpClass::Unknown,
        }
    }

    /// Number of qubits each application acts on (targets come in groups of this size).
    pub fn target_group_size(&self) -> usize {
        match self {
            Gate::CX | Gate::CY | Gate::CZ | Gate::Swap | Gate::Depolarize2 => 2,
            _ => 1,
        }
    }

    /// Whether this gate writes to the measurement record.
    pub fn produces_measurements(&self) -> bool {
        matches!(self.class(), OpClass::Measurement | OpClass::MeasureReset)
    }

    /// Whether targets are measurement-record lookbacks rather than qubits.
    pub fn takes_record_targets(&self) -> bool {
        matches!(self, Gate::Detector | Gate::ObservableInclude)
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_canonical_names() {
        assert_eq!(Gate::from_name("cnot"), Gate::CX);
        assert_eq!(Gate::from_name("ZCX"), Gate::CX);
        assert_eq!(Gate::from_name("mz"), Gate::M);
        assert_eq!(Gate::from_name("RZ"), Gate::R);
        assert_eq!(Gate::from_name("cnot").name(), "CX");
    }

    #[test]
    fn test_unknown_name_is_preserved() {
        let gate = Gate::from_name("Heralded_Erase");
        assert_eq!(gate, Gate::Unknown("Heralded_Erase".into()));
        assert_eq!(gate.name(), "Heralded_Erase");
        assert_eq!(gate.class(), OpClass::Unknown);
    }

    #[test]
    fn test_classes() {
        assert_eq!(Gate::H.class(), OpClass::SingleQubit);
        assert_eq!(Gate::CZ.class(), OpClass::TwoQubit);
        assert_eq!(Gate::MX.class(), OpClass::Measurement);
        assert_eq!(Gate::RX.class(), OpClass::Reset);
        assert_eq!(Gate::MR.class(), OpClass::MeasureReset);
        assert_eq!(Gate::Depolarize2.class(), OpClass::Noise);
        assert_eq!(Gate::Tick.class(), OpClass::Annotation);
        assert_eq!(Gate::Depolarize2.target_group_size(), 2);
        assert!(Gate::MR.produces_measurements());
        assert!(!Gate::R.produces_measurements());
    }
}
