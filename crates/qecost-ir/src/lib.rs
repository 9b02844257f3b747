//! qecost Circuit Representation
//!
//! This crate provides the stabilizer-circuit data structures used by every
//! other qecost crate: instructions, REPEAT blocks, detector and observable
//! annotations, a line-oriented text format and circuit-level noise models.
//!
//! # Core Components
//!
//! - **Gates**: [`Gate`] names every supported instruction; [`OpClass`] groups
//!   them for energy accounting and sampling
//! - **Targets**: [`Target`] is a qubit or a measurement-record lookback
//! - **Instructions**: [`Instruction`] is validated on construction
//! - **Circuit**: [`Circuit`] with builders, derived counts and flattening
//! - **Noise**: [`NoiseModel`] appends a stochastic channel to a copy of a circuit
//!
//! # Example: Building and Parsing
//!
//! ```rust
//! use qecost_ir::{Circuit, Gate};
//!
//! let mut circuit = Circuit::new();
//! circuit.append(Gate::H, &[0], &[]).unwrap();
//! circuit.append(Gate::CX, &[0, 1], &[]).unwrap();
//! circuit.append(Gate::M, &[0, 1], &[]).unwrap();
//! circuit.append_detector(&[1, 2], &[]).unwrap();
//!
//! let parsed: Circuit = "H 0\nCX 0 1\nM 0 1\nDETECTOR rec[-1] rec[-2]\n".parse().unwrap();
//! assert_eq!(circuit, parsed);
//! assert_eq!(circuit.num_detectors(), 1);
//! ```
//!
//! # Supported Instructions
//!
//! | Instruction | Class | Notes |
//! |-------------|-------|-------|
//! | `I`, `X`, `Y`, `Z`, `H`, `S`, `S_DAG`, `SQRT_X`, `SQRT_X_DAG` | single-qubit | |
//! | `CX`, `CY`, `CZ`, `SWAP` | two-qubit | targets in pairs |
//! | `M`, `MX` | measurement | Z / X basis |
//! | `R`, `RX` | reset | Z / X basis |
//! | `MR`, `MRX` | measure-reset | |
//! | `X_ERROR`, `Y_ERROR`, `Z_ERROR`, `DEPOLARIZE1`, `DEPOLARIZE2`, `PAULI_CHANNEL_1` | noise | probability arguments |
//! | `DETECTOR`, `OBSERVABLE_INCLUDE`, `QUBIT_COORDS`, `SHIFT_COORDS`, `TICK` | annotation | |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod lexer;
pub mod noise;
pub mod parser;
pub mod target;

pub use circuit::{Circuit, CircuitStats, FlatInstructions, Operation};
pub use error::{IrError, IrResult};
pub use gate::{Gate, OpClass};
pub use instruction::{Instruction, MAX_INDEX, check_probability};
pub use noise::NoiseModel;
pub use parser::parse;
pub use target::Target;
