//! `qecost-codes`: quantum error-correcting codes as circuit generators.
//!
//! A [`Code`] turns its parameters and a physical error rate into a noisy
//! memory-experiment circuit with detectors and a logical observable. The
//! circuit is all the rest of the pipeline needs: samplers read detection
//! events from it and decoders derive their error model from it.
//!
//! # Example
//!
//! ```rust
//! use qecost_codes::{Code, RotatedSurfaceCode};
//!
//! let code = RotatedSurfaceCode::with_distance(3).unwrap();
//! let circuit = code.generate_circuit(0.001).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 17);
//! assert_eq!(circuit.num_detectors(), 24);
//! assert_eq!(circuit.num_observables(), 1);
//! ```

pub mod code;
pub mod error;
pub mod params;
pub mod surface;

pub use code::{Code, CodeFamily, MemoryBasis};
pub use error::{CodeError, CodeResult};
pub use params::NoiseParameters;
pub use surface::RotatedSurfaceCode;
