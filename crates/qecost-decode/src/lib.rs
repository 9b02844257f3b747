//! `qecost-decode`: decoders for memory experiments.
//!
//! A [`Decoder`] is bound to one circuit and turns a batch of detection
//! events into predicted logical observable flips.
//!
//! - [`MatchingDecoder`]: minimum-weight perfect matching on the circuit's
//!   detector error model, solved with `fusion-blossom`
//! - [`ParityDecoder`]: odd-parity reference decoder
//!
//! # Example
//!
//! ```rust
//! use qecost_codes::{Code, RotatedSurfaceCode};
//! use qecost_decode::{Decoder, MatchingDecoder};
//! use ndarray::Array2;
//!
//! let circuit = RotatedSurfaceCode::with_distance(3).unwrap().generate_circuit(0.001).unwrap();
//! let mut decoder = MatchingDecoder::from_circuit(&circuit).unwrap();
//!
//! let quiet = Array2::from_elem((4, decoder.num_detectors()), false);
//! let predictions = decoder.decode_shots(quiet.view()).unwrap();
//! assert!(predictions.iter().all(|&flip| !flip));
//! ```

pub mod decoder;
pub mod error;
pub mod graph;
pub mod matching;
pub mod parity;

pub use decoder::{Correction, Decoder, Pauli, check_shape};
pub use error::{DecodeError, DecodeResult};
pub use graph::{MatchEdge, MatchingGraph};
pub use matching::MatchingDecoder;
pub use parity::ParityDecoder;
