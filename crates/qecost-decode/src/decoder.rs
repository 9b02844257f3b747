//! The decoder contract.

use std::fmt;

use ndarray::{Array2, ArrayView2};

use crate::error::{DecodeError, DecodeResult};

/// Predicts logical observable flips from detection events.
///
/// A decoder is bound to one circuit: its detector and observable counts are
/// fixed at construction.
pub trait Decoder {
    /// Human-readable decoder name.
    fn name(&self) -> &str;

    /// Columns expected in a detection-event batch.
    fn num_detectors(&self) -> usize;

    /// Columns produced per shot.
    fn num_observables(&self) -> usize;

    /// Predict observable flips for every shot of a batch.
    ///
    /// `detection_events` is `shots × num_detectors`; the result is
    /// `shots × num_observables`.
    fn decode_shots(&mut self, detection_events: ArrayView2<'_, bool>)
    -> DecodeResult<Array2<bool>>;
}

/// Reject batches whose column count differs from the decoder's detectors.
pub fn check_shape(decoder: &dyn Decoder, detection_events: &ArrayView2<'_, bool>) -> DecodeResult<()> {
    let got = detection_events.ncols();
    let expected = decoder.num_detectors();
    if got == expected {
        Ok(())
    } else {
        Err(DecodeError::ShapeMismatch { expected, got })
    }
}

/// Single-qubit Pauli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pauli::X => write!(f, "X"),
            Pauli::Y => write!(f, "Y"),
            Pauli::Z => write!(f, "Z"),
        }
    }
}

/// A physical correction: apply `pauli` to `qubit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Correction {
    pub qubit: u32,
    pub pauli: Pauli,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pauli, self.qubit)
    }
}
