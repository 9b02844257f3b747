//! Parity reference decoder.

use ndarray::{Array2, ArrayView2};
use qecost_ir::Circuit;

use crate::decoder::{Correction, Decoder, Pauli, check_shape};
use crate::error::DecodeResult;

/// Flags a shot when an odd number of detectors fired.
///
/// Useful as a contract-shape stand-in for real decoders; it has no notion
/// of where an error happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityDecoder {
    num_detectors: usize,
    num_observables: usize,
}

impl ParityDecoder {
    pub fn new(num_detectors: usize, num_observables: usize) -> Self {
        Self {
            num_detectors,
            num_observables,
        }
    }

    /// Size the decoder to `circuit`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_circuit(circuit: &Circuit) -> Self {
        Self::new(
            circuit.num_detectors() as usize,
            circuit.num_observables() as usize,
        )
    }

    /// `None` for even parity, otherwise a fixed placeholder correction.
    pub fn decode(&self, syndrome: &[bool]) -> Option<Correction> {
        let odd = syndrome.iter().filter(|&&fired| fired).count() % 2 == 1;
        odd.then_some(Correction {
            qubit: 0,
            pauli: Pauli::X,
        })
    }
}

impl Decoder for ParityDecoder {
    fn name(&self) -> &str {
        "parity"
    }

    fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    fn num_observables(&self) -> usize {
        self.num_observables
    }

    fn decode_shots(&mut self, detection_events: ArrayView2<'_, bool>) -> DecodeResult<Array2<bool>> {
        check_shape(&*self, &detection_events)?;
        let mut predictions =
            Array2::from_elem((detection_events.nrows(), self.num_observables), false);
        for (shot, row) in detection_events.rows().into_iter().enumerate() {
            let fired = row.iter().filter(|&&fired| fired).count();
            if fired % 2 == 1 {
                predictions.row_mut(shot).fill(true);
            }
        }
        Ok(predictions)
    }
}
