//! Error types for the decode crate.

use thiserror::Error;

/// Errors produced while building or running a decoder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The circuit cannot be decoded, e.g. it declares no detectors.
    #[error("Incompatible circuit: {0}")]
    IncompatibleCircuit(String),

    /// A detection-event batch has the wrong number of columns.
    #[error("Detection events have {got} columns, decoder expects {expected}")]
    ShapeMismatch {
        /// Detector count of the decoder.
        expected: usize,
        /// Column count of the batch.
        got: usize,
    },

    /// Error-model extraction failed.
    #[error("Sampling backend error: {0}")]
    Sim(#[from] qecost_sim::SimError),
}

/// Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
