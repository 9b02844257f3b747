//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced while sampling a circuit or extracting its error model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The circuit contains an instruction the sampler cannot simulate.
    #[error("Unsupported instruction '{0}'")]
    UnsupportedInstruction(String),

    /// A detector or observable looks further back than the record reaches.
    #[error("rec[-{lookback}] reaches before the start of the record ({available} measurements so far)")]
    RecordOutOfRange {
        /// The offending lookback.
        lookback: u32,
        /// Number of measurements recorded at that point.
        available: u64,
    },

    /// Observable masks are 64 bits wide.
    #[error("Circuit declares {0} observables, at most 64 are supported")]
    TooManyObservables(u32),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qecost_ir::IrError),
}

/// Result type for sampling and error-model operations.
pub type SimResult<T> = Result<T, SimError>;
