//! Error types for the codes crate.

use thiserror::Error;

/// Errors produced by code constructors and circuit generators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodeError {
    /// A code or noise parameter is outside its admissible range.
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the admissible range.
        expected: &'static str,
    },

    /// The operation exists on the contract but this code does not provide it.
    #[error("{0} is not implemented for this code")]
    NotImplemented(&'static str),

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qecost_ir::IrError),
}

/// Result type for code operations.
pub type CodeResult<T> = Result<T, CodeError>;
