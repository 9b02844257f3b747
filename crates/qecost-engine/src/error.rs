//! Engine error types.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while running or persisting simulations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A run or sweep parameter is outside its admissible range.
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the admissible range.
        expected: &'static str,
    },

    /// Code construction or circuit generation failed.
    #[error("Code error: {0}")]
    Code(#[from] qecost_codes::CodeError),

    /// Sampling failed.
    #[error("Sampling error: {0}")]
    Sim(#[from] qecost_sim::SimError),

    /// Decoder construction or decoding failed.
    #[error("Decoder error: {0}")]
    Decode(#[from] qecost_decode::DecodeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for EngineError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

/// Reject values that are not probabilities.
pub(crate) fn check_probability(name: &'static str, p: f64) -> EngineResult<f64> {
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(EngineError::InvalidParameter {
            name,
            value: p,
            expected: "a probability in [0, 1]",
        })
    }
}
