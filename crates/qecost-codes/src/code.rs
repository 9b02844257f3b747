//! The code contract shared by every generator.

use std::fmt;

use qecost_ir::Circuit;
use serde::{Deserialize, Serialize};

use crate::error::{CodeError, CodeResult};

/// Families of codes with a circuit generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CodeFamily {
    /// Rotated planar surface code.
    RotatedSurface,
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeFamily::RotatedSurface => write!(f, "rotated_surface"),
        }
    }
}

/// Which logical observable a memory experiment protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBasis {
    /// Prepare and measure in the X basis.
    #[default]
    X,
    /// Prepare and measure in the Z basis.
    Z,
}

impl fmt::Display for MemoryBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryBasis::X => write!(f, "x"),
            MemoryBasis::Z => write!(f, "z"),
        }
    }
}

/// A quantum error-correcting code that can emit a memory-experiment circuit.
///
/// Implementations are immutable configuration: generating a circuit is a
/// pure function of the code parameters and the physical error rate.
pub trait Code: Send + Sync {
    /// The code family.
    fn family(&self) -> CodeFamily;

    /// Code distance.
    fn distance(&self) -> u32;

    /// Number of syndrome-extraction rounds.
    fn rounds(&self) -> u32;

    /// Generate the noisy memory-experiment circuit.
    ///
    /// Fails with [`CodeError::InvalidParameter`] unless
    /// `physical_error_rate` is a probability.
    fn generate_circuit(&self, physical_error_rate: f64) -> CodeResult<Circuit>;

    /// Decode a syndrome directly.
    ///
    /// Decoding belongs to a decoder bound to the generated circuit; codes
    /// only provide this when they carry their own lookup decoder.
    fn decode(&self, _syndrome: &[bool]) -> CodeResult<Vec<bool>> {
        Err(CodeError::NotImplemented("Code::decode"))
    }
}
