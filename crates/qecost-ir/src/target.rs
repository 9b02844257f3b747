//! Instruction targets: qubits and measurement-record lookbacks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single instruction target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A qubit index.
    Qubit(u32),
    /// A lookback into the measurement record: `Rec(k)` is `rec[-k]`, `k >= 1`.
    Rec(u32),
}

impl Target {
    /// The qubit index, if this is a qubit target.
    pub fn qubit(self) -> Option<u32> {
        match self {
            Target::Qubit(q) => Some(q),
            Target::Rec(_) => None,
        }
    }

    /// The lookback distance, if this is a record target.
    pub fn lookback(self) -> Option<u32> {
        match self {
            Target::Rec(k) => Some(k),
            Target::Qubit(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Qubit(q) => write!(f, "{q}"),
            Target::Rec(k) => write!(f, "rec[-{k}]"),
        }
    }
}

impl From<u32> for Target {
    fn from(q: u32) -> Self {
        Target::Qubit(q)
    }
}
