//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A numeric parameter is outside its admissible range.
    #[error("Invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the admissible range.
        expected: &'static str,
    },

    /// Instruction received the wrong number of parenthesized arguments.
    #[error("Instruction '{gate_name}' takes {expected} argument(s), got {got}")]
    ArgCountMismatch {
        /// Name of the instruction.
        gate_name: String,
        /// Expected argument count, as text (e.g. "1" or "0 or 1").
        expected: &'static str,
        /// Actual number of arguments provided.
        got: usize,
    },

    /// Instruction targets are malformed for the instruction kind.
    #[error("Invalid targets for '{gate_name}': {reason}")]
    InvalidTargets {
        /// Name of the instruction.
        gate_name: String,
        /// What is wrong with the targets.
        reason: String,
    },

    /// REPEAT block with a zero repetition count.
    #[error("REPEAT count must be at least 1")]
    EmptyRepeat,

    /// Source text contained a character sequence that is not a token.
    #[error("Lexer error at byte {position}: {message}")]
    Lexer {
        /// Byte offset of the bad token.
        position: usize,
        /// Error message.
        message: String,
    },

    /// Source text is not a well-formed circuit.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Error message.
        message: String,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
