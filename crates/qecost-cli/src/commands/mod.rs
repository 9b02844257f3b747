//! CLI command implementations.

pub mod common;
pub mod simulate;
pub mod sweep;
pub mod version;
