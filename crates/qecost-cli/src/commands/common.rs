//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};

use qecost_codes::MemoryBasis;
use qecost_engine::{DecoderKind, SweepConfig};

/// Load the sweep configuration, or the built-in default when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<SweepConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            SweepConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(SweepConfig::default()),
    }
}

/// Parse a memory basis name.
pub fn parse_basis(name: &str) -> Result<MemoryBasis> {
    match name.to_lowercase().as_str() {
        "x" => Ok(MemoryBasis::X),
        "z" => Ok(MemoryBasis::Z),
        other => anyhow::bail!("Unknown basis: '{other}'. Available: x, z"),
    }
}

/// Parse a decoder name.
pub fn parse_decoder(name: &str) -> Result<DecoderKind> {
    match name.to_lowercase().as_str() {
        "matching" | "mwpm" => Ok(DecoderKind::Matching),
        "parity" => Ok(DecoderKind::Parity),
        other => anyhow::bail!("Unknown decoder: '{other}'. Available: matching, parity"),
    }
}
