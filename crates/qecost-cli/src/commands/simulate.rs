//! Simulate command implementation.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use qecost_codes::MemoryBasis;
use qecost_engine::{DecoderKind, SimulationResult, SweepConfig};

use super::common::{load_config, parse_basis, parse_decoder};

/// Arguments of a single run. Unset fields fall back to the configuration.
#[derive(Debug, Clone)]
pub struct SimulateArgs {
    pub distance: u32,
    pub physical_error_rate: f64,
    pub shots: Option<u64>,
    pub rounds: Option<u32>,
    pub basis: Option<String>,
    pub decoder: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SimulateReport<'a> {
    distance: u32,
    rounds: u32,
    basis: MemoryBasis,
    decoder: DecoderKind,
    seed: u64,
    logical_error_rate: f64,
    confidence_interval_95: (f64, f64),
    average_energy_per_shot: f64,
    result: &'a SimulationResult,
}

/// Execute the simulate command.
pub fn execute(config: Option<&Path>, args: &SimulateArgs) -> Result<()> {
    let config = resolve_config(config, args)?;
    println!("{}", report(&config, args)?);
    Ok(())
}

fn resolve_config(config: Option<&Path>, args: &SimulateArgs) -> Result<SweepConfig> {
    let mut config = load_config(config)?;
    if let Some(shots) = args.shots {
        config.shots = shots;
    }
    if args.rounds.is_some() {
        config.rounds = args.rounds;
    }
    if let Some(basis) = &args.basis {
        config.basis = parse_basis(basis)?;
    }
    if let Some(decoder) = &args.decoder {
        config.decoder = parse_decoder(decoder)?;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn report(config: &SweepConfig, args: &SimulateArgs) -> Result<String> {
    let result = config.run_point(args.distance, args.physical_error_rate, config.seed)?;
    let report = SimulateReport {
        distance: args.distance,
        rounds: config.rounds.unwrap_or(args.distance),
        basis: config.basis,
        decoder: config.decoder,
        seed: config.seed,
        logical_error_rate: result.logical_error_rate()?,
        confidence_interval_95: result.confidence_interval(1.96)?,
        average_energy_per_shot: result.average_energy_per_shot()?,
        result: &result,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
