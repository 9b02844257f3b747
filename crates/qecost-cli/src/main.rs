//! qecost Command-Line Interface
//!
//! With no subcommand, `qecost` reproduces the threshold and energy study:
//! it reuses `simulation_results.json` when present, otherwise runs the
//! sweep and saves it, then writes both plot artifacts into `paper/`.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{simulate, sweep, version};

/// qecost - energy cost of surface code memory experiments
#[derive(Parser, Debug)]
#[command(name = "qecost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Sweep configuration (YAML or JSON)
    #[arg(short, long, global = true, env = "QECOST_CONFIG")]
    config: Option<PathBuf>,

    /// Results file to reuse or write
    #[arg(long, default_value = qecost_engine::RESULTS_FILE)]
    results: PathBuf,

    /// Directory for plot artifacts (JSON plot specifications)
    #[arg(short, long, default_value = "paper")]
    output_dir: PathBuf,

    /// Re-run the sweep even if the results file exists
    #[arg(long)]
    force: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one memory experiment and print the result as JSON
    Simulate {
        /// Code distance
        #[arg(short, long, default_value = "3")]
        distance: u32,

        /// Physical error rate
        #[arg(short = 'p', long, default_value = "0.001")]
        physical_error_rate: f64,

        /// Number of shots (defaults to the configuration's)
        #[arg(short, long)]
        shots: Option<u64>,

        /// Syndrome rounds (defaults to the distance)
        #[arg(long)]
        rounds: Option<u32>,

        /// Memory basis (x, z)
        #[arg(long)]
        basis: Option<String>,

        /// Decoder (matching, parity)
        #[arg(long)]
        decoder: Option<String>,

        /// RNG seed (defaults to the configuration's)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        None => sweep::execute(
            cli.config.as_deref(),
            &cli.results,
            &cli.output_dir,
            cli.force,
        ),

        Some(Commands::Simulate {
            distance,
            physical_error_rate,
            shots,
            rounds,
            basis,
            decoder,
            seed,
        }) => simulate::execute(
            cli.config.as_deref(),
            &simulate::SimulateArgs {
                distance,
                physical_error_rate,
                shots,
                rounds,
                basis,
                decoder,
                seed,
            },
        ),

        Some(Commands::Version) => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
