//! `qecost-engine`: energy-aware QEC memory experiments.
//!
//! Ties the stack together: a [`Code`](qecost_codes::Code) generates a noisy
//! circuit, the sampler draws detection events, a decoder predicts the
//! logical flips, and an [`EnergyModel`] prices the circuit and the decoding
//! work.
//!
//! - [`Simulation`]: one `(code, p)` run
//! - [`Sweep`]: parallel runs over distances and error rates
//! - [`export`] and [`plot`]: persisted results and plot artifacts
//!
//! # Example
//!
//! ```rust
//! use qecost_codes::RotatedSurfaceCode;
//! use qecost_engine::{EnergyModel, Simulation};
//!
//! let code = RotatedSurfaceCode::with_distance(3).unwrap();
//! let simulation = Simulation::new(code, EnergyModel::default()).with_seed(1);
//! let result = simulation.run_matching(0.0, 100).unwrap();
//!
//! assert_eq!(result.logical_errors(), 0);
//! assert_eq!(result.total_energy(), result.circuit_energy() * 100.0);
//! ```

pub mod energy;
pub mod error;
pub mod export;
pub mod plot;
pub mod result;
pub mod simulation;
pub mod sweep;

pub use energy::{EnergyModel, instruction_histogram};
pub use error::{EngineError, EngineResult};
pub use export::{DistanceSeries, ExportConfig, RESULTS_FILE, SweepResults, load_results, save_results};
pub use plot::{
    AxisScale, ENERGY_PLOT_FILE, PLOT_RENDER_NOTE, PlotSeries, PlotSpec, THRESHOLD_PLOT_FILE, write_plots,
};
pub use result::SimulationResult;
pub use simulation::{RunStage, Simulation};
pub use sweep::{DecoderKind, Sweep, SweepConfig, SweepFailure, SweepOutcome, SweepPoint, logspace};
