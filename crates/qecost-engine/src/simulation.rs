//! Simulation orchestrator.
//!
//! One run goes circuit → detection events → decoded prediction → tally:
//!
//! ```text
//! Configured ─► CircuitGenerated ─► EnergyComputed ─► Sampled
//!                                                        │
//!          Done ◄── Aggregated ◄── Decoded ◄─────────────┘
//! ```
//!
//! A run is a pure function of the code, the energy model, the seed and its
//! arguments.

use std::fmt;

use qecost_codes::Code;
use qecost_decode::{DecodeError, DecodeResult, Decoder, MatchingDecoder};
use qecost_ir::Circuit;
use qecost_sim::DetectorSampler;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::energy::EnergyModel;
use crate::error::{EngineError, EngineResult, check_probability};
use crate::result::SimulationResult;

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    Configured,
    CircuitGenerated,
    EnergyComputed,
    Sampled,
    Decoded,
    Aggregated,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Configured => "configured",
            RunStage::CircuitGenerated => "circuit_generated",
            RunStage::EnergyComputed => "energy_computed",
            RunStage::Sampled => "sampled",
            RunStage::Decoded => "decoded",
            RunStage::Aggregated => "aggregated",
            RunStage::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Runs memory experiments of one code under one energy model.
#[derive(Debug, Clone)]
pub struct Simulation<C: Code> {
    code: C,
    energy_model: EnergyModel,
    seed: u64,
}

impl<C: Code> Simulation<C> {
    /// Create a simulation with seed 0.
    pub fn new(code: C, energy_model: EnergyModel) -> Self {
        Self {
            code,
            energy_model,
            seed: 0,
        }
    }

    /// Seed for the sampler's random number generator.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn code(&self) -> &C {
        &self.code
    }

    pub fn energy_model(&self) -> &EnergyModel {
        &self.energy_model
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run `shots` trials at `physical_error_rate`.
    ///
    /// `decoder_factory` is called exactly once, with the generated circuit.
    #[allow(clippy::cast_precision_loss)]
    pub fn run<D, F>(
        &self,
        physical_error_rate: f64,
        shots: u64,
        decoder_factory: F,
    ) -> EngineResult<SimulationResult>
    where
        D: Decoder,
        F: FnOnce(&Circuit) -> DecodeResult<D>,
    {
        if shots == 0 {
            return Err(EngineError::InvalidParameter {
                name: "shots",
                value: 0.0,
                expected: "at least one shot",
            });
        }
        check_probability("physical_error_rate", physical_error_rate)?;
        self.energy_model.validate()?;
        let batch_size = usize::try_from(shots).map_err(|_| EngineError::InvalidParameter {
            name: "shots",
            value: shots as f64,
            expected: "a batch that fits in memory",
        })?;
        self.stage(RunStage::Configured, physical_error_rate);

        let circuit = self.code.generate_circuit(physical_error_rate)?;
        self.stage(RunStage::CircuitGenerated, physical_error_rate);

        let circuit_energy = self.energy_model.calculate_circuit_energy(&circuit);
        self.stage(RunStage::EnergyComputed, physical_error_rate);

        let sampler = DetectorSampler::new(&circuit)?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let batch = sampler.sample(batch_size, &mut rng)?;
        self.stage(RunStage::Sampled, physical_error_rate);

        let mut decoder = decoder_factory(&circuit)?;
        let predictions = decoder.decode_shots(batch.detection_events.view())?;
        if predictions.dim() != batch.observable_flips.dim() {
            return Err(DecodeError::ShapeMismatch {
                expected: batch.observable_flips.ncols(),
                got: predictions.ncols(),
            }
            .into());
        }
        self.stage(RunStage::Decoded, physical_error_rate);

        let logical_errors = predictions
            .rows()
            .into_iter()
            .zip(batch.observable_flips.rows())
            .filter(|(predicted, actual)| predicted != actual)
            .count() as u64;
        let detection_events = batch.total_detection_events();
        let decoding_energy = if self.energy_model.decoding_event_cost > 0.0 {
            self.energy_model.calculate_decoding_energy(detection_events)
        } else {
            0.0
        };
        let result = SimulationResult::new(
            physical_error_rate,
            logical_errors,
            shots,
            circuit_energy,
            detection_events,
            decoding_energy,
        )?;
        self.stage(RunStage::Aggregated, physical_error_rate);

        info!(
            family = %self.code.family(),
            distance = self.code.distance(),
            p = physical_error_rate,
            shots,
            logical_errors,
            decoder = decoder.name(),
            "run complete"
        );
        self.stage(RunStage::Done, physical_error_rate);
        Ok(result)
    }

    /// [`run`](Self::run) with a [`MatchingDecoder`] built from the circuit.
    pub fn run_matching(&self, physical_error_rate: f64, shots: u64) -> EngineResult<SimulationResult> {
        self.run(physical_error_rate, shots, MatchingDecoder::from_circuit)
    }

    fn stage(&self, stage: RunStage, physical_error_rate: f64) {
        debug!(
            %stage,
            distance = self.code.distance(),
            p = physical_error_rate,
            "simulation stage"
        );
    }
}
