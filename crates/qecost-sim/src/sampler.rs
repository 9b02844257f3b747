//! Detector and observable sampling.

use ndarray::Array2;
use qecost_ir::{Circuit, Instruction};
use rand::Rng;

use crate::bits::{BitMatrix, ones_in};
use crate::error::SimResult;
use crate::frame::FrameSimulator;
use crate::record::RecordLayout;

/// Outcome of sampling a batch of shots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBatch {
    /// `shots × num_detectors`; `true` marks a detection event.
    pub detection_events: Array2<bool>,
    /// `shots × num_observables`; `true` marks a flipped logical observable.
    pub observable_flips: Array2<bool>,
}

impl SampleBatch {
    pub fn num_shots(&self) -> usize {
        self.detection_events.nrows()
    }

    /// Detection events in one shot.
    pub fn detection_event_count(&self, shot: usize) -> u64 {
        self.detection_events
            .row(shot)
            .iter()
            .filter(|&&fired| fired)
            .count() as u64
    }

    /// Detection events summed over the batch.
    pub fn total_detection_events(&self) -> u64 {
        self.detection_events.iter().filter(|&&fired| fired).count() as u64
    }
}

/// A circuit prepared for repeated sampling.
///
/// Lookbacks are resolved and the circuit is validated once, at
/// construction; [`DetectorSampler::sample`] only propagates frames.
#[derive(Debug, Clone)]
pub struct DetectorSampler {
    instructions: Vec<Instruction>,
    layout: RecordLayout,
    num_qubits: usize,
}

impl DetectorSampler {
    /// Prepare `circuit` for sampling.
    pub fn new(circuit: &Circuit) -> SimResult<Self> {
        let layout = RecordLayout::from_circuit(circuit)?;
        Ok(Self {
            instructions: circuit.iter_flat().cloned().collect(),
            layout,
            num_qubits: circuit.num_qubits() as usize,
        })
    }

    pub fn num_detectors(&self) -> usize {
        self.layout.num_detectors()
    }

    pub fn num_observables(&self) -> usize {
        self.layout.num_observables()
    }

    /// Sample `shots` independent executions.
    pub fn sample<R: Rng>(&self, shots: usize, rng: &mut R) -> SimResult<SampleBatch> {
        let mut sim = FrameSimulator::new(self.num_qubits, self.layout.num_measurements(), shots);
        for inst in &self.instructions {
            sim.apply(inst, rng)?;
        }
        let record = sim.into_record();

        let detection_events = parity_columns(&record, self.layout.detectors(), shots);
        let observable_flips = parity_columns(&record, self.layout.observables(), shots);

        tracing::debug!(
            shots,
            detectors = self.num_detectors(),
            observables = self.num_observables(),
            "sampled detector batch"
        );

        Ok(SampleBatch {
            detection_events,
            observable_flips,
        })
    }
}

/// Column `j` of the result is the XOR of the record rows listed in `groups[j]`.
fn parity_columns(record: &BitMatrix, groups: &[Vec<usize>], shots: usize) -> Array2<bool> {
    let mut out = Array2::from_elem((shots, groups.len()), false);
    let mut acc = BitMatrix::zeros(1, shots);
    for (j, measurements) in groups.iter().enumerate() {
        acc.clear_row(0);
        for &m in measurements {
            acc.xor_row_from(record, m, 0);
        }
        for shot in ones_in(acc.row(0)) {
            out[[shot, j]] = true;
        }
    }
    out
}
