//! Batched Pauli-frame simulation.
//!
//! ## Layout
//!
//! Frames are stored as `(n_qubits × n_shots)` bit matrices, one for the X
//! component and one for the Z component. Row `q` holds the error on qubit
//! `q` across all shots, so Clifford gates become row XORs.
//!
//! ## Semantics
//!
//! The frame is the Pauli error relative to the noiseless execution. A
//! Z-basis measurement therefore records the X component of the frame, and
//! the recorded bit is the flip of that measurement relative to the
//! noiseless reference. Detection events and observable flips follow by
//! XOR-ing recorded flips.
//!
//! After a measurement or reset the component that no longer affects the
//! qubit's state (Z after a Z-basis measurement or reset, X after an X-basis
//! one) is randomized. That component is a stabilizer of the post-measurement
//! state, so deterministic detectors are unaffected while non-deterministic
//! ones fire with probability 1/2, as they would on hardware.

// Allow notation like X_c → X_c X_t in doc comments
#![allow(clippy::doc_markdown)]

use qecost_ir::{Gate, Instruction};
use rand::Rng;

use crate::bits::BitMatrix;
use crate::error::{SimError, SimResult};
use crate::geometric::GeometricSampler;

/// Pauli error frame propagator for batched multi-shot simulation.
pub struct FrameSimulator {
    x: BitMatrix,
    z: BitMatrix,
    record: BitMatrix,
    next_measurement: usize,
    shots: usize,
}

impl FrameSimulator {
    /// Create a simulator with all frames initialized to identity (no error).
    pub fn new(num_qubits: usize, num_measurements: usize, shots: usize) -> Self {
        Self {
            x: BitMatrix::zeros(num_qubits, shots),
            z: BitMatrix::zeros(num_qubits, shots),
            record: BitMatrix::zeros(num_measurements, shots),
            next_measurement: 0,
            shots,
        }
    }

    /// Consume the simulator and return the measurement-flip record,
    /// one row per measurement, one column per shot.
    pub fn into_record(self) -> BitMatrix {
        self.record
    }

    /// Propagate the frame through one instruction.
    pub fn apply<R: Rng>(&mut self, inst: &Instruction, rng: &mut R) -> SimResult<()> {
        let qubits: Vec<usize> = inst.qubits().map(|q| q as usize).collect();
        match inst.gate() {
            Gate::I | Gate::X | Gate::Y | Gate::Z => {}
            Gate::H => qubits.iter().for_each(|&q| self.x.swap_row_with(&mut self.z, q)),
            // X → Y, Z → Z
            Gate::S | Gate::SDag => qubits.iter().for_each(|&q| self.z.xor_row_from(&self.x, q, q)),
            // Z → Y, X → X
            Gate::SqrtX | Gate::SqrtXDag => {
                qubits.iter().for_each(|&q| self.x.xor_row_from(&self.z, q, q));
            }
            Gate::CX => pairs(&qubits).for_each(|(c, t)| self.apply_cx(c, t)),
            Gate::CY => pairs(&qubits).for_each(|(c, t)| self.apply_cy(c, t)),
            Gate::CZ => pairs(&qubits).for_each(|(a, b)| self.apply_cz(a, b)),
            Gate::Swap => pairs(&qubits).for_each(|(a, b)| {
                self.x.swap_rows(a, b);
                self.z.swap_rows(a, b);
            }),
            Gate::M => qubits.iter().for_each(|&q| self.measure(q, false, rng)),
            Gate::MX => qubits.iter().for_each(|&q| self.measure(q, true, rng)),
            Gate::R => qubits.iter().for_each(|&q| self.reset(q, false, rng)),
            Gate::RX => qubits.iter().for_each(|&q| self.reset(q, true, rng)),
            Gate::MR => qubits.iter().for_each(|&q| {
                self.record_flip(q, false);
                self.reset(q, false, rng);
            }),
            Gate::MRX => qubits.iter().for_each(|&q| {
                self.record_flip(q, true);
                self.reset(q, true, rng);
            }),
            Gate::XError => self.pauli_error(&qubits, inst.args()[0], true, false, rng),
            Gate::YError => self.pauli_error(&qubits, inst.args()[0], true, true, rng),
            Gate::ZError => self.pauli_error(&qubits, inst.args()[0], false, true, rng),
            Gate::Depolarize1 => self.depolarize1(&qubits, inst.args()[0], rng),
            Gate::Depolarize2 => self.depolarize2(&qubits, inst.args()[0], rng),
            Gate::PauliChannel1 => self.pauli_channel_1(&qubits, inst.args(), rng),
            Gate::Detector
            | Gate::ObservableInclude
            | Gate::QubitCoords
            | Gate::ShiftCoords
            | Gate::Tick => {}
            other => return Err(SimError::UnsupportedInstruction(other.name().to_string())),
        }
        Ok(())
    }

    // ========== Gate Propagation ==========

    /// CX(c, t): X_c → X_c X_t, Z_t → Z_c Z_t
    fn apply_cx(&mut self, c: usize, t: usize) {
        self.x.xor_row(c, t);
        self.z.xor_row(t, c);
    }

    /// CY(c, t): X_c → X_c Y_t, X_t → Z_c X_t, Z_t → Z_c Z_t
    fn apply_cy(&mut self, c: usize, t: usize) {
        self.z.xor_row(t, c);
        self.z.xor_row_from(&self.x, t, c);
        self.x.xor_row(c, t);
        self.z.xor_row_from(&self.x, c, t);
    }

    /// CZ(a, b): X_a → X_a Z_b, X_b → Z_a X_b
    fn apply_cz(&mut self, a: usize, b: usize) {
        self.z.xor_row_from(&self.x, a, b);
        self.z.xor_row_from(&self.x, b, a);
    }

    fn measure<R: Rng>(&mut self, q: usize, x_basis: bool, rng: &mut R) {
        self.record_flip(q, x_basis);
        if x_basis {
            self.x.randomize_row(q, rng);
        } else {
            self.z.randomize_row(q, rng);
        }
    }

    fn record_flip(&mut self, q: usize, x_basis: bool) {
        let m = self.next_measurement;
        self.next_measurement += 1;
        let frame = if x_basis { &self.z } else { &self.x };
        self.record.copy_row_from(frame, q, m);
    }

    fn reset<R: Rng>(&mut self, q: usize, x_basis: bool, rng: &mut R) {
        if x_basis {
            self.z.clear_row(q);
            self.x.randomize_row(q, rng);
        } else {
            self.x.clear_row(q);
            self.z.randomize_row(q, rng);
        }
    }

    // ========== Noise ==========

    fn pauli_error<R: Rng>(&mut self, qubits: &[usize], p: f64, flip_x: bool, flip_z: bool, rng: &mut R) {
        if p <= 0.0 {
            return;
        }
        let mut sampler = GeometricSampler::new(p);
        for &q in qubits {
            sampler.for_each_hit(self.shots, rng, |shot, _| {
                if flip_x {
                    self.x.flip(q, shot);
                }
                if flip_z {
                    self.z.flip(q, shot);
                }
            });
        }
    }

    fn depolarize1<R: Rng>(&mut self, qubits: &[usize], p: f64, rng: &mut R) {
        if p <= 0.0 {
            return;
        }
        let mut sampler = GeometricSampler::new(p);
        for &q in qubits {
            sampler.for_each_hit(self.shots, rng, |shot, rng| {
                let pauli: u8 = rng.gen_range(1..4);
                self.flip_pauli(q, shot, pauli);
            });
        }
    }

    fn depolarize2<R: Rng>(&mut self, qubits: &[usize], p: f64, rng: &mut R) {
        if p <= 0.0 {
            return;
        }
        let mut sampler = GeometricSampler::new(p);
        for (a, b) in pairs(qubits) {
            sampler.for_each_hit(self.shots, rng, |shot, rng| {
                let pauli: u8 = rng.gen_range(1..16);
                self.flip_pauli(a, shot, pauli & 3);
                self.flip_pauli(b, shot, pauli >> 2);
            });
        }
    }

    fn pauli_channel_1<R: Rng>(&mut self, qubits: &[usize], args: &[f64], rng: &mut R) {
        let (px, py, pz) = (args[0], args[1], args[2]);
        let total = px + py + pz;
        if total <= 0.0 {
            return;
        }
        let mut sampler = GeometricSampler::new(total.min(1.0));
        for &q in qubits {
            sampler.for_each_hit(self.shots, rng, |shot, rng| {
                let u: f64 = rng.gen_range(0.0..total);
                let pauli = if u < px {
                    1
                } else if u < px + py {
                    3
                } else {
                    2
                };
                self.flip_pauli(q, shot, pauli);
            });
        }
    }

    /// Multiply a single-qubit Pauli into the frame: bit 0 is X, bit 1 is Z.
    fn flip_pauli(&mut self, q: usize, shot: usize, pauli: u8) {
        if pauli & 1 != 0 {
            self.x.flip(q, shot);
        }
        if pauli & 2 != 0 {
            self.z.flip(q, shot);
        }
    }
}

fn pairs(qubits: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    qubits.chunks_exact(2).map(|p| (p[0], p[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecost_ir::Circuit;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn run(source: &str, shots: usize) -> BitMatrix {
        let circuit: Circuit = source.parse().unwrap();
        let mut sim = FrameSimulator::new(
            circuit.num_qubits() as usize,
            circuit.num_measurements() as usize,
            shots,
        );
        let mut rng = SmallRng::seed_from_u64(11);
        for inst in circuit.iter_flat() {
            sim.apply(inst, &mut rng).unwrap();
        }
        sim.into_record()
    }

    #[test]
    fn test_x_error_flips_z_measurement() {
        let record = run("X_ERROR(1) 0\nM 0\n", 10);
        assert_eq!(record.count_ones(0), 10);
    }

    #[test]
    fn test_z_error_invisible_to_z_measurement() {
        let record = run("Z_ERROR(1) 0 1\nM 0\nMX 1\n", 10);
        assert_eq!(record.count_ones(0), 0);
        assert_eq!(record.count_ones(1), 10);
    }

    #[test]
    fn test_measurement_in_other_basis_is_random() {
        let shots = 10_000;
        for source in ["RX 0\nM 0\n", "R 0\nMX 0\n", "M 0\nMX 0\n", "MRX 0\nM 0\n"] {
            let record = run(source, shots);
            let last = record.rows() - 1;
            let rate = record.count_ones(last) as f64 / shots as f64;
            assert!((rate - 0.5).abs() < 0.03, "{source:?}: rate = {rate}");
        }
    }

    #[test]
    fn test_repeated_measurement_is_deterministic() {
        let record = run("RX 0\nMX 0\nR 1\nM 1\nM 1\nMR 1\nM 1\n", 256);
        for row in 0..record.rows() {
            assert_eq!(record.count_ones(row), 0, "measurement {row}");
        }
    }

    #[test]
    fn test_hadamard_swaps_error_type() {
        let record = run("Z_ERROR(1) 0\nH 0\nM 0\n", 4);
        assert_eq!(record.count_ones(0), 4);
    }

    #[test]
    fn test_cx_propagates_x_forward_and_z_backward() {
        let record = run("X_ERROR(1) 0\nZ_ERROR(1) 3\nCX 0 1 2 3\nM 0 1\nMX 2 3\n", 8);
        assert_eq!(record.count_ones(0), 8);
        assert_eq!(record.count_ones(1), 8);
        assert_eq!(record.count_ones(2), 8);
        assert_eq!(record.count_ones(3), 8);
    }

    #[test]
    fn test_cz_and_cy() {
        // X on control of CZ picks up Z on the other qubit.
        let record = run("X_ERROR(1) 0\nCZ 0 1\nMX 1\n", 5);
        assert_eq!(record.count_ones(0), 5);
        // X on control of CY becomes Y on target: flips both bases.
        let record = run("X_ERROR(1) 0\nCY 0 1\nM 1\n", 5);
        assert_eq!(record.count_ones(0), 5);
        let record = run("X_ERROR(1) 0\nCY 0 1\nMX 1\n", 5);
        assert_eq!(record.count_ones(0), 5);
    }

    #[test]
    fn test_reset_clears_frame() {
        let record = run("X_ERROR(1) 0\nMR 0\nM 0\n", 6);
        assert_eq!(record.count_ones(0), 6);
        assert_eq!(record.count_ones(1), 0);
    }

    #[test]
    fn test_unknown_instruction_rejected() {
        let circuit: Circuit = "HERALDED_ERASE(0.1) 0\n".parse().unwrap();
        let mut sim = FrameSimulator::new(1, 0, 4);
        let mut rng = SmallRng::seed_from_u64(0);
        let inst = circuit.iter_flat().next().unwrap();
        assert!(matches!(
            sim.apply(inst, &mut rng),
            Err(SimError::UnsupportedInstruction(name)) if name == "HERALDED_ERASE"
        ));
    }

    #[test]
    fn test_depolarize1_rate() {
        let shots = 100_000;
        let record = run("DEPOLARIZE1(0.3) 0\nM 0\n", shots);
        // X or Y flips a Z measurement: 2/3 of p.
        let rate = record.count_ones(0) as f64 / shots as f64;
        assert!((rate - 0.2).abs() < 0.01, "rate = {rate}");
    }
}
