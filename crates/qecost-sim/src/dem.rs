//! Detector error models.
//!
//! A detector error model (DEM) lists independent error mechanisms, each
//! with a probability and the set of detectors and observables it flips.
//!
//! ## Extraction
//!
//! The circuit is walked backwards while tracking, for every qubit, which
//! detectors and observables an X or a Z error at the current point would
//! flip (its *sensitivity*). Measurements seed sensitivities from the
//! record layout, resets clear them, and Clifford gates conjugate them.
//! Each noise channel met on the way contributes one candidate mechanism per
//! Pauli term, whose symptom is the XOR of the sensitivities involved.
//! Terms with identical symptoms merge as independent events:
//! `p = p1 (1 - p2) + p2 (1 - p1)`.
//!
//! ## Decomposition
//!
//! Matching needs graphlike mechanisms (at most two detectors). Mechanisms
//! with more detectors are split into their single-qubit single-Pauli
//! parts, whose XOR is the full symptom. If a part is still too large, the
//! detectors are paired greedily, preferring pairs that already occur as a
//! graphlike mechanism of their own.

use std::fmt;

use qecost_ir::{Circuit, Gate, Instruction};
use rustc_hash::FxHashMap;

use crate::bits::{BitMatrix, ones_in};
use crate::error::{SimError, SimResult};
use crate::record::RecordLayout;

/// Detectors and observables flipped by an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Symptom {
    /// Flipped detector indices, ascending.
    pub detectors: Vec<u32>,
    /// Bitmask of flipped observables.
    pub observables: u64,
}

impl Symptom {
    /// Decode a sensitivity row: columns below `num_detectors` are detectors,
    /// the rest are observables.
    #[allow(clippy::cast_possible_truncation)]
    fn from_words(words: &[u64], num_detectors: usize) -> Self {
        let mut symptom = Symptom::default();
        for column in ones_in(words) {
            if column < num_detectors {
                symptom.detectors.push(column as u32);
            } else {
                symptom.observables |= 1 << (column - num_detectors);
            }
        }
        symptom
    }

    /// Whether the error is invisible and harmless.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty() && self.observables == 0
    }

    /// Affects exactly one detector (an edge to the boundary).
    pub fn is_boundary(&self) -> bool {
        self.detectors.len() == 1
    }

    /// Affects exactly two detectors.
    pub fn is_edge(&self) -> bool {
        self.detectors.len() == 2
    }

    /// Affects more than two detectors.
    pub fn is_hyperedge(&self) -> bool {
        self.detectors.len() > 2
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for d in &self.detectors {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "D{d}")?;
            first = false;
        }
        for o in ones_in(&[self.observables]) {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "L{o}")?;
            first = false;
        }
        Ok(())
    }
}

/// One independent error mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMechanism {
    /// Probability that this mechanism fires in a shot.
    pub probability: f64,
    /// Everything the mechanism flips.
    pub symptom: Symptom,
    /// Graphlike parts whose XOR is `symptom`.
    pub components: Vec<Symptom>,
}

/// A detector error model extracted from a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorErrorModel {
    num_detectors: usize,
    num_observables: usize,
    mechanisms: Vec<ErrorMechanism>,
}

impl DetectorErrorModel {
    /// Extract and decompose the error model of `circuit`.
    pub fn from_circuit(circuit: &Circuit) -> SimResult<Self> {
        let layout = RecordLayout::from_circuit(circuit)?;
        let num_detectors = layout.num_detectors();
        let num_observables = layout.num_observables();
        let columns = num_detectors + num_observables;

        let mut fanout = BitMatrix::zeros(layout.num_measurements(), columns);
        for (m, cols) in layout.fanout().iter().enumerate() {
            for &c in cols {
                fanout.flip(m, c);
            }
        }

        let num_qubits = circuit.num_qubits() as usize;
        let mut walker = BackwardWalker {
            sens_x: BitMatrix::zeros(num_qubits, columns),
            sens_z: BitMatrix::zeros(num_qubits, columns),
            fanout,
            next_measurement: layout.num_measurements(),
            num_detectors,
            scratch: vec![0; columns.div_ceil(64)],
            index: FxHashMap::default(),
            raw: Vec::new(),
        };

        let instructions: Vec<&Instruction> = circuit.iter_flat().collect();
        for inst in instructions.into_iter().rev() {
            walker.apply(inst)?;
        }

        let mechanisms = decompose_all(walker.raw);
        tracing::debug!(
            detectors = num_detectors,
            observables = num_observables,
            mechanisms = mechanisms.len(),
            "extracted detector error model"
        );

        Ok(Self {
            num_detectors,
            num_observables,
            mechanisms,
        })
    }

    pub fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    pub fn num_observables(&self) -> usize {
        self.num_observables
    }

    pub fn mechanisms(&self) -> &[ErrorMechanism] {
        &self.mechanisms
    }

    /// Whether every component of every mechanism has at most two detectors.
    pub fn is_graphlike(&self) -> bool {
        self.mechanisms
            .iter()
            .flat_map(|m| &m.components)
            .all(|c| c.detectors.len() <= 2)
    }
}

impl fmt::Display for DetectorErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mechanism in &self.mechanisms {
            write!(f, "error({})", mechanism.probability)?;
            for (i, component) in mechanism.components.iter().enumerate() {
                if i > 0 {
                    write!(f, " ^")?;
                }
                write!(f, " {component}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backward sensitivity propagation
// ---------------------------------------------------------------------------

/// A Pauli factor of an error term: X or Z on one qubit.
#[derive(Clone, Copy)]
enum Factor {
    X(usize),
    Z(usize),
}

/// A mechanism before decomposition, with its single-factor parts.
struct RawMechanism {
    probability: f64,
    symptom: Symptom,
    parts: Vec<Symptom>,
}

struct BackwardWalker {
    sens_x: BitMatrix,
    sens_z: BitMatrix,
    fanout: BitMatrix,
    next_measurement: usize,
    num_detectors: usize,
    scratch: Vec<u64>,
    index: FxHashMap<Symptom, usize>,
    raw: Vec<RawMechanism>,
}

impl BackwardWalker {
    fn apply(&mut self, inst: &Instruction) -> SimResult<()> {
        let qubits: Vec<usize> = inst.qubits().map(|q| q as usize).collect();
        match inst.gate() {
            Gate::I | Gate::X | Gate::Y | Gate::Z => {}
            Gate::H => {
                for &q in &qubits {
                    self.sens_x.swap_row_with(&mut self.sens_z, q);
                }
            }
            // An X before S is a Y after it.
            Gate::S | Gate::SDag => {
                for &q in &qubits {
                    self.sens_x.xor_row_from(&self.sens_z, q, q);
                }
            }
            Gate::SqrtX | Gate::SqrtXDag => {
                for &q in &qubits {
                    self.sens_z.xor_row_from(&self.sens_x, q, q);
                }
            }
            Gate::CX => {
                for (c, t) in rev_pairs(&qubits) {
                    self.sens_x.xor_row(t, c);
                    self.sens_z.xor_row(c, t);
                }
            }
            Gate::CY => {
                for (c, t) in rev_pairs(&qubits) {
                    self.sens_x.xor_row(t, c);
                    self.sens_x.xor_row_from(&self.sens_z, t, c);
                    self.sens_x.xor_row_from(&self.sens_z, c, t);
                    self.sens_z.xor_row(c, t);
                }
            }
            Gate::CZ => {
                for (a, b) in rev_pairs(&qubits) {
                    self.sens_x.xor_row_from(&self.sens_z, b, a);
                    self.sens_x.xor_row_from(&self.sens_z, a, b);
                }
            }
            Gate::Swap => {
                for (a, b) in rev_pairs(&qubits) {
                    self.sens_x.swap_rows(a, b);
                    self.sens_z.swap_rows(a, b);
                }
            }
            Gate::M | Gate::MX => {
                let x_basis = *inst.gate() == Gate::MX;
                for &q in qubits.iter().rev() {
                    let m = self.take_measurement();
                    let sens = if x_basis { &mut self.sens_z } else { &mut self.sens_x };
                    sens.xor_row_from(&self.fanout, m, q);
                }
            }
            Gate::R | Gate::RX => {
                for &q in &qubits {
                    self.sens_x.clear_row(q);
                    self.sens_z.clear_row(q);
                }
            }
            Gate::MR | Gate::MRX => {
                let x_basis = *inst.gate() == Gate::MRX;
                for &q in qubits.iter().rev() {
                    let m = self.take_measurement();
                    self.sens_x.clear_row(q);
                    self.sens_z.clear_row(q);
                    let sens = if x_basis { &mut self.sens_z } else { &mut self.sens_x };
                    sens.copy_row_from(&self.fanout, m, q);
                }
            }
            Gate::XError => self.single_qubit_terms(&qubits, &[(inst.args()[0], 1)]),
            Gate::YError => self.single_qubit_terms(&qubits, &[(inst.args()[0], 3)]),
            Gate::ZError => self.single_qubit_terms(&qubits, &[(inst.args()[0], 2)]),
            Gate::Depolarize1 => {
                let p = inst.args()[0] / 3.0;
                self.single_qubit_terms(&qubits, &[(p, 1), (p, 3), (p, 2)]);
            }
            Gate::PauliChannel1 => {
                let args = inst.args();
                self.single_qubit_terms(&qubits, &[(args[0], 1), (args[1], 3), (args[2], 2)]);
            }
            Gate::Depolarize2 => {
                let p = inst.args()[0] / 15.0;
                if p > 0.0 {
                    for (a, b) in rev_pairs(&qubits) {
                        for pauli in 1u8..16 {
                            let mut factors = factors_of(a, pauli & 3);
                            factors.extend(factors_of(b, pauli >> 2));
                            self.add_term(p, &factors);
                        }
                    }
                }
            }
            Gate::Detector
            | Gate::ObservableInclude
            | Gate::QubitCoords
            | Gate::ShiftCoords
            | Gate::Tick => {}
            other => return Err(SimError::UnsupportedInstruction(other.name().to_string())),
        }
        Ok(())
    }

    fn take_measurement(&mut self) -> usize {
        self.next_measurement -= 1;
        self.next_measurement
    }

    /// `terms` pairs a probability with a Pauli code (bit 0 X, bit 1 Z).
    fn single_qubit_terms(&mut self, qubits: &[usize], terms: &[(f64, u8)]) {
        for &q in qubits {
            for &(p, pauli) in terms {
                if p > 0.0 {
                    self.add_term(p, &factors_of(q, pauli));
                }
            }
        }
    }

    fn add_term(&mut self, probability: f64, factors: &[Factor]) {
        self.scratch.fill(0);
        for factor in factors {
            let row = match *factor {
                Factor::X(q) => self.sens_x.row(q),
                Factor::Z(q) => self.sens_z.row(q),
            };
            for (s, w) in self.scratch.iter_mut().zip(row) {
                *s ^= w;
            }
        }
        let symptom = Symptom::from_words(&self.scratch, self.num_detectors);
        if symptom.is_empty() {
            return;
        }

        if let Some(&i) = self.index.get(&symptom) {
            let existing = &mut self.raw[i];
            let q = existing.probability;
            existing.probability = q * (1.0 - probability) + probability * (1.0 - q);
            return;
        }

        let parts = factors
            .iter()
            .map(|factor| match *factor {
                Factor::X(q) => Symptom::from_words(self.sens_x.row(q), self.num_detectors),
                Factor::Z(q) => Symptom::from_words(self.sens_z.row(q), self.num_detectors),
            })
            .collect();
        self.index.insert(symptom.clone(), self.raw.len());
        self.raw.push(RawMechanism {
            probability,
            symptom,
            parts,
        });
    }
}

fn factors_of(q: usize, pauli: u8) -> Vec<Factor> {
    let mut factors = Vec::with_capacity(2);
    if pauli & 1 != 0 {
        factors.push(Factor::X(q));
    }
    if pauli & 2 != 0 {
        factors.push(Factor::Z(q));
    }
    factors
}

/// Target pairs of a two-qubit instruction, last pair first.
fn rev_pairs(qubits: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    qubits.chunks_exact(2).rev().map(|p| (p[0], p[1]))
}

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

fn decompose_all(raw: Vec<RawMechanism>) -> Vec<ErrorMechanism> {
    let known: FxHashMap<Vec<u32>, u64> = raw
        .iter()
        .filter(|m| !m.symptom.detectors.is_empty() && m.symptom.detectors.len() <= 2)
        .map(|m| (m.symptom.detectors.clone(), m.symptom.observables))
        .collect();

    let mut fallbacks = 0usize;
    let mechanisms = raw
        .into_iter()
        .map(|m| {
            let components = if m.symptom.detectors.len() <= 2 {
                vec![m.symptom.clone()]
            } else if let Some(parts) = split_into_parts(m.parts) {
                parts
            } else {
                fallbacks += 1;
                pair_greedily(&m.symptom, &known)
            };
            ErrorMechanism {
                probability: m.probability,
                symptom: m.symptom,
                components,
            }
        })
        .collect();

    if fallbacks > 0 {
        tracing::debug!(fallbacks, "paired hyperedge detectors greedily");
    }
    mechanisms
}

/// Cancel duplicate parts; succeed if what remains is graphlike.
fn split_into_parts(parts: Vec<Symptom>) -> Option<Vec<Symptom>> {
    let mut kept: Vec<Symptom> = Vec::with_capacity(parts.len());
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        if let Some(pos) = kept.iter().position(|k| *k == part) {
            kept.swap_remove(pos);
        } else {
            kept.push(part);
        }
    }
    let graphlike = !kept.is_empty() && kept.iter().all(|p| p.detectors.len() <= 2);
    graphlike.then_some(kept)
}

/// Pair up detectors, preferring known edges, then known boundary edges,
/// then the next remaining detector.
fn pair_greedily(symptom: &Symptom, known: &FxHashMap<Vec<u32>, u64>) -> Vec<Symptom> {
    let mut remaining: Vec<u32> = symptom.detectors.clone();
    let mut components = Vec::new();

    while !remaining.is_empty() {
        let a = remaining.remove(0);
        let partner = remaining
            .iter()
            .position(|&b| known.contains_key(&vec![a, b]));
        let detectors = match partner {
            Some(i) => vec![a, remaining.remove(i)],
            None if remaining.is_empty() || known.contains_key(&vec![a]) => vec![a],
            None => vec![a, remaining.remove(0)],
        };
        let observables = known.get(&detectors).copied().unwrap_or(0);
        components.push(Symptom {
            detectors,
            observables,
        });
    }

    let residual = components
        .iter()
        .fold(symptom.observables, |acc, c| acc ^ c.observables);
    if let Some(first) = components.first_mut() {
        first.observables ^= residual;
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dem(source: &str) -> DetectorErrorModel {
        DetectorErrorModel::from_circuit(&source.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_single_x_error() {
        let model = dem("X_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-1]\n");
        assert_eq!(model.mechanisms().len(), 1);
        let m = &model.mechanisms()[0];
        assert!((m.probability - 0.1).abs() < 1e-12);
        assert_eq!(m.symptom.detectors, vec![0]);
        assert_eq!(m.symptom.observables, 1);
        assert!(m.symptom.is_boundary());
    }

    #[test]
    fn test_z_error_before_z_measurement_is_dropped() {
        let model = dem("Z_ERROR(0.1) 0\nM 0\nDETECTOR rec[-1]\n");
        assert!(model.mechanisms().is_empty());
    }

    #[test]
    fn test_identical_symptoms_merge() {
        let model = dem("X_ERROR(0.1) 0\nX_ERROR(0.2) 0\nM 0\nDETECTOR rec[-1]\n");
        assert_eq!(model.mechanisms().len(), 1);
        let expected = 0.1 * 0.8 + 0.2 * 0.9;
        assert!((model.mechanisms()[0].probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_depolarize1_splits_into_terms() {
        let model = dem("DEPOLARIZE1(0.3) 0\nM 0\nDETECTOR rec[-1]\n");
        // X and Y both flip the detector and merge; Z is invisible.
        assert_eq!(model.mechanisms().len(), 1);
        let expected = 0.1 * 0.9 + 0.1 * 0.9;
        assert!((model.mechanisms()[0].probability - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cx_propagation_creates_edge() {
        // X on qubit 0 before CX 0 1 flips both measurements.
        let model = dem("X_ERROR(0.1) 0\nCX 0 1\nM 0 1\nDETECTOR rec[-2]\nDETECTOR rec[-1]\n");
        assert_eq!(model.mechanisms()[0].symptom.detectors, vec![0, 1]);
        assert!(model.mechanisms()[0].symptom.is_edge());
    }

    #[test]
    fn test_reset_hides_earlier_errors() {
        let model = dem("X_ERROR(0.1) 0\nR 0\nM 0\nDETECTOR rec[-1]\n");
        assert!(model.mechanisms().is_empty());
    }

    #[test]
    fn test_hyperedge_decomposes_into_parts() {
        // Y error on qubit 0 fans out to X and Z detectors on two ancillas.
        let source = "\
Y_ERROR(0.1) 0
CX 0 1
CX 0 2
H 0
CX 0 3
H 0
M 1 2
MX 0
DETECTOR rec[-3]
DETECTOR rec[-2]
DETECTOR rec[-1]
";
        let model = dem(source);
        assert_eq!(model.mechanisms().len(), 1);
        let m = &model.mechanisms()[0];
        assert_eq!(m.symptom.detectors.len(), 3);
        assert!(m.symptom.is_hyperedge());
        assert!(model.is_graphlike());
        assert_eq!(m.components.len(), 2);
    }

    #[test]
    fn test_greedy_pairing_keeps_observable_parity() {
        let mut known = FxHashMap::default();
        known.insert(vec![0, 3], 1u64);
        let symptom = Symptom {
            detectors: vec![0, 1, 2, 3],
            observables: 0,
        };
        let parts = pair_greedily(&symptom, &known);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].detectors, vec![0, 3]);
        assert_eq!(parts[1].detectors, vec![1, 2]);
        let total = parts.iter().fold(0, |acc, p| acc ^ p.observables);
        assert_eq!(total, 0);
    }

    #[test]
    fn test_display() {
        let model = dem("X_ERROR(0.125) 0\nM 0\nDETECTOR rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-1]\n");
        assert_eq!(model.to_string(), "error(0.125) D0 L0\n");
    }
}
