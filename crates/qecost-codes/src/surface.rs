//! Rotated surface code memory experiments.
//!
//! ## Layout
//!
//! On a `(2d+1) × (2d+1)` lattice, data qubits sit at odd coordinates
//! `(2x+1, 2y+1)` and measure qubits at even coordinates. A measure qubit at
//! `(2x, 2y)` is an X-type stabilizer when `x` and `y` differ in parity and a
//! Z-type stabilizer otherwise; weight-two stabilizers are kept only on the
//! boundaries that match their type. Qubits are indexed in coordinate order.
//!
//! ## Circuit
//!
//! - **Head**: coordinates, resets, one syndrome cycle and detectors on the
//!   first-round stabilizers of the memory basis
//! - **Body**: `REPEAT rounds-1` of the cycle, each followed by detectors
//!   comparing every stabilizer with its previous round
//! - **Tail**: data measurement in the memory basis, detectors rebuilding
//!   the final stabilizers from data outcomes, and the logical observable
//!
//! Interaction orders make hook errors run perpendicular to the logical
//! operator they could otherwise shorten.

use std::collections::BTreeMap;

use qecost_ir::{Circuit, Gate};

use crate::code::{Code, CodeFamily, MemoryBasis};
use crate::error::{CodeError, CodeResult};
use crate::params::NoiseParameters;

type Coord = (i32, i32);

const X_ORDER: [Coord; 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const Z_ORDER: [Coord; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The rotated surface code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotatedSurfaceCode {
    distance: u32,
    rounds: u32,
    basis: MemoryBasis,
}

impl RotatedSurfaceCode {
    /// A memory-X experiment with `rounds` rounds.
    pub fn new(distance: u32, rounds: u32) -> CodeResult<Self> {
        let code = Self {
            distance,
            rounds,
            basis: MemoryBasis::X,
        };
        code.validate()?;
        Ok(code)
    }

    /// A memory-X experiment with as many rounds as the distance.
    pub fn with_distance(distance: u32) -> CodeResult<Self> {
        Self::new(distance, distance)
    }

    /// Switch the protected basis.
    #[must_use]
    pub fn with_basis(mut self, basis: MemoryBasis) -> Self {
        self.basis = basis;
        self
    }

    pub fn basis(&self) -> MemoryBasis {
        self.basis
    }

    /// Number of data qubits, `d²`.
    pub fn num_data_qubits(&self) -> u32 {
        self.distance * self.distance
    }

    /// Total qubit count, `2d² - 1`.
    pub fn num_qubits(&self) -> u32 {
        2 * self.num_data_qubits() - 1
    }

    /// Detectors in the generated circuit, `rounds × (d² - 1)`.
    pub fn num_detectors(&self) -> u64 {
        u64::from(self.rounds) * u64::from(self.num_data_qubits() - 1)
    }

    fn validate(&self) -> CodeResult<()> {
        if self.distance < 1 {
            return Err(CodeError::InvalidParameter {
                name: "distance",
                value: f64::from(self.distance),
                expected: "at least 1",
            });
        }
        if self.rounds < 1 {
            return Err(CodeError::InvalidParameter {
                name: "rounds",
                value: f64::from(self.rounds),
                expected: "at least 1",
            });
        }
        Ok(())
    }

    /// Generate the circuit with separate probabilities per noise location.
    pub fn generate_circuit_with(&self, noise: &NoiseParameters) -> CodeResult<Circuit> {
        self.validate()?;
        noise.validate()?;

        let layout = Layout::new(self.distance);
        let generator = Generator {
            layout: &layout,
            noise,
            basis: self.basis,
        };

        let cycle = generator.cycle()?;
        let mut circuit = generator.head(&cycle)?;
        if self.rounds > 1 {
            circuit.append_repeat(u64::from(self.rounds - 1), generator.body(&cycle)?)?;
        }
        generator.tail(&mut circuit)?;

        tracing::debug!(
            distance = self.distance,
            rounds = self.rounds,
            basis = %self.basis,
            qubits = circuit.num_qubits(),
            detectors = circuit.num_detectors(),
            "generated rotated surface code circuit"
        );
        Ok(circuit)
    }
}

impl Code for RotatedSurfaceCode {
    fn family(&self) -> CodeFamily {
        CodeFamily::RotatedSurface
    }

    fn distance(&self) -> u32 {
        self.distance
    }

    fn rounds(&self) -> u32 {
        self.rounds
    }

    fn generate_circuit(&self, physical_error_rate: f64) -> CodeResult<Circuit> {
        let noise = NoiseParameters::uniform(physical_error_rate);
        noise.validate().map_err(|_| CodeError::InvalidParameter {
            name: "physical_error_rate",
            value: physical_error_rate,
            expected: "a probability in [0, 1]",
        })?;
        self.generate_circuit_with(&noise)
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

struct Layout {
    index: BTreeMap<Coord, u32>,
    data: Vec<Coord>,
    x_measure: Vec<Coord>,
    z_measure: Vec<Coord>,
    x_observable: Vec<Coord>,
    z_observable: Vec<Coord>,
    data_order: BTreeMap<Coord, u32>,
    measure_order: BTreeMap<Coord, u32>,
}

impl Layout {
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    fn new(distance: u32) -> Self {
        let d = distance as i32;
        let mut data = Vec::new();
        let mut x_observable = Vec::new();
        let mut z_observable = Vec::new();
        for x in 0..d {
            for y in 0..d {
                let q = (2 * x + 1, 2 * y + 1);
                data.push(q);
                if x == 0 {
                    x_observable.push(q);
                }
                if y == 0 {
                    z_observable.push(q);
                }
            }
        }

        let mut x_measure = Vec::new();
        let mut z_measure = Vec::new();
        for x in 0..=d {
            for y in 0..=d {
                let parity = x % 2 != y % 2;
                if (x == 0 || x == d) && parity {
                    continue;
                }
                if (y == 0 || y == d) && !parity {
                    continue;
                }
                if parity {
                    x_measure.push((2 * x, 2 * y));
                } else {
                    z_measure.push((2 * x, 2 * y));
                }
            }
        }

        let mut index: BTreeMap<Coord, u32> = data
            .iter()
            .chain(&x_measure)
            .chain(&z_measure)
            .map(|&q| (q, 0))
            .collect();
        for (i, slot) in index.values_mut().enumerate() {
            *slot = i as u32;
        }

        let data_order = data.iter().enumerate().map(|(i, &q)| (q, i as u32)).collect();
        let measure_order = x_measure
            .iter()
            .chain(&z_measure)
            .enumerate()
            .map(|(i, &q)| (q, i as u32))
            .collect();

        Self {
            index,
            data,
            x_measure,
            z_measure,
            x_observable,
            z_observable,
            data_order,
            measure_order,
        }
    }

    fn qubits<'a>(&self, coords: impl IntoIterator<Item = &'a Coord>) -> Vec<u32> {
        coords
            .into_iter()
            .filter_map(|q| self.index.get(q).copied())
            .collect()
    }

    fn measure_coords(&self) -> impl Iterator<Item = &Coord> {
        self.x_measure.iter().chain(&self.z_measure)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn num_measure(&self) -> u32 {
        (self.x_measure.len() + self.z_measure.len()) as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn num_data(&self) -> u32 {
        self.data.len() as u32
    }

    /// Targets of the four `CX` layers: X stabilizers control data, data
    /// controls Z stabilizers. Diagonal neighbours of a measure qubit are
    /// always data coordinates.
    fn cx_layers(&self) -> [Vec<u32>; 4] {
        let mut layers: [Vec<u32>; 4] = Default::default();
        for (k, layer) in layers.iter_mut().enumerate() {
            for m in &self.x_measure {
                let data = offset(*m, X_ORDER[k]);
                if let (Some(&a), Some(&b)) = (self.index.get(m), self.index.get(&data)) {
                    layer.extend([a, b]);
                }
            }
            for m in &self.z_measure {
                let data = offset(*m, Z_ORDER[k]);
                if let (Some(&a), Some(&b)) = (self.index.get(&data), self.index.get(m)) {
                    layer.extend([a, b]);
                }
            }
        }
        layers
    }
}

fn offset(q: Coord, delta: Coord) -> Coord {
    (q.0 + delta.0, q.1 + delta.1)
}

// ---------------------------------------------------------------------------
// Circuit assembly
// ---------------------------------------------------------------------------

struct Generator<'a> {
    layout: &'a Layout,
    noise: &'a NoiseParameters,
    basis: MemoryBasis,
}

impl Generator<'_> {
    fn data_qubits(&self) -> Vec<u32> {
        self.layout.qubits(&self.layout.data)
    }

    fn measure_qubits(&self) -> Vec<u32> {
        self.layout.qubits(self.layout.measure_coords())
    }

    fn x_measure_qubits(&self) -> Vec<u32> {
        self.layout.qubits(&self.layout.x_measure)
    }

    fn basis_measures(&self) -> &[Coord] {
        match self.basis {
            MemoryBasis::X => &self.layout.x_measure,
            MemoryBasis::Z => &self.layout.z_measure,
        }
    }

    fn cycle(&self) -> CodeResult<Circuit> {
        let data = self.data_qubits();
        let measure = self.measure_qubits();
        let x_measure = self.x_measure_qubits();
        let clifford = self.noise.after_clifford_depolarization;

        let mut c = Circuit::new();
        c.tick();
        append_noise(&mut c, Gate::Depolarize1, &data, self.noise.before_round_data_depolarization)?;
        append_gate(&mut c, Gate::H, &x_measure)?;
        append_noise(&mut c, Gate::Depolarize1, &x_measure, clifford)?;
        for layer in self.layout.cx_layers() {
            c.tick();
            append_gate(&mut c, Gate::CX, &layer)?;
            append_noise(&mut c, Gate::Depolarize2, &layer, clifford)?;
        }
        c.tick();
        append_gate(&mut c, Gate::H, &x_measure)?;
        append_noise(&mut c, Gate::Depolarize1, &x_measure, clifford)?;
        c.tick();
        append_noise(&mut c, Gate::XError, &measure, self.noise.before_measure_flip_probability)?;
        append_gate(&mut c, Gate::MR, &measure)?;
        append_noise(&mut c, Gate::XError, &measure, self.noise.after_reset_flip_probability)?;
        Ok(c)
    }

    fn head(&self, cycle: &Circuit) -> CodeResult<Circuit> {
        let mut c = Circuit::new();
        for (&(x, y), &q) in &self.layout.index {
            c.append(Gate::QubitCoords, &[q], &[f64::from(x), f64::from(y)])?;
        }

        let (reset, flip) = match self.basis {
            MemoryBasis::X => (Gate::RX, Gate::ZError),
            MemoryBasis::Z => (Gate::R, Gate::XError),
        };
        let data = self.data_qubits();
        let measure = self.measure_qubits();
        let after_reset = self.noise.after_reset_flip_probability;
        append_gate(&mut c, reset, &data)?;
        append_noise(&mut c, flip, &data, after_reset)?;
        append_gate(&mut c, Gate::R, &measure)?;
        append_noise(&mut c, Gate::XError, &measure, after_reset)?;

        c.extend_from(cycle);

        let m = self.layout.num_measure();
        for coord in self.basis_measures() {
            let k = m - self.layout.measure_order[coord];
            c.append_detector(&[k], &detector_coords(*coord, 0.0))?;
        }
        Ok(c)
    }

    fn body(&self, cycle: &Circuit) -> CodeResult<Circuit> {
        let mut c = cycle.clone();
        c.append(Gate::ShiftCoords, &[], &[0.0, 0.0, 1.0])?;
        let m = self.layout.num_measure();
        for coord in self.layout.measure_coords() {
            let k = m - self.layout.measure_order[coord];
            c.append_detector(&[k, k + m], &detector_coords(*coord, 0.0))?;
        }
        Ok(c)
    }

    fn tail(&self, c: &mut Circuit) -> CodeResult<()> {
        let (flip, measure, order, observable) = match self.basis {
            MemoryBasis::X => (Gate::ZError, Gate::MX, &X_ORDER, &self.layout.x_observable),
            MemoryBasis::Z => (Gate::XError, Gate::M, &Z_ORDER, &self.layout.z_observable),
        };
        let data = self.data_qubits();
        append_noise(c, flip, &data, self.noise.before_measure_flip_probability)?;
        append_gate(c, measure, &data)?;

        let n = self.layout.num_data();
        let m = self.layout.num_measure();
        for coord in self.basis_measures() {
            let mut lookbacks: Vec<u32> = order
                .iter()
                .filter_map(|&delta| self.layout.data_order.get(&offset(*coord, delta)))
                .map(|&i| n - i)
                .collect();
            lookbacks.push(n + m - self.layout.measure_order[coord]);
            lookbacks.sort_unstable();
            c.append_detector(&lookbacks, &detector_coords(*coord, 1.0))?;
        }

        let lookbacks: Vec<u32> = observable
            .iter()
            .map(|q| n - self.layout.data_order[q])
            .collect();
        c.append_observable_include(0, &lookbacks)?;
        Ok(())
    }
}

fn detector_coords((x, y): Coord, t: f64) -> [f64; 3] {
    [f64::from(x), f64::from(y), t]
}

fn append_gate(c: &mut Circuit, gate: Gate, qubits: &[u32]) -> CodeResult<()> {
    if !qubits.is_empty() {
        c.append(gate, qubits, &[])?;
    }
    Ok(())
}

fn append_noise(c: &mut Circuit, channel: Gate, qubits: &[u32], p: f64) -> CodeResult<()> {
    if p > 0.0 && !qubits.is_empty() {
        c.append(channel, qubits, &[p])?;
    }
    Ok(())
}
