//! Circuit container with REPEAT blocks.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, OpClass};
use crate::instruction::Instruction;

/// One entry of a circuit: a plain instruction or a repeated sub-circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A single instruction.
    Instruction(Instruction),
    /// `REPEAT count { body }`.
    Repeat {
        /// Number of repetitions, at least 1.
        count: u64,
        /// The repeated block.
        body: Circuit,
    },
}

/// A stabilizer circuit: an ordered sequence of instructions and REPEAT blocks.
///
/// Circuits are plain values. Every derived count (`num_qubits`,
/// `num_detectors`, ...) is computed through REPEAT blocks without
/// unrolling them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level operations in order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Append an already-validated instruction.
    pub fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.operations.push(Operation::Instruction(instruction));
        self
    }

    /// Append `gate(args) qubits...`.
    pub fn append(&mut self, gate: Gate, qubits: &[u32], args: &[f64]) -> IrResult<&mut Self> {
        let instruction = Instruction::on_qubits(gate, qubits, args)?;
        Ok(self.push(instruction))
    }

    /// Append a `DETECTOR` over record lookbacks (`k` means `rec[-k]`).
    pub fn append_detector(&mut self, lookbacks: &[u32], coords: &[f64]) -> IrResult<&mut Self> {
        let instruction = Instruction::detector(lookbacks, coords)?;
        Ok(self.push(instruction))
    }

    /// Append an `OBSERVABLE_INCLUDE(index)` over record lookbacks.
    pub fn append_observable_include(
        &mut self,
        index: u32,
        lookbacks: &[u32],
    ) -> IrResult<&mut Self> {
        let instruction = Instruction::observable_include(index, lookbacks)?;
        Ok(self.push(instruction))
    }

    /// Append a `TICK`.
    pub fn tick(&mut self) -> &mut Self {
        self.push(Instruction::tick())
    }

    /// Append `REPEAT count { body }`.
    pub fn append_repeat(&mut self, count: u64, body: Circuit) -> IrResult<&mut Self> {
        if count == 0 {
            return Err(IrError::EmptyRepeat);
        }
        self.operations.push(Operation::Repeat { count, body });
        Ok(self)
    }

    /// Append every operation of `other`.
    pub fn extend_from(&mut self, other: &Circuit) -> &mut Self {
        self.operations.extend(other.operations.iter().cloned());
        self
    }

    // =========================================================================
    // Derived counts
    // =========================================================================

    /// One more than the largest qubit index used anywhere, or 0.
    pub fn num_qubits(&self) -> u32 {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Instruction(inst) => inst.qubits().max().map_or(0, |q| q + 1),
                Operation::Repeat { body, .. } => body.num_qubits(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Total number of measurement results produced by a full execution.
    pub fn num_measurements(&self) -> u64 {
        self.sum_over(&|inst: &Instruction| inst.num_measurements())
    }

    /// Total number of detectors declared by a full execution.
    pub fn num_detectors(&self) -> u64 {
        self.sum_over(&|inst: &Instruction| u64::from(*inst.gate() == Gate::Detector))
    }

    /// One more than the largest observable index, or 0.
    pub fn num_observables(&self) -> u32 {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Instruction(inst) => inst.observable_index().map_or(0, |i| i + 1),
                Operation::Repeat { body, .. } => body.num_observables(),
            })
            .max()
            .unwrap_or(0)
    }

    fn sum_over(&self, per_instruction: &dyn Fn(&Instruction) -> u64) -> u64 {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Instruction(inst) => per_instruction(inst),
                Operation::Repeat { count, body } => count * body.sum_over(per_instruction),
            })
            .sum()
    }

    // =========================================================================
    // Flattening
    // =========================================================================

    /// Iterate over instructions in execution order with REPEAT blocks unrolled.
    pub fn iter_flat(&self) -> FlatInstructions<'_> {
        FlatInstructions {
            stack: vec![Frame {
                ops: &self.operations,
                pos: 0,
                remaining: 1,
            }],
        }
    }

    /// A copy of this circuit with every REPEAT block unrolled.
    pub fn flattened(&self) -> Circuit {
        Circuit {
            operations: self
                .iter_flat()
                .cloned()
                .map(Operation::Instruction)
                .collect(),
        }
    }

    /// Number of targets per operation class over the unrolled circuit.
    pub fn class_histogram(&self) -> BTreeMap<OpClass, u64> {
        let mut histogram = BTreeMap::new();
        for inst in self.iter_flat() {
            *histogram.entry(inst.class()).or_insert(0) += inst.targets().len() as u64;
        }
        histogram
    }

    /// Summary counts for reporting.
    pub fn stats(&self) -> CircuitStats {
        CircuitStats {
            num_qubits: self.num_qubits(),
            num_measurements: self.num_measurements(),
            num_detectors: self.num_detectors(),
            num_observables: self.num_observables(),
            targets_per_class: self.class_histogram(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        for op in &self.operations {
            match op {
                Operation::Instruction(inst) => writeln!(f, "{indent}{inst}")?,
                Operation::Repeat { count, body } => {
                    writeln!(f, "{indent}REPEAT {count} {{")?;
                    body.fmt_indented(f, depth + 1)?;
                    writeln!(f, "{indent}}}")?;
                }
            }
        }
        Ok(())
    }
}

/// Summary counts of a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub num_qubits: u32,
    pub num_measurements: u64,
    pub num_detectors: u64,
    pub num_observables: u32,
    /// Targets per operation class, REPEAT blocks unrolled.
    pub targets_per_class: BTreeMap<OpClass, u64>,
}

/// Iterator returned by [`Circuit::iter_flat`].
pub struct FlatInstructions<'a> {
    stack: Vec<Frame<'a>>,
}

struct Frame<'a> {
    ops: &'a [Operation],
    pos: usize,
    remaining: u64,
}

impl<'a> Iterator for FlatInstructions<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<&'a Instruction> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.pos == frame.ops.len() {
                if frame.remaining > 1 {
                    frame.remaining -= 1;
                    frame.pos = 0;
                } else {
                    self.stack.pop();
                }
                continue;
            }

            let ops = frame.ops;
            let op = &ops[frame.pos];
            frame.pos += 1;
            match op {
                Operation::Instruction(inst) => return Some(inst),
                Operation::Repeat { count, body } => {
                    if !body.operations.is_empty() {
                        self.stack.push(Frame {
                            ops: &body.operations,
                            pos: 0,
                            remaining: *count,
                        });
                    }
                }
            }
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl FromStr for Circuit {
    type Err = IrError;

    fn from_str(source: &str) -> IrResult<Self> {
        crate::parser::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetition_round() -> Circuit {
        let mut body = Circuit::new();
        body.append(Gate::CX, &[0, 1, 2, 1], &[])
            .unwrap()
            .append(Gate::MR, &[1], &[])
            .unwrap()
            .append_detector(&[1, 2], &[])
            .unwrap();
        body
    }

    #[test]
    fn test_counts_through_repeat() {
        let mut circuit = Circuit::new();
        circuit.append(Gate::MR, &[1], &[]).unwrap();
        circuit.append_repeat(4, repetition_round()).unwrap();
        circuit.append(Gate::M, &[0, 2], &[]).unwrap();
        circuit.append_observable_include(0, &[1]).unwrap();

        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_measurements(), 1 + 4 + 2);
        assert_eq!(circuit.num_detectors(), 4);
        assert_eq!(circuit.num_observables(), 1);
    }

    #[test]
    fn test_flattened_matches_counts() {
        let mut circuit = Circuit::new();
        circuit.append_repeat(3, repetition_round()).unwrap();
        let flat = circuit.flattened();

        assert_eq!(flat.operations().len(), 9);
        assert!(
            flat.operations()
                .iter()
                .all(|op| matches!(op, Operation::Instruction(_)))
        );
        assert_eq!(flat.num_detectors(), circuit.num_detectors());
        assert_eq!(flat.num_measurements(), circuit.num_measurements());
    }

    #[test]
    fn test_nested_repeat_iteration() {
        let mut inner = Circuit::new();
        inner.append(Gate::H, &[0], &[]).unwrap();
        let mut outer = Circuit::new();
        outer.append_repeat(3, inner).unwrap();
        outer.append(Gate::X, &[0], &[]).unwrap();
        let mut circuit = Circuit::new();
        circuit.append_repeat(2, outer).unwrap();

        let names: Vec<&str> = circuit.iter_flat().map(|i| i.gate().name()).collect();
        assert_eq!(names, ["H", "H", "H", "X", "H", "H", "H", "X"]);
    }

    #[test]
    fn test_zero_repeat_rejected() {
        let mut circuit = Circuit::new();
        assert!(matches!(
            circuit.append_repeat(0, Circuit::new()),
            Err(IrError::EmptyRepeat)
        ));
    }

    #[test]
    fn test_class_histogram() {
        let mut circuit = Circuit::new();
        circuit
            .append(Gate::H, &[0], &[])
            .unwrap()
            .append(Gate::CX, &[0, 1], &[])
            .unwrap()
            .append(Gate::M, &[0, 1], &[])
            .unwrap()
            .tick();
        let histogram = circuit.class_histogram();
        assert_eq!(histogram[&OpClass::SingleQubit], 1);
        assert_eq!(histogram[&OpClass::TwoQubit], 2);
        assert_eq!(histogram[&OpClass::Measurement], 2);
        assert_eq!(histogram[&OpClass::Annotation], 0);
    }

    #[test]
    fn test_display_indents_repeat() {
        let mut circuit = Circuit::new();
        circuit.append(Gate::R, &[0], &[]).unwrap();
        let mut body = Circuit::new();
        body.append(Gate::X, &[0], &[]).unwrap();
        circuit.append_repeat(2, body).unwrap();

        assert_eq!(circuit.to_string(), "R 0\nREPEAT 2 {\n    X 0\n}\n");
    }
}
