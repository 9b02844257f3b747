//! Energy accounting.
//!
//! Costs are abstract units per operation target. A circuit's static energy
//! is what one shot of the circuit costs; decoding energy scales with the
//! number of detection events the classical decoder has to process.

use std::collections::BTreeMap;

use qecost_ir::{Circuit, OpClass};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Unit costs of physical operations and classical decoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyModel {
    /// Cost per single-qubit gate target.
    pub single_qubit_gate: f64,
    /// Cost per two-qubit gate (one target pair).
    pub two_qubit_gate: f64,
    /// Cost per measured qubit.
    pub measurement: f64,
    /// Cost per reset qubit.
    pub reset: f64,
    /// Cost per detection event handed to the decoder.
    pub decoding_event_cost: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            single_qubit_gate: 1.0,
            two_qubit_gate: 2.0,
            measurement: 5.0,
            reset: 1.0,
            decoding_event_cost: 1.0,
        }
    }
}

impl EnergyModel {
    /// Same physical costs, different decoding cost.
    #[must_use]
    pub fn with_decoding_event_cost(mut self, cost: f64) -> Self {
        self.decoding_event_cost = cost;
        self
    }

    /// Every cost must be finite and non-negative.
    pub fn validate(&self) -> EngineResult<()> {
        for (name, cost) in [
            ("single_qubit_gate cost", self.single_qubit_gate),
            ("two_qubit_gate cost", self.two_qubit_gate),
            ("measurement cost", self.measurement),
            ("reset cost", self.reset),
            ("decoding_event_cost", self.decoding_event_cost),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                return Err(EngineError::InvalidParameter {
                    name,
                    value: cost,
                    expected: "a finite non-negative cost",
                });
            }
        }
        Ok(())
    }

    /// Cost of one target of an operation class.
    pub fn cost_per_target(&self, class: OpClass) -> f64 {
        match class {
            OpClass::SingleQubit => self.single_qubit_gate,
            // Two targets per gate.
            OpClass::TwoQubit => self.two_qubit_gate / 2.0,
            OpClass::Measurement => self.measurement,
            OpClass::Reset => self.reset,
            OpClass::MeasureReset => self.measurement + self.reset,
            OpClass::Noise | OpClass::Annotation | OpClass::Unknown => 0.0,
        }
    }

    /// Energy of one execution of `circuit`, REPEAT blocks unrolled.
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_circuit_energy(&self, circuit: &Circuit) -> f64 {
        instruction_histogram(circuit)
            .into_iter()
            .map(|(class, targets)| self.cost_per_target(class) * targets as f64)
            .sum()
    }

    /// Energy of decoding `num_events` detection events.
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate_decoding_energy(&self, num_events: u64) -> f64 {
        self.decoding_event_cost * num_events as f64
    }
}

/// Targets per operation class over the unrolled circuit.
pub fn instruction_histogram(circuit: &Circuit) -> BTreeMap<OpClass, u64> {
    circuit.class_histogram()
}
