//! The forward frame sampler and the backward error-model walk must agree on
//! what every single Pauli error flips.
//!
//! Each circuit carries exactly one error channel. Sampled with probability 1
//! the error fires in every shot, so every sampled row must equal the symptom
//! the error model assigns to the same channel at a small probability.

use qecost_codes::{Code, MemoryBasis, RotatedSurfaceCode};
use qecost_ir::{Circuit, Gate};
use qecost_sim::{DetectorErrorModel, DetectorSampler, Symptom};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const SHOTS: usize = 8;

fn sampled_rows(circuit: &Circuit) -> Vec<Symptom> {
    let batch = DetectorSampler::new(circuit)
        .unwrap()
        .sample(SHOTS, &mut SmallRng::seed_from_u64(13))
        .unwrap();
    (0..SHOTS)
        .map(|shot| Symptom {
            detectors: batch
                .detection_events
                .row(shot)
                .iter()
                .enumerate()
                .filter(|(_, fired)| **fired)
                .map(|(d, _)| d as u32)
                .collect(),
            observables: batch
                .observable_flips
                .row(shot)
                .iter()
                .enumerate()
                .filter(|(_, flipped)| **flipped)
                .fold(0u64, |mask, (o, _)| mask | (1 << o)),
        })
        .collect()
}

fn model_symptom(circuit: &Circuit) -> Symptom {
    let dem = DetectorErrorModel::from_circuit(circuit).unwrap();
    assert!(dem.mechanisms().len() <= 1, "one channel, one mechanism:\n{dem}");
    dem.mechanisms()
        .first()
        .map(|m| m.symptom.clone())
        .unwrap_or_default()
}

/// Build the circuit twice, with the error certain and with it rare.
fn assert_agree(build: impl Fn(f64) -> Circuit) {
    let certain = build(1.0);
    let expected = model_symptom(&build(0.01));
    for (shot, row) in sampled_rows(&certain).into_iter().enumerate() {
        assert_eq!(row, expected, "shot {shot} of\n{certain}");
    }
}

const PAULI_ERRORS: [Gate; 3] = [Gate::XError, Gate::YError, Gate::ZError];

#[test]
fn test_clifford_rules_agree() {
    // (gate, inverse, arity)
    let gates = [
        (Gate::H, Gate::H, 1),
        (Gate::S, Gate::SDag, 1),
        (Gate::SDag, Gate::S, 1),
        (Gate::SqrtX, Gate::SqrtXDag, 1),
        (Gate::SqrtXDag, Gate::SqrtX, 1),
        (Gate::CX, Gate::CX, 2),
        (Gate::CY, Gate::CY, 2),
        (Gate::CZ, Gate::CZ, 2),
        (Gate::Swap, Gate::Swap, 2),
    ];
    for (gate, inverse, arity) in gates {
        let qubits: Vec<u32> = (0..arity).collect();
        for x_basis in [false, true] {
            let (reset, measure) = if x_basis {
                (Gate::RX, Gate::MX)
            } else {
                (Gate::R, Gate::M)
            };
            for error in &PAULI_ERRORS {
                for &q in &qubits {
                    // Slot 0 sees both gates, slot 1 only the inverse.
                    for slot in 0..2 {
                        assert_agree(|p| {
                            let mut c = Circuit::new();
                            c.append(reset.clone(), &qubits, &[]).unwrap();
                            if slot == 0 {
                                c.append(error.clone(), &[q], &[p]).unwrap();
                            }
                            c.append(gate.clone(), &qubits, &[]).unwrap();
                            if slot == 1 {
                                c.append(error.clone(), &[q], &[p]).unwrap();
                            }
                            c.append(inverse.clone(), &qubits, &[]).unwrap();
                            c.append(measure.clone(), &qubits, &[]).unwrap();
                            for k in 1..=arity {
                                c.append_detector(&[k], &[]).unwrap();
                            }
                            c.append_observable_include(0, &[1]).unwrap();
                            c
                        });
                    }
                }
            }
        }
    }
}

#[test]
fn test_measurement_and_reset_rules_agree() {
    let cases = [
        (Gate::R, Gate::M, Gate::M),
        (Gate::R, Gate::MR, Gate::M),
        (Gate::RX, Gate::MX, Gate::MX),
        (Gate::RX, Gate::MRX, Gate::MX),
        (Gate::R, Gate::R, Gate::M),
        (Gate::RX, Gate::RX, Gate::MX),
    ];
    for (prep, middle, last) in cases {
        for error in &PAULI_ERRORS {
            assert_agree(|p| {
                let mut c = Circuit::new();
                c.append(prep.clone(), &[0], &[]).unwrap();
                c.append(error.clone(), &[0], &[p]).unwrap();
                c.append(middle.clone(), &[0], &[]).unwrap();
                c.append(last.clone(), &[0], &[]).unwrap();
                let measured = c.num_measurements();
                for k in 1..=measured {
                    c.append_detector(&[k as u32], &[]).unwrap();
                }
                c.append_observable_include(0, &[1]).unwrap();
                c
            });
        }
    }
}

/// Insert one error after the `slot`-th TICK of the noiseless circuit.
fn with_error_after_tick(base: &Circuit, slot: usize, error: &Gate, qubit: u32, p: f64) -> Circuit {
    let mut out = Circuit::new();
    let mut ticks = 0;
    for inst in base.iter_flat() {
        out.push(inst.clone());
        if *inst.gate() == Gate::Tick {
            if ticks == slot {
                out.append(error.clone(), &[qubit], &[p]).unwrap();
            }
            ticks += 1;
        }
    }
    out
}

#[test]
fn test_surface_code_noise_slots_agree() {
    for basis in [MemoryBasis::X, MemoryBasis::Z] {
        let base = RotatedSurfaceCode::new(3, 3)
            .unwrap()
            .with_basis(basis)
            .generate_circuit(0.0)
            .unwrap()
            .flattened();
        let ticks = base.iter_flat().filter(|inst| *inst.gate() == Gate::Tick).count();
        assert!(ticks > 0);

        for slot in 0..ticks {
            for qubit in 0..base.num_qubits() {
                for error in [Gate::XError, Gate::ZError] {
                    assert_agree(|p| with_error_after_tick(&base, slot, &error, qubit, p));
                }
            }
        }
    }
}
