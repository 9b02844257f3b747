//! Property-based tests for generated surface code circuits.

use proptest::prelude::*;
use qecost_codes::{Code, MemoryBasis, NoiseParameters, RotatedSurfaceCode};
use qecost_ir::{Circuit, OpClass};

fn basis() -> impl Strategy<Value = MemoryBasis> {
    prop_oneof![Just(MemoryBasis::X), Just(MemoryBasis::Z)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Qubit, detector and measurement counts follow the closed forms for odd distances.
    #[test]
    fn counts_follow_closed_forms(
        half in 1u32..4,
        rounds in 1u32..5,
        basis in basis(),
        p in 0.0f64..0.1,
    ) {
        let d = 2 * half + 1;
        let code = RotatedSurfaceCode::new(d, rounds).unwrap().with_basis(basis);
        let circuit = code.generate_circuit(p).unwrap();
        let stabilizers = u64::from(d * d - 1);

        prop_assert_eq!(circuit.num_qubits(), 2 * d * d - 1);
        prop_assert_eq!(circuit.num_detectors(), u64::from(rounds) * stabilizers);
        prop_assert_eq!(
            circuit.num_measurements(),
            u64::from(rounds) * stabilizers + u64::from(d * d)
        );
        prop_assert_eq!(circuit.num_observables(), 1);
    }

    /// The noiseless skeleton is the same at every error rate.
    #[test]
    fn noise_only_adds_channels(d in 2u32..6, rounds in 1u32..4, p in 0.0001f64..0.2) {
        let code = RotatedSurfaceCode::new(d, rounds).unwrap();
        let strip = |c: &Circuit| -> Vec<String> {
            c.iter_flat()
                .filter(|i| i.class() != OpClass::Noise)
                .map(ToString::to_string)
                .collect()
        };
        let clean = code.generate_circuit(0.0).unwrap();
        let noisy = code.generate_circuit(p).unwrap();
        prop_assert_eq!(strip(&clean), strip(&noisy));
        prop_assert_eq!(clean.num_detectors(), noisy.num_detectors());
    }

    /// Per-location parameters reproduce the uniform circuit when equal.
    #[test]
    fn uniform_parameters_match_scalar(d in 1u32..6, p in 0.0f64..1.0) {
        let code = RotatedSurfaceCode::new(d, 2).unwrap();
        prop_assert_eq!(
            code.generate_circuit(p).unwrap(),
            code.generate_circuit_with(&NoiseParameters::uniform(p)).unwrap()
        );
    }
}
