//! Matching decoder on generated surface code circuits.

use std::collections::{HashMap, VecDeque};

use ndarray::Array2;
use qecost_codes::{Code, MemoryBasis, RotatedSurfaceCode};
use qecost_decode::{Decoder, MatchingDecoder, MatchingGraph, ParityDecoder};
use qecost_sim::{DetectorErrorModel, DetectorSampler};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn logical_errors(predictions: &Array2<bool>, truth: &Array2<bool>) -> usize {
    predictions
        .rows()
        .into_iter()
        .zip(truth.rows())
        .filter(|(p, t)| p != t)
        .count()
}

/// Fewest edges whose boundary is empty (or only the virtual boundary
/// vertex) yet which flip an observable.
fn shortest_logical(graph: &MatchingGraph) -> Option<usize> {
    let nodes = graph.num_detectors() + 1;
    let mut adjacency: Vec<Vec<(usize, u64)>> = vec![Vec::new(); nodes];
    for (a, b, edge) in graph.edges() {
        adjacency[a].push((b, edge.observables));
        adjacency[b].push((a, edge.observables));
    }

    let mut best: Option<usize> = None;
    for start in 0..nodes {
        let mut seen: HashMap<(usize, u64), usize> = HashMap::new();
        let mut queue = VecDeque::from([(start, 0u64)]);
        seen.insert((start, 0), 0);
        while let Some((node, mask)) = queue.pop_front() {
            let depth = seen[&(node, mask)];
            if node == start && mask != 0 {
                best = Some(best.map_or(depth, |b| b.min(depth)));
                break;
            }
            for &(next, flips) in &adjacency[node] {
                let state = (next, mask ^ flips);
                if !seen.contains_key(&state) {
                    seen.insert(state, depth + 1);
                    queue.push_back(state);
                }
            }
        }
    }
    best
}

#[test]
fn test_matching_graph_has_full_distance() {
    for basis in [MemoryBasis::X, MemoryBasis::Z] {
        let circuit = RotatedSurfaceCode::new(3, 3)
            .unwrap()
            .with_basis(basis)
            .generate_circuit(0.001)
            .unwrap();
        let decoder = MatchingDecoder::from_circuit(&circuit).unwrap();
        assert_eq!(shortest_logical(decoder.graph()), Some(3), "{basis:?}");
    }
}

#[test]
fn test_single_faults_are_corrected() {
    for basis in [MemoryBasis::X, MemoryBasis::Z] {
        let code = RotatedSurfaceCode::new(3, 3).unwrap().with_basis(basis);
        let circuit = code.generate_circuit(0.001).unwrap();
        let dem = DetectorErrorModel::from_circuit(&circuit).unwrap();
        let mut decoder = MatchingDecoder::from_circuit(&circuit).unwrap();

        for mechanism in dem.mechanisms() {
            let symptom = &mechanism.symptom;
            assert!(
                !symptom.detectors.is_empty() || symptom.observables == 0,
                "{basis:?}: undetectable logical error {symptom:?}"
            );
            let defects: Vec<usize> = symptom.detectors.iter().map(|&d| d as usize).collect();
            assert_eq!(
                decoder.decode_defects(&defects),
                symptom.observables,
                "{basis:?}: miscorrected {symptom:?}"
            );
        }
    }
}

#[test]
fn test_decoding_beats_raw_observable() {
    let circuit = RotatedSurfaceCode::with_distance(5)
        .unwrap()
        .generate_circuit(0.002)
        .unwrap();
    let batch = DetectorSampler::new(&circuit)
        .unwrap()
        .sample(5000, &mut SmallRng::seed_from_u64(17))
        .unwrap();
    let mut decoder = MatchingDecoder::from_circuit(&circuit).unwrap();
    let predictions = decoder.decode_shots(batch.detection_events.view()).unwrap();

    let quiet = Array2::from_elem(batch.observable_flips.dim(), false);
    let raw = logical_errors(&quiet, &batch.observable_flips);
    let decoded = logical_errors(&predictions, &batch.observable_flips);
    assert!(raw > 0);
    assert!(decoded * 2 < raw, "decoded {decoded} vs raw {raw}");
}

#[test]
fn test_prediction_shape_matches_batch() {
    let circuit = RotatedSurfaceCode::with_distance(3)
        .unwrap()
        .generate_circuit(0.01)
        .unwrap();
    let batch = DetectorSampler::new(&circuit)
        .unwrap()
        .sample(257, &mut SmallRng::seed_from_u64(3))
        .unwrap();

    let mut matching = MatchingDecoder::from_circuit(&circuit).unwrap();
    let mut parity = ParityDecoder::from_circuit(&circuit);
    let decoders: [&mut dyn Decoder; 2] = [&mut matching, &mut parity];
    for decoder in decoders {
        let predictions = decoder.decode_shots(batch.detection_events.view()).unwrap();
        assert_eq!(predictions.dim(), (257, 1), "{}", decoder.name());
    }
}

#[test]
fn test_noiseless_circuit_decodes_to_nothing() {
    let circuit = RotatedSurfaceCode::with_distance(3)
        .unwrap()
        .generate_circuit(0.0)
        .unwrap();
    let mut decoder = MatchingDecoder::from_circuit(&circuit).unwrap();
    assert_eq!(decoder.graph().num_edges(), 0);
    let events = Array2::from_elem((10, 24), false);
    let predictions = decoder.decode_shots(events.view()).unwrap();
    assert!(predictions.iter().all(|&b| !b));
}

#[test]
fn test_distance_one_is_incompatible() {
    let circuit = RotatedSurfaceCode::with_distance(1)
        .unwrap()
        .generate_circuit(0.01)
        .unwrap();
    assert!(MatchingDecoder::from_circuit(&circuit).is_err());
}
