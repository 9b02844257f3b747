//! Minimum-weight perfect matching decoder.
//!
//! The circuit's detector error model is extracted once, turned into a
//! [`MatchingGraph`], and loaded into a `fusion-blossom` serial solver that
//! is reused for every shot. A shot's prediction is the XOR of the
//! observable masks of the edges in its matching.

use fusion_blossom::mwpm_solver::{PrimalDualSolver, SolverSerial};
use fusion_blossom::util::{SolverInitializer, SyndromePattern, VertexIndex, Weight};
use ndarray::{Array2, ArrayView2};
use qecost_ir::Circuit;
use qecost_sim::DetectorErrorModel;

use crate::decoder::{Decoder, check_shape};
use crate::error::{DecodeError, DecodeResult};
use crate::graph::MatchingGraph;

/// Matching decoder bound to one circuit.
pub struct MatchingDecoder {
    graph: MatchingGraph,
    edge_observables: Vec<u64>,
    /// `None` when the graph has no edges, e.g. a noiseless circuit.
    solver: Option<SolverSerial>,
}

impl MatchingDecoder {
    /// Extract the error model of `circuit` and prepare the solver.
    pub fn from_circuit(circuit: &Circuit) -> DecodeResult<Self> {
        if circuit.num_detectors() == 0 {
            return Err(DecodeError::IncompatibleCircuit(
                "circuit declares no detectors".into(),
            ));
        }
        let dem = DetectorErrorModel::from_circuit(circuit)?;
        Ok(Self::from_graph(MatchingGraph::from_dem(&dem)))
    }

    /// Wrap an existing matching graph.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_graph(graph: MatchingGraph) -> Self {
        let mut weighted_edges = Vec::with_capacity(graph.num_edges());
        let mut edge_observables = Vec::with_capacity(graph.num_edges());
        for (u, v, edge) in graph.edges() {
            weighted_edges.push((u as VertexIndex, v as VertexIndex, edge.weight() as Weight));
            edge_observables.push(edge.observables);
        }

        let solver = (!weighted_edges.is_empty()).then(|| {
            let initializer = SolverInitializer::new(
                (graph.num_detectors() + 1) as VertexIndex,
                weighted_edges,
                vec![graph.boundary() as VertexIndex],
            );
            SolverSerial::new(&initializer)
        });

        tracing::debug!(
            detectors = graph.num_detectors(),
            edges = graph.num_edges(),
            "built matching decoder"
        );

        Self {
            graph,
            edge_observables,
            solver,
        }
    }

    pub fn graph(&self) -> &MatchingGraph {
        &self.graph
    }

    /// Observable mask predicted for one set of fired detectors.
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode_defects(&mut self, defects: &[usize]) -> u64 {
        let defects: Vec<VertexIndex> = defects
            .iter()
            .filter(|&&d| self.graph.is_connected(d))
            .map(|&d| d as VertexIndex)
            .collect();
        let Some(solver) = self.solver.as_mut() else {
            return 0;
        };
        if defects.is_empty() {
            return 0;
        }

        solver.solve(&SyndromePattern::new_vertices(defects));
        let mask = solver
            .subgraph()
            .into_iter()
            .filter_map(|e| self.edge_observables.get(e as usize))
            .fold(0u64, |acc, &obs| acc ^ obs);
        solver.clear();
        mask
    }
}

impl Decoder for MatchingDecoder {
    fn name(&self) -> &str {
        "matching"
    }

    fn num_detectors(&self) -> usize {
        self.graph.num_detectors()
    }

    fn num_observables(&self) -> usize {
        self.graph.num_observables()
    }

    fn decode_shots(&mut self, detection_events: ArrayView2<'_, bool>) -> DecodeResult<Array2<bool>> {
        check_shape(&*self, &detection_events)?;
        let num_observables = self.num_observables();
        let mut predictions = Array2::from_elem((detection_events.nrows(), num_observables), false);

        let mut defects = Vec::new();
        for (shot, row) in detection_events.rows().into_iter().enumerate() {
            defects.clear();
            defects.extend(row.iter().enumerate().filter(|(_, fired)| **fired).map(|(d, _)| d));
            if defects.is_empty() {
                continue;
            }
            let mask = self.decode_defects(&defects);
            for o in 0..num_observables {
                predictions[[shot, o]] = (mask >> o) & 1 == 1;
            }
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MatchEdge;
    use ndarray::array;

    /// Chain: boundary - D0 - D1 - D2 - boundary, observable on the left boundary edge.
    fn chain() -> MatchingDecoder {
        let mut graph = MatchingGraph::new(3, 1);
        let edge = |observables| MatchEdge {
            probability: 0.01,
            observables,
        };
        graph.add_boundary_edge(0, edge(1));
        graph.add_edge(0, 1, edge(0));
        graph.add_edge(1, 2, edge(0));
        graph.add_boundary_edge(2, edge(0));
        MatchingDecoder::from_graph(graph)
    }

    #[test]
    fn test_adjacent_pair_matches_internally() {
        let mut decoder = chain();
        assert_eq!(decoder.decode_defects(&[0, 1]), 0);
    }

    #[test]
    fn test_single_defect_matches_nearest_boundary() {
        let mut decoder = chain();
        assert_eq!(decoder.decode_defects(&[0]), 1);
        assert_eq!(decoder.decode_defects(&[2]), 0);
    }

    #[test]
    fn test_batch_shape_and_values() {
        let mut decoder = chain();
        let events = array![[false, false, false], [true, false, false], [false, true, true]];
        let predictions = decoder.decode_shots(events.view()).unwrap();
        assert_eq!(predictions.dim(), (3, 1));
        assert_eq!(predictions.column(0).to_vec(), vec![false, true, false]);
    }

    #[test]
    fn test_wrong_column_count() {
        let mut decoder = chain();
        let events = Array2::from_elem((2, 5), false);
        assert!(matches!(
            decoder.decode_shots(events.view()),
            Err(DecodeError::ShapeMismatch {
                expected: 3,
                got: 5
            })
        ));
    }

    #[test]
    fn test_edgeless_graph_predicts_nothing() {
        let mut decoder = MatchingDecoder::from_graph(MatchingGraph::new(2, 1));
        let events = array![[true, true]];
        let predictions = decoder.decode_shots(events.view()).unwrap();
        assert!(!predictions[[0, 0]]);
    }

    #[test]
    fn test_circuit_without_detectors_rejected() {
        let circuit: Circuit = "X_ERROR(0.1) 0\nM 0\nOBSERVABLE_INCLUDE(0) rec[-1]\n"
            .parse()
            .unwrap();
        assert!(matches!(
            MatchingDecoder::from_circuit(&circuit),
            Err(DecodeError::IncompatibleCircuit(_))
        ));
    }
}
