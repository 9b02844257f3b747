//! Matching graphs built from detector error models.
//!
//! One vertex per detector plus a single virtual boundary vertex. Every
//! graphlike component of every error mechanism becomes an edge: two
//! detectors are joined directly, a single detector is joined to the
//! boundary. Edges carry the firing probability and the observables that
//! flip when the edge is part of the correction.

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use qecost_sim::DetectorErrorModel;

/// Smallest probability used for weights; keeps `ln((1-p)/p)` finite.
const MIN_PROBABILITY: f64 = 1e-10;

/// Integer weight resolution: `ln((1-p)/p)` is multiplied by this before
/// rounding. The matching solver needs even weights, so the result is doubled.
const WEIGHT_SCALE: f64 = 500.0;

/// Edge payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchEdge {
    /// Probability that this edge fires in one shot.
    pub probability: f64,
    /// Observables flipped by the edge.
    pub observables: u64,
}

impl MatchEdge {
    /// Even integer weight `2 · ⌊500 · ln((1-p)/p)⌋`, at least 2.
    #[allow(clippy::cast_possible_truncation)]
    pub fn weight(&self) -> i64 {
        let p = self.probability.clamp(MIN_PROBABILITY, 1.0 - MIN_PROBABILITY);
        let w = ((1.0 - p) / p).ln();
        (((w * WEIGHT_SCALE) as i64) * 2).max(2)
    }
}

/// Detector graph with a virtual boundary vertex.
#[derive(Debug, Clone)]
pub struct MatchingGraph {
    graph: UnGraph<(), MatchEdge>,
    boundary: NodeIndex,
    num_detectors: usize,
    num_observables: usize,
}

impl MatchingGraph {
    /// Graph over `num_detectors` detectors with no edges yet.
    pub fn new(num_detectors: usize, num_observables: usize) -> Self {
        let mut graph = UnGraph::with_capacity(num_detectors + 1, 0);
        for _ in 0..num_detectors {
            graph.add_node(());
        }
        let boundary = graph.add_node(());
        Self {
            graph,
            boundary,
            num_detectors,
            num_observables,
        }
    }

    /// Build from the graphlike components of an error model.
    ///
    /// Components without detectors cannot be matched and are skipped.
    pub fn from_dem(dem: &DetectorErrorModel) -> Self {
        let mut graph = Self::new(dem.num_detectors(), dem.num_observables());
        let mut skipped = 0usize;
        for mechanism in dem.mechanisms() {
            for component in &mechanism.components {
                let edge = MatchEdge {
                    probability: mechanism.probability,
                    observables: component.observables,
                };
                match component.detectors.as_slice() {
                    [d] => graph.add_boundary_edge(*d as usize, edge),
                    [a, b] => graph.add_edge(*a as usize, *b as usize, edge),
                    _ => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "components without a matching edge");
        }
        graph
    }

    /// Join two detectors.
    pub fn add_edge(&mut self, a: usize, b: usize, edge: MatchEdge) {
        self.merge_edge(NodeIndex::new(a), NodeIndex::new(b), edge);
    }

    /// Join a detector to the boundary.
    pub fn add_boundary_edge(&mut self, d: usize, edge: MatchEdge) {
        self.merge_edge(NodeIndex::new(d), self.boundary, edge);
    }

    /// Parallel edges with the same observables are independent ways to
    /// fire the same edge; with different observables the likelier one wins.
    fn merge_edge(&mut self, a: NodeIndex, b: NodeIndex, edge: MatchEdge) {
        match self.graph.find_edge(a, b) {
            Some(e) => {
                let existing = &mut self.graph[e];
                if existing.observables == edge.observables {
                    let (p, q) = (existing.probability, edge.probability);
                    existing.probability = p * (1.0 - q) + q * (1.0 - p);
                } else if edge.probability > existing.probability {
                    *existing = edge;
                }
            }
            None => {
                self.graph.add_edge(a, b, edge);
            }
        }
    }

    pub fn num_detectors(&self) -> usize {
        self.num_detectors
    }

    pub fn num_observables(&self) -> usize {
        self.num_observables
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Index of the virtual boundary vertex.
    pub fn boundary(&self) -> usize {
        self.boundary.index()
    }

    /// Whether detector `d` has at least one incident edge.
    pub fn is_connected(&self, d: usize) -> bool {
        self.graph.edges(NodeIndex::new(d)).next().is_some()
    }

    /// Edges as `(u, v, payload)`, in edge-index order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &MatchEdge)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }

    /// Payload of edge `index`.
    pub fn edge(&self, index: usize) -> Option<&MatchEdge> {
        self.graph.edge_weight(EdgeIndex::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(probability: f64, observables: u64) -> MatchEdge {
        MatchEdge {
            probability,
            observables,
        }
    }

    #[test]
    fn test_weight_is_even_and_decreasing() {
        let w1 = edge(0.001, 0).weight();
        let w2 = edge(0.01, 0).weight();
        assert_eq!(w1 % 2, 0);
        assert_eq!(w2 % 2, 0);
        assert!(w1 > w2);
        assert_eq!(edge(0.5, 0).weight(), 2);
        assert_eq!(edge(0.9, 0).weight(), 2);
        assert!(edge(0.0, 0).weight() > w1);
    }

    #[test]
    fn test_parallel_edges_merge() {
        let mut graph = MatchingGraph::new(2, 1);
        graph.add_edge(0, 1, edge(0.1, 0));
        graph.add_edge(1, 0, edge(0.2, 0));
        assert_eq!(graph.num_edges(), 1);
        let merged = graph.edge(0).unwrap();
        assert!((merged.probability - (0.1 * 0.8 + 0.2 * 0.9)).abs() < 1e-12);
    }

    #[test]
    fn test_conflicting_observables_keep_likelier() {
        let mut graph = MatchingGraph::new(1, 1);
        graph.add_boundary_edge(0, edge(0.01, 0));
        graph.add_boundary_edge(0, edge(0.05, 1));
        graph.add_boundary_edge(0, edge(0.02, 0));
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(*graph.edge(0).unwrap(), edge(0.05, 1));
    }

    #[test]
    fn test_boundary_vertex_is_last() {
        let mut graph = MatchingGraph::new(3, 1);
        graph.add_boundary_edge(2, edge(0.1, 1));
        assert_eq!(graph.boundary(), 3);
        let (u, v, _) = graph.edges().next().unwrap();
        assert_eq!((u.min(v), u.max(v)), (2, 3));
        assert!(graph.is_connected(2));
        assert!(!graph.is_connected(0));
    }
}
