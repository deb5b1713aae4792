//! Validated graph input with a pinned neighbour order.
//!
//! Adjacency is held in petgraph graphs, whose own edge iteration order is
//! an implementation detail (most recently added first). Traversals must not
//! depend on that, so neighbour queries here always return vertices in
//! ascending id order, breaking ties between parallel edges by weight.

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use algoverse_core::{GraphInput, WeightedEdge};

/// A graph ready for tracing: directed and undirected views over the same
/// edge list.
#[derive(Debug, Clone)]
pub struct Network {
    directed: DiGraph<(), i64, u32>,
    undirected: UnGraph<(), i64, u32>,
    edges: Vec<WeightedEdge>,
    source: usize,
}

impl Network {
    /// Builds the network from an input that has already passed shape
    /// validation (all endpoints in range).
    pub fn from_input(input: &GraphInput) -> Self {
        let edges: Vec<WeightedEdge> = input.edges.iter().map(|e| e.to_weighted()).collect();
        Self::new(input.vertex_count, edges, input.source.unwrap_or(0))
    }

    pub fn new(vertex_count: usize, edges: Vec<WeightedEdge>, source: usize) -> Self {
        let mut directed = DiGraph::with_capacity(vertex_count, edges.len());
        let mut undirected = UnGraph::with_capacity(vertex_count, edges.len());
        for _ in 0..vertex_count {
            directed.add_node(());
            undirected.add_node(());
        }
        for edge in &edges {
            let (a, b) = (NodeIndex::new(edge.from), NodeIndex::new(edge.to));
            directed.add_edge(a, b, edge.weight);
            undirected.add_edge(a, b, edge.weight);
        }
        Network {
            directed,
            undirected,
            edges,
            source,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.directed.node_count()
    }

    /// Start vertex for single-source algorithms (defaults to 0).
    pub fn source(&self) -> usize {
        self.source
    }

    /// Edges in input order.
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// Outgoing `(neighbour, weight)` pairs of `v`, ascending.
    pub fn out_neighbors(&self, v: usize) -> Vec<(usize, i64)> {
        let mut out: Vec<(usize, i64)> = self
            .directed
            .edges(NodeIndex::new(v))
            .map(|e| (e.target().index(), *e.weight()))
            .collect();
        out.sort_unstable();
        out
    }

    /// Incident `(neighbour, weight)` pairs of `v` treating every edge as
    /// undirected, ascending. Self-loops are dropped.
    pub fn undirected_neighbors(&self, v: usize) -> Vec<(usize, i64)> {
        let node = NodeIndex::new(v);
        let mut out: Vec<(usize, i64)> = self
            .undirected
            .edges(node)
            .filter_map(|e| {
                let other = if e.source() == node { e.target() } else { e.source() };
                (other != node).then(|| (other.index(), *e.weight()))
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Number of incoming directed edges per vertex.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.vertex_count()];
        for edge in &self.edges {
            degrees[edge.to] += 1;
        }
        degrees
    }
}
