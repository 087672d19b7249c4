//! Minimal test fixtures for production testing.
//!
//! Provides small, in-memory meshes (a square, regular polygons) and a builder
//! for ad-hoc hypergraphs.

use std::f64::consts::TAU;
use std::sync::Arc;

use hypergrammar_core::{
    Edge, EdgeKind, Hypergraph, RefinementCriterion, VertexId, VertexParameters,
};

/// Turn string names into vertex IDs.
pub fn ids(names: &[&str]) -> Vec<VertexId> {
    names.iter().map(|n| VertexId::new(*n)).collect()
}

/// Square `A-B-C-D-A` with unparameterized sides and `Q{A,B,C,D}` at `q_flag`.
pub fn quad_graph(q_flag: i64) -> Hypergraph {
    TestHypergraphBuilder::new()
        .cycle(&["A", "B", "C", "D"])
        .element(&["A", "B", "C", "D"], q_flag)
        .build()
}

/// Regular `n`-gon over `v0..v{n-1}` laid out on the unit circle.
///
/// The element carries `R = q_flag` and every side `R = e_flag`.
pub fn polygon_graph(n: usize, q_flag: i64, e_flag: i64) -> Hypergraph {
    let names: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();

    let mut builder = TestHypergraphBuilder::new()
        .element(&names, q_flag)
        .flagged_cycle(&names, e_flag);

    for (i, name) in names.iter().enumerate() {
        let angle = TAU * i as f64 / n as f64;
        builder = builder.position(name, angle.cos(), angle.sin());
    }

    builder.build()
}

/// Regular hexagon, see [`polygon_graph`].
pub fn hexagon_graph(q_flag: i64, e_flag: i64) -> Hypergraph {
    polygon_graph(6, q_flag, e_flag)
}

/// Edges of `kind` whose refinement flag reads 1.
pub fn flagged_edges(graph: &Hypergraph, kind: EdgeKind) -> Vec<&Edge> {
    graph.edges_of_kind(kind).filter(|e| e.is_marked()).collect()
}

/// Builder for creating test hypergraphs.
#[derive(Default)]
pub struct TestHypergraphBuilder {
    graph: Hypergraph,
}

impl TestHypergraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary edge.
    pub fn edge(mut self, edge: Edge) -> Self {
        self.graph.add_edge(edge);
        self
    }

    /// Add an `E` edge with no parameters.
    pub fn segment(self, a: &str, b: &str) -> Self {
        self.edge(Edge::new(EdgeKind::E, [a, b]))
    }

    /// Add an `E` edge with `R = flag`.
    pub fn flagged_segment(self, a: &str, b: &str, flag: i64) -> Self {
        self.edge(Edge::flagged(EdgeKind::E, [a, b], flag))
    }

    /// Add unparameterized `E` edges along `vertices` without closing the loop.
    pub fn path(mut self, vertices: &[&str]) -> Self {
        for pair in vertices.windows(2) {
            self = self.segment(pair[0], pair[1]);
        }
        self
    }

    /// Add unparameterized `E` edges around the closed loop `vertices`.
    pub fn cycle(mut self, vertices: &[&str]) -> Self {
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            self = self.segment(a, b);
        }
        self
    }

    /// Add `E` edges with `R = flag` around the closed loop `vertices`.
    pub fn flagged_cycle(mut self, vertices: &[&str], flag: i64) -> Self {
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            self = self.flagged_segment(a, b, flag);
        }
        self
    }

    /// Add a `Q` edge with `R = flag`.
    pub fn element(self, vertices: &[&str], flag: i64) -> Self {
        self.edge(Edge::flagged(EdgeKind::Q, vertices.iter().copied(), flag))
    }

    /// Set the `x`/`y` layout parameters of a vertex.
    pub fn position(mut self, vertex: &str, x: f64, y: f64) -> Self {
        self.graph.set_vertex_parameter(
            vertex,
            VertexParameters::from([("x".to_string(), x), ("y".to_string(), y)]),
        );
        self
    }

    /// Attach a graph-level criterion.
    pub fn rfc(mut self, rfc: Arc<dyn RefinementCriterion>) -> Self {
        self.graph.set_rfc(Some(rfc));
        self
    }

    /// Finish building.
    pub fn build(self) -> Hypergraph {
        self.graph
    }
}
