//! Core hypergraph types shared across the hypergrammar workspace.
//!
//! A [`Hypergraph`] is a set of typed hyperedges over named vertices. `E` edges
//! are the two-vertex segments of a mesh boundary, `Q` edges span the vertices
//! of a whole element (a quadrilateral or a hexagon). Every edge carries an
//! integer parameter map whose `R` entry is the refinement flag.
//!
//! Edges are values: a rewrite never touches an edge in place, it removes the
//! old edge and inserts a freshly built one.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter key holding the refinement flag (0 = unmarked, 1 = marked).
pub const REFINEMENT_FLAG: &str = "R";

// =============================================================================
// Vertices
// =============================================================================

/// Identifier for a vertex of the hypergraph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(String);

impl VertexId {
    /// Create a vertex identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the vertex name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&VertexId> for VertexId {
    fn from(v: &VertexId) -> Self {
        v.clone()
    }
}

/// Named numeric attributes of a vertex, e.g. `x` and `y` for layout.
pub type VertexParameters = BTreeMap<String, f64>;

static EMPTY_VERTEX_PARAMETERS: VertexParameters = BTreeMap::new();

// =============================================================================
// Edges
// =============================================================================

/// Type tag of a hyperedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Boundary segment between exactly two vertices.
    E,
    /// Element spanning the vertices of a quadrilateral or hexagon.
    Q,
}

impl EdgeKind {
    /// Get a display label for the kind.
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::E => "E",
            EdgeKind::Q => "Q",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable, value-typed hyperedge.
///
/// Equality, hashing and ordering cover the kind, the vertex set and the full
/// parameter map. Vertices are kept sorted, so two edges built from the same
/// vertices in a different order are the same edge. Ordering is
/// `(kind, sorted vertex tuple, parameters)`, which is the candidate order
/// productions scan in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    kind: EdgeKind,
    vertices: BTreeSet<VertexId>,
    #[serde(default)]
    parameters: BTreeMap<String, i64>,
}

impl Edge {
    /// Create an edge with an empty parameter map.
    pub fn new<I, V>(kind: EdgeKind, vertices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        Self {
            kind,
            vertices: vertices.into_iter().map(Into::into).collect(),
            parameters: BTreeMap::new(),
        }
    }

    /// Create an edge with the given parameters.
    pub fn with_parameters<I, V, P, K>(kind: EdgeKind, vertices: I, parameters: P) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
        P: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self {
            kind,
            vertices: vertices.into_iter().map(Into::into).collect(),
            parameters: parameters.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Create an edge with only the refinement flag set.
    pub fn flagged<I, V>(kind: EdgeKind, vertices: I, flag: i64) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        Self::with_parameters(kind, vertices, [(REFINEMENT_FLAG, flag)])
    }

    /// Type of this edge.
    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Vertex set, in sorted order.
    pub fn vertices(&self) -> &BTreeSet<VertexId> {
        &self.vertices
    }

    /// Number of distinct vertices.
    pub fn arity(&self) -> usize {
        self.vertices.len()
    }

    /// Full parameter map.
    pub fn parameters(&self) -> &BTreeMap<String, i64> {
        &self.parameters
    }

    /// Get a single parameter.
    pub fn parameter(&self, key: &str) -> Option<i64> {
        self.parameters.get(key).copied()
    }

    /// Refinement flag; 0 when the parameter is absent.
    pub fn flag(&self) -> i64 {
        self.parameter(REFINEMENT_FLAG).unwrap_or(0)
    }

    /// Whether the refinement flag reads 1.
    pub fn is_marked(&self) -> bool {
        self.flag() == 1
    }

    /// Check whether `vertex` belongs to this edge.
    pub fn contains_vertex(&self, vertex: &str) -> bool {
        self.vertices.contains(vertex)
    }

    /// Build the replacement edge carrying `flag`, keeping every other parameter.
    pub fn with_flag(&self, flag: i64) -> Edge {
        let mut parameters = self.parameters.clone();
        parameters.insert(REFINEMENT_FLAG.to_string(), flag);
        Edge {
            kind: self.kind,
            vertices: self.vertices.clone(),
            parameters,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.kind)?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("}")?;
        for (k, v) in &self.parameters {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Refinement Criterion
// =============================================================================

/// Free-form metadata handed to a criterion alongside the candidate edge.
pub type RfcMeta = serde_json::Map<String, Value>;

/// Predicate deciding whether a structurally matched element is refined.
///
/// Implementations are pure: they read the edge and the graph, never mutate.
pub trait RefinementCriterion: Send + Sync {
    /// Return `true` when `edge` should be flagged for refinement.
    fn is_valid(&self, edge: &Edge, graph: &Hypergraph, meta: Option<&RfcMeta>) -> bool;
}

impl<F> RefinementCriterion for F
where
    F: Fn(&Edge, &Hypergraph, Option<&RfcMeta>) -> bool + Send + Sync,
{
    fn is_valid(&self, edge: &Edge, graph: &Hypergraph, meta: Option<&RfcMeta>) -> bool {
        self(edge, graph, meta)
    }
}

/// Wrap a closure as a shareable criterion.
pub fn criterion_fn<F>(f: F) -> Arc<dyn RefinementCriterion>
where
    F: Fn(&Edge, &Hypergraph, Option<&RfcMeta>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Criterion that accepts every candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl RefinementCriterion for AcceptAll {
    fn is_valid(&self, _edge: &Edge, _graph: &Hypergraph, _meta: Option<&RfcMeta>) -> bool {
        true
    }
}

/// Criterion that rejects every candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAll;

impl RefinementCriterion for RejectAll {
    fn is_valid(&self, _edge: &Edge, _graph: &Hypergraph, _meta: Option<&RfcMeta>) -> bool {
        false
    }
}

/// Geometric heuristic: refine elements whose bounding box is large enough.
///
/// Reads the `x` and `y` vertex parameters; a vertex without coordinates sits
/// at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtentCriterion {
    /// Smallest bounding-box diagonal that still gets refined.
    pub min_extent: f64,
}

impl ExtentCriterion {
    /// Create a criterion with the given threshold.
    pub fn new(min_extent: f64) -> Self {
        Self { min_extent }
    }

    /// Bounding-box diagonal of the edge's vertices.
    pub fn extent(edge: &Edge, graph: &Hypergraph) -> f64 {
        if edge.vertices().is_empty() {
            return 0.0;
        }

        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);

        for vertex in edge.vertices() {
            let params = graph.vertex_parameters(vertex.as_str());
            let x = params.get("x").copied().unwrap_or(0.0);
            let y = params.get("y").copied().unwrap_or(0.0);
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }

        (max.0 - min.0).hypot(max.1 - min.1)
    }
}

impl RefinementCriterion for ExtentCriterion {
    fn is_valid(&self, edge: &Edge, graph: &Hypergraph, _meta: Option<&RfcMeta>) -> bool {
        Self::extent(edge, graph) >= self.min_extent
    }
}

/// Outcome of consulting the criterion attached to a hypergraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfcVerdict {
    /// The criterion accepted the edge.
    Accepted,
    /// The criterion rejected the edge.
    Rejected,
    /// No criterion is attached.
    Unset,
}

impl RfcVerdict {
    /// `Unset` counts as acceptance.
    pub fn is_permissive(&self) -> bool {
        !matches!(self, RfcVerdict::Rejected)
    }
}

impl From<bool> for RfcVerdict {
    fn from(valid: bool) -> Self {
        if valid {
            RfcVerdict::Accepted
        } else {
            RfcVerdict::Rejected
        }
    }
}

// =============================================================================
// Hypergraph
// =============================================================================

/// Edge set plus per-vertex parameters and an optional refinement criterion.
///
/// Mutation is set-algebraic: adding an edge already present and removing an
/// edge that is absent are both no-ops. Edges iterate in [`Edge`] order.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Hypergraph {
    edges: BTreeSet<Edge>,
    #[serde(default)]
    vertex_parameters: BTreeMap<VertexId, VertexParameters>,
    #[serde(skip)]
    rfc: Option<Arc<dyn RefinementCriterion>>,
}

impl Hypergraph {
    /// Create an empty hypergraph with no criterion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty hypergraph with a criterion attached.
    pub fn with_rfc(rfc: Arc<dyn RefinementCriterion>) -> Self {
        Self {
            rfc: Some(rfc),
            ..Default::default()
        }
    }

    /// Insert an edge. Returns `false` if an equal edge was already present.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    /// Remove an edge. Returns `false` if no equal edge was present.
    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        self.edges.remove(edge)
    }

    /// Check whether an equal edge is present.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// All edges, in deterministic order.
    pub fn edges(&self) -> &BTreeSet<Edge> {
        &self.edges
    }

    /// Edges of one kind, in deterministic order.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| e.kind() == kind)
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every vertex referenced by some edge.
    pub fn vertices(&self) -> BTreeSet<&VertexId> {
        self.edges.iter().flat_map(|e| e.vertices().iter()).collect()
    }

    /// Replace the parameters of `vertex` (overwrite, not merge).
    pub fn set_vertex_parameter(&mut self, vertex: impl Into<VertexId>, parameters: VertexParameters) {
        self.vertex_parameters.insert(vertex.into(), parameters);
    }

    /// Parameters of `vertex`; empty when none were set.
    pub fn vertex_parameters<Q>(&self, vertex: &Q) -> &VertexParameters
    where
        VertexId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.vertex_parameters
            .get(vertex)
            .unwrap_or(&EMPTY_VERTEX_PARAMETERS)
    }

    /// Attach or detach the graph-level criterion.
    pub fn set_rfc(&mut self, rfc: Option<Arc<dyn RefinementCriterion>>) {
        self.rfc = rfc;
    }

    /// Graph-level criterion, if any.
    pub fn rfc(&self) -> Option<&Arc<dyn RefinementCriterion>> {
        self.rfc.as_ref()
    }

    /// Consult the graph-level criterion for `edge`.
    pub fn edge_rfc_is_valid(&self, edge: &Edge, meta: Option<&RfcMeta>) -> RfcVerdict {
        match &self.rfc {
            Some(rfc) => RfcVerdict::from(rfc.is_valid(edge, self, meta)),
            None => RfcVerdict::Unset,
        }
    }
}

impl fmt::Debug for Hypergraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hypergraph")
            .field("edges", &self.edges)
            .field("vertex_parameters", &self.vertex_parameters)
            .field("has_rfc", &self.rfc.is_some())
            .finish()
    }
}

impl FromIterator<Edge> for Hypergraph {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Self {
            edges: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Extend<Edge> for Hypergraph {
    fn extend<T: IntoIterator<Item = Edge>>(&mut self, iter: T) {
        self.edges.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Hypergraph {
        [
            Edge::new(EdgeKind::E, ["A", "B"]),
            Edge::new(EdgeKind::E, ["B", "C"]),
            Edge::new(EdgeKind::E, ["C", "D"]),
            Edge::new(EdgeKind::E, ["D", "A"]),
            Edge::flagged(EdgeKind::Q, ["A", "B", "C", "D"], 0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_edge_equality_ignores_vertex_order() {
        let a = Edge::flagged(EdgeKind::Q, ["A", "B", "C", "D"], 0);
        let b = Edge::flagged(EdgeKind::Q, ["D", "C", "B", "A"], 0);
        assert_eq!(a, b);

        let mut set = BTreeSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_edge_equality_includes_parameters() {
        let plain = Edge::new(EdgeKind::E, ["A", "B"]);
        let zero = Edge::flagged(EdgeKind::E, ["A", "B"], 0);
        let one = Edge::flagged(EdgeKind::E, ["A", "B"], 1);

        assert_ne!(plain, zero);
        assert_ne!(zero, one);
        assert_ne!(
            Edge::new(EdgeKind::E, ["A", "B"]),
            Edge::new(EdgeKind::Q, ["A", "B"])
        );
    }

    #[test]
    fn test_flag_defaults_to_zero() {
        let edge = Edge::new(EdgeKind::E, ["A", "B"]);
        assert_eq!(edge.flag(), 0);
        assert!(!edge.is_marked());
        assert_eq!(edge.parameter(REFINEMENT_FLAG), None);
    }

    #[test]
    fn test_with_flag_preserves_other_parameters() {
        let edge = Edge::with_parameters(EdgeKind::E, ["A", "B"], [("R", 0), ("level", 3)]);
        let marked = edge.with_flag(1);

        assert!(marked.is_marked());
        assert_eq!(marked.parameter("level"), Some(3));
        assert_eq!(marked.vertices(), edge.vertices());
        assert_eq!(edge.flag(), 0);
    }

    #[test]
    fn test_duplicate_vertices_collapse() {
        let edge = Edge::new(EdgeKind::E, ["A", "A"]);
        assert_eq!(edge.arity(), 1);
    }

    #[test]
    fn test_edge_order_kind_then_vertices() {
        let mut graph = Hypergraph::new();
        graph.add_edge(Edge::new(EdgeKind::Q, ["A", "B", "C", "D"]));
        graph.add_edge(Edge::new(EdgeKind::E, ["C", "D"]));
        graph.add_edge(Edge::new(EdgeKind::E, ["B", "A"]));

        let order: Vec<String> = graph.edges().iter().map(|e| e.to_string()).collect();
        assert_eq!(order, vec!["E{A,B}", "E{C,D}", "Q{A,B,C,D}"]);
    }

    #[test]
    fn test_add_and_remove_are_set_operations() {
        let mut graph = square();
        assert_eq!(graph.edge_count(), 5);

        assert!(!graph.add_edge(Edge::new(EdgeKind::E, ["B", "A"])));
        assert_eq!(graph.edge_count(), 5);

        let missing = Edge::new(EdgeKind::E, ["A", "C"]);
        assert!(!graph.remove_edge(&missing));
        assert_eq!(graph.edge_count(), 5);

        assert!(graph.remove_edge(&Edge::new(EdgeKind::E, ["A", "B"])));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_edges_of_kind_and_vertices() {
        let graph = square();
        assert_eq!(graph.edges_of_kind(EdgeKind::E).count(), 4);
        assert_eq!(graph.edges_of_kind(EdgeKind::Q).count(), 1);

        let names: Vec<&str> = graph.vertices().into_iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_vertex_parameters_overwrite() {
        let mut graph = Hypergraph::new();
        assert!(graph.vertex_parameters("A").is_empty());

        graph.set_vertex_parameter("A", VertexParameters::from([("x".to_string(), 1.0)]));
        graph.set_vertex_parameter("A", VertexParameters::from([("y".to_string(), 2.0)]));

        let params = graph.vertex_parameters("A");
        assert_eq!(params.get("x"), None);
        assert_eq!(params.get("y"), Some(&2.0));
    }

    #[test]
    fn test_rfc_tri_state() {
        let mut graph = square();
        let q = Edge::flagged(EdgeKind::Q, ["A", "B", "C", "D"], 0);

        assert_eq!(graph.edge_rfc_is_valid(&q, None), RfcVerdict::Unset);
        assert!(graph.edge_rfc_is_valid(&q, None).is_permissive());

        graph.set_rfc(Some(Arc::new(RejectAll)));
        assert_eq!(graph.edge_rfc_is_valid(&q, None), RfcVerdict::Rejected);
        assert!(!graph.edge_rfc_is_valid(&q, None).is_permissive());

        graph.set_rfc(Some(Arc::new(AcceptAll)));
        assert_eq!(graph.edge_rfc_is_valid(&q, None), RfcVerdict::Accepted);

        graph.set_rfc(None);
        assert!(graph.rfc().is_none());
    }

    #[test]
    fn test_closure_criterion_sees_meta() {
        let rfc = criterion_fn(|_, _, meta| {
            meta.and_then(|m| m.get("production"))
                .and_then(Value::as_str)
                == Some("prod9")
        });
        let graph = Hypergraph::with_rfc(rfc);
        let edge = Edge::new(EdgeKind::Q, ["A"]);

        let mut meta = RfcMeta::new();
        meta.insert("production".to_string(), Value::from("prod9"));

        assert_eq!(graph.edge_rfc_is_valid(&edge, Some(&meta)), RfcVerdict::Accepted);
        assert_eq!(graph.edge_rfc_is_valid(&edge, None), RfcVerdict::Rejected);
    }

    #[test]
    fn test_extent_criterion() {
        let mut graph = square();
        for (v, x, y) in [("A", 0.0, 0.0), ("B", 3.0, 0.0), ("C", 3.0, 4.0), ("D", 0.0, 4.0)] {
            graph.set_vertex_parameter(
                v,
                VertexParameters::from([("x".to_string(), x), ("y".to_string(), y)]),
            );
        }
        let q = Edge::flagged(EdgeKind::Q, ["A", "B", "C", "D"], 0);

        assert_eq!(ExtentCriterion::extent(&q, &graph), 5.0);
        assert!(ExtentCriterion::new(5.0).is_valid(&q, &graph, None));
        assert!(!ExtentCriterion::new(5.5).is_valid(&q, &graph, None));
    }

    #[test]
    fn test_serde_snapshot_drops_rfc() {
        let mut graph = square();
        graph.set_rfc(Some(Arc::new(RejectAll)));
        graph.set_vertex_parameter("A", VertexParameters::from([("x".to_string(), 0.5)]));

        let json = serde_json::to_string(&graph).unwrap();
        let restored: Hypergraph = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.edges(), graph.edges());
        assert_eq!(restored.vertex_parameters("A").get("x"), Some(&0.5));
        assert!(restored.rfc().is_none());
    }
}
