//! Prod9: mark a hexagonal element for refinement.

use std::fmt;
use std::sync::Arc;

use hypergrammar_core::{EdgeKind, Hypergraph, RefinementCriterion};
use tracing::{debug, info};

use crate::error::GrammarResult;
use crate::production::{criterion_accepts, replace_edge, Production, ProductionId};

/// Vertex count of a hexagonal element.
pub const HEXAGON_ARITY: usize = 6;

/// Flags the first unmarked six-vertex `Q` edge the criterion accepts.
///
/// Only arity is checked; the boundary is not verified. Candidates of the
/// wrong arity are skipped, not reported.
pub struct Prod9 {
    rfc: Option<Arc<dyn RefinementCriterion>>,
}

impl Default for Prod9 {
    fn default() -> Self {
        Self::new()
    }
}

impl Prod9 {
    /// Create the production with no bound criterion.
    pub fn new() -> Self {
        Self { rfc: None }
    }

    /// Bind a criterion that takes precedence over the graph's.
    pub fn with_rfc(mut self, rfc: Arc<dyn RefinementCriterion>) -> Self {
        self.rfc = Some(rfc);
        self
    }
}

impl Production for Prod9 {
    fn id(&self) -> ProductionId {
        ProductionId::new("prod9")
    }

    fn description(&self) -> &str {
        "Mark a hexagonal element for refinement"
    }

    fn apply(&self, graph: &Hypergraph) -> GrammarResult<Option<Hypergraph>> {
        let id = self.id();

        for candidate in graph
            .edges_of_kind(EdgeKind::Q)
            .filter(|e| e.flag() == 0)
        {
            if candidate.arity() != HEXAGON_ARITY {
                debug!(
                    production = %id,
                    edge = %candidate,
                    arity = candidate.arity(),
                    "production_arity_mismatch"
                );
                continue;
            }

            if !criterion_accepts(&id, self.rfc.as_ref(), candidate, graph) {
                debug!(production = %id, edge = %candidate, "production_rfc_rejected");
                continue;
            }

            let mut next = graph.clone();
            replace_edge(&mut next, candidate, candidate.with_flag(1));
            info!(production = %id, edge = %candidate, "production_applied");
            return Ok(Some(next));
        }

        Ok(None)
    }
}

impl fmt::Debug for Prod9 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prod9")
            .field("has_rfc", &self.rfc.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{flagged_edges, hexagon_graph, quad_graph, TestHypergraphBuilder};
    use hypergrammar_core::{criterion_fn, AcceptAll, Edge, RejectAll};

    #[test]
    fn test_marks_hexagon() {
        let graph = hexagon_graph(0, 0);
        let result = Prod9::new().apply(&graph).unwrap().unwrap();

        let marked = flagged_edges(&result, EdgeKind::Q);
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].arity(), 6);
        assert_eq!(result.edge_count(), graph.edge_count());
        assert!(flagged_edges(&result, EdgeKind::E).is_empty());
    }

    #[test]
    fn test_boundary_not_required() {
        let graph = TestHypergraphBuilder::new()
            .element(&["v0", "v1", "v2", "v3", "v4", "v5"], 0)
            .build();

        let result = Prod9::new().apply(&graph).unwrap().unwrap();
        assert_eq!(flagged_edges(&result, EdgeKind::Q).len(), 1);
    }

    #[test]
    fn test_skips_quads_silently() {
        assert!(Prod9::new().apply(&quad_graph(0)).unwrap().is_none());
    }

    #[test]
    fn test_skips_to_next_hexagon() {
        let graph = TestHypergraphBuilder::new()
            .element(&["A", "B", "C", "D"], 0)
            .element(&["h0", "h1", "h2", "h3", "h4", "h5"], 0)
            .build();

        let result = Prod9::new().apply(&graph).unwrap().unwrap();
        let marked = flagged_edges(&result, EdgeKind::Q);
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains_vertex("h0"));
    }

    #[test]
    fn test_already_marked_is_fixpoint() {
        let graph = hexagon_graph(1, 0);
        assert!(Prod9::new().apply(&graph).unwrap().is_none());
        assert!(Prod9::new().apply(&graph).unwrap().is_none());
    }

    #[test]
    fn test_rejecting_rfc() {
        let graph = hexagon_graph(0, 0);
        assert!(Prod9::new()
            .with_rfc(Arc::new(RejectAll))
            .apply(&graph)
            .unwrap()
            .is_none());

        let mut graph = graph;
        graph.set_rfc(Some(Arc::new(RejectAll)));
        assert!(Prod9::new().apply(&graph).unwrap().is_none());
        assert!(Prod9::new()
            .with_rfc(Arc::new(AcceptAll))
            .apply(&graph)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_rfc_selects_among_candidates() {
        let graph = TestHypergraphBuilder::new()
            .element(&["a0", "a1", "a2", "a3", "a4", "a5"], 0)
            .element(&["b0", "b1", "b2", "b3", "b4", "b5"], 0)
            .build();
        let only_b = criterion_fn(|edge: &Edge, _, _| edge.contains_vertex("b0"));

        let result = Prod9::new().with_rfc(only_b).apply(&graph).unwrap().unwrap();
        let marked = flagged_edges(&result, EdgeKind::Q);
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains_vertex("b0"));
    }
}
