//! Prod0: mark a quadrilateral element for refinement.

use std::fmt;
use std::sync::Arc;

use hypergrammar_core::{EdgeKind, Hypergraph, RefinementCriterion};
use tracing::{debug, info, warn};

use crate::error::{GrammarError, GrammarResult};
use crate::pattern::{BoundaryIndex, CycleSearch};
use crate::production::{criterion_accepts, replace_edge, Production, ProductionId};

/// Vertex count of a quadrilateral element.
pub const QUAD_ARITY: usize = 4;

/// Flags the first unmarked quadrilateral whose four sides are present.
///
/// Candidates are `Q` edges with `R = 0`, scanned in edge order. A candidate
/// that does not span exactly four vertices is a hard
/// [`GrammarError::InvalidTopology`]; a candidate with an incomplete boundary
/// or rejected by the criterion is skipped.
pub struct Prod0 {
    rfc: Option<Arc<dyn RefinementCriterion>>,
    search: CycleSearch,
}

impl Default for Prod0 {
    fn default() -> Self {
        Self::new()
    }
}

impl Prod0 {
    /// Create the production with no bound criterion.
    pub fn new() -> Self {
        Self {
            rfc: None,
            search: CycleSearch::CanonicalRotation,
        }
    }

    /// Bind a criterion that takes precedence over the graph's.
    pub fn with_rfc(mut self, rfc: Arc<dyn RefinementCriterion>) -> Self {
        self.rfc = Some(rfc);
        self
    }

    /// Set the boundary search strategy.
    pub fn with_search(mut self, search: CycleSearch) -> Self {
        self.search = search;
        self
    }

    /// Boundary search strategy in use.
    pub fn search(&self) -> CycleSearch {
        self.search
    }
}

impl Production for Prod0 {
    fn id(&self) -> ProductionId {
        ProductionId::new("prod0")
    }

    fn description(&self) -> &str {
        "Mark a quadrilateral element with a complete boundary for refinement"
    }

    fn apply(&self, graph: &Hypergraph) -> GrammarResult<Option<Hypergraph>> {
        let id = self.id();
        let index = BoundaryIndex::new(graph);

        for candidate in graph
            .edges_of_kind(EdgeKind::Q)
            .filter(|e| e.flag() == 0)
        {
            if candidate.arity() != QUAD_ARITY {
                warn!(
                    production = %id,
                    edge = %candidate,
                    arity = candidate.arity(),
                    "production_invalid_topology"
                );
                return Err(GrammarError::InvalidTopology {
                    production: id,
                    expected: QUAD_ARITY,
                    found: candidate.arity(),
                    vertices: candidate.vertices().iter().cloned().collect(),
                });
            }

            if index.match_element(candidate.vertices(), self.search).is_none() {
                debug!(production = %id, edge = %candidate, "production_boundary_incomplete");
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

impl fmt::Debug for Prod0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prod0")
            .field("has_rfc", &self.rfc.is_some())
            .field("search", &self.search)
            .finish()
    }
}
