//! Prod10: propagate refinement from a marked hexagon to its boundary.

use hypergrammar_core::{Edge, EdgeKind, Hypergraph};
use tracing::{debug, info};

use crate::error::GrammarResult;
use crate::hexagon_marking::HEXAGON_ARITY;
use crate::pattern::{BoundaryIndex, CycleSearch};
use crate::production::{replace_edge, Production, ProductionId};

/// Raises `R` to 1 on the six boundary `E` edges of one marked hexagon.
///
/// Anchors are `Q` edges with `R = 1`, scanned in edge order. An anchor is
/// skipped when it is not a hexagon, when no closed boundary of six `E` edges
/// surrounds it, or when its whole boundary is already marked. Every unmarked
/// side of the chosen anchor is replaced in the same call; sides already at
/// `R = 1` are left alone.
#[derive(Debug, Clone)]
pub struct Prod10 {
    search: CycleSearch,
}

impl Default for Prod10 {
    fn default() -> Self {
        Self::new()
    }
}

impl Prod10 {
    /// Create the production, testing every boundary permutation.
    pub fn new() -> Self {
        Self {
            search: CycleSearch::Exhaustive,
        }
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

impl Production for Prod10 {
    fn id(&self) -> ProductionId {
        ProductionId::new("prod10")
    }

    fn description(&self) -> &str {
        "Propagate refinement from a marked hexagon to its boundary edges"
    }

    fn apply(&self, graph: &Hypergraph) -> GrammarResult<Option<Hypergraph>> {
        let id = self.id();
        let index = BoundaryIndex::new(graph);

        for anchor in graph.edges_of_kind(EdgeKind::Q).filter(|e| e.is_marked()) {
            if anchor.arity() != HEXAGON_ARITY {
                debug!(
                    production = %id,
                    edge = %anchor,
                    arity = anchor.arity(),
                    "production_arity_mismatch"
                );
                continue;
            }

            let Some(boundary) = index.match_element(anchor.vertices(), self.search) else {
                debug!(production = %id, edge = %anchor, "production_boundary_incomplete");
                continue;
            };

            let pending: Vec<&Edge> = boundary
                .edges
                .iter()
                .copied()
                .filter(|e| e.flag() == 0)
                .collect();
            if pending.is_empty() {
                debug!(production = %id, edge = %anchor, "production_boundary_already_marked");
                continue;
            }

            let mut next = graph.clone();
            for side in &pending {
                replace_edge(&mut next, side, side.with_flag(1));
            }
            info!(
                production = %id,
                edge = %anchor,
                updated = pending.len(),
                "production_applied"
            );
            return Ok(Some(next));
        }

        Ok(None)
    }
}
