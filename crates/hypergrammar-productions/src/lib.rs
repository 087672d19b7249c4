//! Graph-rewrite productions that mark and propagate refinement over a mesh hypergraph.
//!
//! An adaptive mesh is modeled as a [`Hypergraph`]: `E` edges are boundary
//! segments, `Q` edges are whole elements, and the `R` parameter on each edge
//! is the refinement flag. A production looks for one candidate, verifies its
//! topology and the refinement criterion, and rewrites it.
//!
//! ## Productions
//!
//! - **Prod0**: mark an unmarked quadrilateral whose four sides exist
//! - **Prod9**: mark an unmarked hexagon (arity check only)
//! - **Prod10**: propagate a hexagon's mark onto its six boundary edges
//!
//! ## Update Model
//!
//! ```text
//! apply(&graph) -> Ok(Some(next))   one rewrite committed on a copy
//!               -> Ok(None)         nothing matched, graph untouched
//!               -> Err(..)          malformed input (Prod0 arity)
//! ```
//!
//! Candidates are scanned in edge order (kind, then sorted vertex tuple), so
//! "the first match" is reproducible. Running productions to a fixpoint is the
//! caller's loop; see the `hexagon_refinement` example.

mod boundary_propagation;
pub mod config;
mod error;
mod hexagon_marking;
pub mod pattern;
mod production;
mod quad_marking;
pub mod test_fixtures;

pub use boundary_propagation::Prod10;
pub use config::GrammarConfig;
pub use error::{GrammarError, GrammarResult};
pub use hexagon_marking::{Prod9, HEXAGON_ARITY};
pub use pattern::{
    canonical_rotation, find_boundary_cycle, BoundaryIndex, BoundaryMatch, CycleSearch,
    Permutations,
};
pub use production::{production_meta, CompositeProduction, Production, ProductionId};
pub use quad_marking::{Prod0, QUAD_ARITY};

// Core data model
pub use hypergrammar_core::{
    criterion_fn, AcceptAll, Edge, EdgeKind, ExtentCriterion, Hypergraph, RefinementCriterion,
    RejectAll, RfcMeta, RfcVerdict, VertexId, VertexParameters, REFINEMENT_FLAG,
};
