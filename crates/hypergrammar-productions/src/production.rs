//! Production abstractions for hypergraph rewriting.
//!
//! A production scans the edge set for one candidate, checks its topology and
//! the refinement criterion, and commits at most one rewrite per call.
//!
//! Updates are copy-on-write: `apply` never touches the graph it is given. A
//! match returns a fresh [`Hypergraph`] holding the rewrite; the caller keeps
//! the old one if it wants a snapshot.

use std::fmt;
use std::sync::Arc;

use hypergrammar_core::{Edge, Hypergraph, RefinementCriterion, RfcMeta};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GrammarResult;

/// Unique identifier for a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionId(String);

impl ProductionId {
    /// Create a new production ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the production name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProductionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A rewrite rule over a hypergraph.
pub trait Production: Send + Sync {
    /// Unique identifier for this production.
    fn id(&self) -> ProductionId;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Try to rewrite one candidate.
    ///
    /// Returns `Ok(None)` when nothing matched, in which case nothing changed.
    /// Errors are reserved for malformed input that the production refuses to
    /// skip over.
    fn apply(&self, graph: &Hypergraph) -> GrammarResult<Option<Hypergraph>>;
}

/// Metadata handed to criteria consulted by `production`.
pub fn production_meta(production: &ProductionId) -> RfcMeta {
    let mut meta = RfcMeta::new();
    meta.insert(
        "production".to_string(),
        Value::String(production.name().to_string()),
    );
    meta
}

/// Decide whether a matched candidate may be rewritten.
///
/// A criterion bound to the production wins over the graph's criterion; with
/// neither installed the rewrite is allowed.
pub(crate) fn criterion_accepts(
    production: &ProductionId,
    local: Option<&Arc<dyn RefinementCriterion>>,
    edge: &Edge,
    graph: &Hypergraph,
) -> bool {
    let meta = production_meta(production);
    match local {
        Some(rfc) => rfc.is_valid(edge, graph, Some(&meta)),
        None => graph.edge_rfc_is_valid(edge, Some(&meta)).is_permissive(),
    }
}

/// Swap `old` for `new` in `graph`.
pub(crate) fn replace_edge(graph: &mut Hypergraph, old: &Edge, new: Edge) {
    graph.remove_edge(old);
    graph.add_edge(new);
}

/// A production that tries several productions in order.
///
/// The first one that matches wins; errors stop the scan. This is a single
/// step, running it to a fixpoint is up to the caller.
pub struct CompositeProduction {
    id: ProductionId,
    description: String,
    productions: Vec<Arc<dyn Production>>,
}

impl CompositeProduction {
    /// Create a new composite production.
    pub fn new(id: impl Into<ProductionId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            productions: Vec::new(),
        }
    }

    /// Add a production to the composite.
    pub fn add_production(mut self, production: Arc<dyn Production>) -> Self {
        self.productions.push(production);
        self
    }

    /// Add multiple productions.
    pub fn with_productions(mut self, productions: Vec<Arc<dyn Production>>) -> Self {
        self.productions.extend(productions);
        self
    }

    /// IDs of the wrapped productions, in trial order.
    pub fn production_ids(&self) -> Vec<ProductionId> {
        self.productions.iter().map(|p| p.id()).collect()
    }
}

impl Production for CompositeProduction {
    fn id(&self) -> ProductionId {
        self.id.clone()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, graph: &Hypergraph) -> GrammarResult<Option<Hypergraph>> {
        for production in &self.productions {
            if let Some(next) = production.apply(graph)? {
                return Ok(Some(next));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for CompositeProduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeProduction")
            .field("id", &self.id)
            .field("productions", &self.production_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;
    use crate::test_fixtures::{hexagon_graph, quad_graph};
    use crate::{Prod0, Prod10, Prod9};
    use hypergrammar_core::{criterion_fn, AcceptAll, EdgeKind, RejectAll};

    #[test]
    fn test_production_id_equality() {
        let a = ProductionId::new("prod0");
        let b = ProductionId::from("prod0");
        assert_eq!(a, b);
        assert_ne!(a, ProductionId::new("prod9"));
        assert_eq!(a.to_string(), "prod0");
    }

    #[test]
    fn test_production_meta_names_production() {
        let meta = production_meta(&ProductionId::new("prod9"));
        assert_eq!(meta.get("production").and_then(Value::as_str), Some("prod9"));
    }

    #[test]
    fn test_local_criterion_overrides_graph_criterion() {
        let mut graph = quad_graph(0);
        graph.set_rfc(Some(Arc::new(AcceptAll)));
        let q = graph.edges_of_kind(EdgeKind::Q).next().unwrap().clone();
        let id = ProductionId::new("prod0");

        let reject: Arc<dyn RefinementCriterion> = Arc::new(RejectAll);
        assert!(!criterion_accepts(&id, Some(&reject), &q, &graph));
        assert!(criterion_accepts(&id, None, &q, &graph));

        graph.set_rfc(Some(Arc::new(RejectAll)));
        let accept: Arc<dyn RefinementCriterion> = Arc::new(AcceptAll);
        assert!(criterion_accepts(&id, Some(&accept), &q, &graph));
        assert!(!criterion_accepts(&id, None, &q, &graph));
    }

    #[test]
    fn test_no_criterion_is_permissive() {
        let graph = quad_graph(0);
        let q = graph.edges_of_kind(EdgeKind::Q).next().unwrap();
        assert!(criterion_accepts(&ProductionId::new("prod0"), None, q, &graph));
    }

    #[test]
    fn test_criterion_receives_production_meta() {
        let rfc = criterion_fn(|_, _, meta| {
            meta.and_then(|m| m.get("production"))
                .and_then(Value::as_str)
                == Some("prod9")
        });
        let graph = hexagon_graph(0, 0);

        assert!(Prod9::new().with_rfc(rfc.clone()).apply(&graph).unwrap().is_some());
        assert!(Prod0::new().with_rfc(rfc).apply(&quad_graph(0)).unwrap().is_none());
    }

    #[test]
    fn test_composite_tries_in_order() {
        let composite = CompositeProduction::new("hexagon", "Mark then propagate")
            .add_production(Arc::new(Prod10::new()))
            .add_production(Arc::new(Prod9::new()));
        assert_eq!(
            composite.production_ids(),
            vec![ProductionId::new("prod10"), ProductionId::new("prod9")]
        );

        // Nothing is marked yet, so Prod10 passes and Prod9 marks the hexagon.
        let marked = composite.apply(&hexagon_graph(0, 0)).unwrap().unwrap();
        let q = marked.edges_of_kind(EdgeKind::Q).next().unwrap();
        assert!(q.is_marked());
        assert!(marked
            .edges_of_kind(EdgeKind::E)
            .all(|e| !e.is_marked()));

        // Now Prod10 goes first and propagates to the boundary.
        let propagated = composite.apply(&marked).unwrap().unwrap();
        assert!(propagated.edges_of_kind(EdgeKind::E).all(|e| e.is_marked()));

        assert!(composite.apply(&propagated).unwrap().is_none());
    }

    #[test]
    fn test_composite_propagates_errors() {
        let productions: Vec<Arc<dyn Production>> = vec![
            Arc::new(Prod0::new()) as Arc<dyn Production>,
            Arc::new(Prod9::new()),
        ];
        let composite = CompositeProduction::new("quad", "").with_productions(productions);

        let err = composite.apply(&hexagon_graph(0, 0)).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidTopology { found: 6, .. }));
    }
}
