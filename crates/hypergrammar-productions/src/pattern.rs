//! Boundary-cycle matching shared by the productions.
//!
//! An element is well formed when its vertices can be arranged in a cycle
//! `(v0, v1, ..., v{n-1})` whose consecutive pairs, wrap-around included, are
//! all `E` edges of the graph. The vertex set is unordered, so the matcher
//! walks the permutations of the sorted vertices in lexicographic order and
//! tests each one as a candidate cycle.
//!
//! This is O(n!) edge lookups. It is only sound for the fixed element arities
//! of the grammar (4 and 6); larger elements need a real Hamiltonian-cycle
//! search on the boundary instead.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use hypergrammar_core::{Edge, EdgeKind, Hypergraph, VertexId};
use serde::{Deserialize, Serialize};

/// How the matcher enumerates candidate cycles.
///
/// Both strategies return the same cycle: the first match in lexicographic
/// permutation order always starts at the smallest vertex, which is already a
/// canonical rotation. The choice only changes how many permutations are
/// tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleSearch {
    /// Test one representative per rotation class (n!/n cycles).
    #[default]
    CanonicalRotation,
    /// Test every permutation (n! cycles).
    Exhaustive,
}

/// Rotate `seq` so that it starts at its smallest element.
///
/// Every rotation of a cyclic sequence maps to the same result. Reflections
/// do not: `[A, B, C, D]` and `[D, C, B, A]` describe the same cycle but
/// canonicalize to `[A, B, C, D]` and `[A, D, C, B]`.
pub fn canonical_rotation<T: Ord + Clone>(seq: &[T]) -> Vec<T> {
    let Some(start) = seq
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    seq[start..].iter().chain(&seq[..start]).cloned().collect()
}

/// Lexicographic permutations of a sorted item list.
#[derive(Debug, Clone)]
pub struct Permutations<T> {
    current: Vec<T>,
    exhausted: bool,
}

impl<T: Ord + Clone> Permutations<T> {
    /// Start at the smallest permutation of `items`.
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort();
        Self {
            current: items,
            exhausted: false,
        }
    }
}

impl<T: Ord + Clone> Iterator for Permutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let out = self.current.clone();
        self.exhausted = !next_permutation(&mut self.current);
        Some(out)
    }
}

/// Advance `v` to its next lexicographic permutation. Returns `false` at the last one.
fn next_permutation<T: Ord>(v: &mut [T]) -> bool {
    if v.len() < 2 {
        return false;
    }

    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// A boundary cycle found around an element, with the `E` edge of each side.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryMatch<'g> {
    /// Vertices in cycle order, starting at the smallest.
    pub cycle: Vec<VertexId>,
    /// `edges[i]` joins `cycle[i]` and `cycle[(i + 1) % n]`.
    pub edges: Vec<&'g Edge>,
}

/// Lookup table from an unordered vertex pair to the `E` edge joining it.
///
/// When several `E` edges share a pair (differing only in parameters) the
/// first one in edge order wins.
#[derive(Debug, Clone)]
pub struct BoundaryIndex<'g> {
    segments: BTreeMap<(VertexId, VertexId), &'g Edge>,
}

impl<'g> BoundaryIndex<'g> {
    /// Index every two-vertex `E` edge of `graph`.
    pub fn new(graph: &'g Hypergraph) -> Self {
        let mut segments = BTreeMap::new();

        for edge in graph.edges_of_kind(EdgeKind::E) {
            let mut vertices = edge.vertices().iter();
            if let (Some(a), Some(b), None) = (vertices.next(), vertices.next(), vertices.next()) {
                segments.entry((a.clone(), b.clone())).or_insert(edge);
            }
        }

        Self { segments }
    }

    /// Number of indexed segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the graph had no usable `E` edges.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The `E` edge joining `a` and `b`, if any.
    pub fn segment(&self, a: &VertexId, b: &VertexId) -> Option<&'g Edge> {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.segments.get(&key).copied()
    }

    /// Check that every consecutive pair of `cycle`, wrap-around included, is joined.
    pub fn closes_cycle(&self, cycle: &[VertexId]) -> bool {
        self.cycle_edges(cycle).is_some()
    }

    /// Edges along `cycle`, or `None` as soon as one side is missing.
    pub fn cycle_edges(&self, cycle: &[VertexId]) -> Option<Vec<&'g Edge>> {
        cycle
            .iter()
            .zip(cycle.iter().cycle().skip(1))
            .map(|(a, b)| self.segment(a, b))
            .collect()
    }

    /// Search for a boundary cycle through exactly `vertices`.
    ///
    /// Returns `None` for fewer than three vertices: two vertices joined by a
    /// single segment are not an element boundary.
    pub fn match_element(
        &self,
        vertices: &BTreeSet<VertexId>,
        search: CycleSearch,
    ) -> Option<BoundaryMatch<'g>> {
        if vertices.len() < 3 {
            return None;
        }

        let mut seen: HashSet<Vec<VertexId>> = HashSet::new();
        for perm in Permutations::new(vertices.iter().cloned().collect()) {
            if search == CycleSearch::CanonicalRotation && !seen.insert(canonical_rotation(&perm)) {
                continue;
            }
            if let Some(edges) = self.cycle_edges(&perm) {
                return Some(BoundaryMatch { cycle: perm, edges });
            }
        }

        None
    }
}

/// Find a boundary cycle for `vertices` in `graph`.
pub fn find_boundary_cycle(
    graph: &Hypergraph,
    vertices: &BTreeSet<VertexId>,
    search: CycleSearch,
) -> Option<Vec<VertexId>> {
    BoundaryIndex::new(graph)
        .match_element(vertices, search)
        .map(|m| m.cycle)
}
