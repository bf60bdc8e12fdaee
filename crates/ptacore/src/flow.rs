//! Pointer-flow graph (spec §3.4, §4.3, L4).
//!
//! `PF` is the set of directed edges "objects flow from P to Q". Edge
//! insertion is idempotent (`put` reports whether the edge is new) and, per
//! §4.3, insertion is the trigger point for the solver to push the edge's
//! current contribution onto the work list — the graph itself stays a pure
//! adjacency structure and does not know about the work list.

use ahash::{AHashMap, AHashSet};

use crate::{context::CtxModel, pointer::Pointer};

/// Directed graph over pointers: `successors(p)` are the `q` such that
/// objects flowing into `p` also flow into `q`.
#[derive(Debug)]
pub struct PointerFlowGraph<C: CtxModel> {
    edges: AHashMap<Pointer<C>, AHashSet<Pointer<C>>>,
}

impl<C: CtxModel> Default for PointerFlowGraph<C> {
    fn default() -> Self {
        Self { edges: AHashMap::new() }
    }
}

impl<C: CtxModel> PointerFlowGraph<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the edge `src -> tgt`. Returns `true` on first insertion
    /// (spec §4.3: "`PF.put(src, tgt)` returns true on first insertion").
    pub fn put(&mut self, src: Pointer<C>, tgt: Pointer<C>) -> bool {
        self.edges.entry(src).or_default().insert(tgt)
    }

    pub fn successors(&self, p: &Pointer<C>) -> impl Iterator<Item = &Pointer<C>> {
        self.edges.get(p).into_iter().flatten()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|s| s.len()).sum()
    }
}
