//! Call graph with dual folding (spec §6.3): "either (caller readable name
//! → set of callee readable names) or (call statement → set of callee code
//! blocks). Both foldings are required."
//!
//! Both maps are populated from the same `add_edge` call so they can never
//! drift apart; keeping them as two independent multimaps (rather than
//! deriving one from the other on demand) matches the reference
//! implementation's `self.callgraph` / `self.cg_names`-style dual
//! bookkeeping and keeps each query O(1) amortized.

use ahash::{AHashMap, AHashSet};

use crate::{intern::NameId, ir::BlockId, ir::StmtId};

#[derive(Debug, Default)]
pub struct CallGraph {
    by_readable_name: AHashMap<NameId, AHashSet<NameId>>,
    by_call_stmt: AHashMap<StmtId, AHashSet<BlockId>>,
}

impl CallGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the call at `site` (in a block whose readable name is
    /// `caller_name`) may invoke the code block `callee_block` (whose
    /// readable name is `callee_name`).
    pub fn add_edge(&mut self, site: StmtId, caller_name: NameId, callee_block: BlockId, callee_name: NameId) {
        self.by_readable_name.entry(caller_name).or_default().insert(callee_name);
        self.by_call_stmt.entry(site).or_default().insert(callee_block);
    }

    #[must_use]
    pub fn callees_by_name(&self, caller_name: NameId) -> impl Iterator<Item = NameId> + '_ {
        self.by_readable_name.get(&caller_name).into_iter().flatten().copied()
    }

    #[must_use]
    pub fn callees_by_stmt(&self, site: StmtId) -> impl Iterator<Item = BlockId> + '_ {
        self.by_call_stmt.get(&site).into_iter().flatten().copied()
    }

    pub fn iter_by_name(&self) -> impl Iterator<Item = (NameId, &AHashSet<NameId>)> {
        self.by_readable_name.iter().map(|(&k, v)| (k, v))
    }

    pub fn iter_by_stmt(&self) -> impl Iterator<Item = (StmtId, &AHashSet<BlockId>)> {
        self.by_call_stmt.iter().map(|(&k, v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_appears_under_both_foldings() {
        let mut cg = CallGraph::new();
        let caller = NameId::default();
        let callee_name = NameId::default();
        let site = StmtId(1);
        let callee_block = BlockId(2);
        cg.add_edge(site, caller, callee_block, callee_name);
        assert_eq!(cg.callees_by_name(caller).count(), 1);
        assert_eq!(cg.callees_by_stmt(site).collect::<Vec<_>>(), vec![callee_block]);
    }
}
