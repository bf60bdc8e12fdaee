//! Points-to store (spec §3.4, §4.4, L3).
//!
//! `PT` is a partial function `Pointer -> Set<Object>` with monotone
//! insertion (invariant PT-1). `putAll` is the *only* mutator and returns
//! the actually-new subset, which is what the solver enqueues as the next
//! `ADD_POINTS_TO` wave — the same delta-returning shape as the reference
//! implementation's `PointToSet.putAll` and the teacher's
//! `Heap`/`Dict::put_all`-style "tell me what actually changed" helpers.

use ahash::{AHashMap, AHashSet};

use crate::{context::CtxModel, object::ObjId, pointer::Pointer};

/// Monotone pointer -> object-set mapping.
#[derive(Debug)]
pub struct PointsToStore<C: CtxModel> {
    sets: AHashMap<Pointer<C>, AHashSet<ObjId>>,
}

impl<C: CtxModel> Default for PointsToStore<C> {
    fn default() -> Self {
        Self { sets: AHashMap::new() }
    }
}

impl<C: CtxModel> PointsToStore<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of `PT(p)`. Missing entries behave as the empty set.
    #[must_use]
    pub fn get(&self, p: &Pointer<C>) -> &AHashSet<ObjId> {
        use std::sync::OnceLock;
        static EMPTY: OnceLock<AHashSet<ObjId>> = OnceLock::new();
        self.sets.get(p).unwrap_or_else(|| EMPTY.get_or_init(AHashSet::default))
    }

    /// Unions `objs` into `PT(p)`, returning only the subset that was not
    /// already present (`S \ PT(p)`). An empty return means the event
    /// contributed nothing and the caller should drop it.
    pub fn put_all(&mut self, p: Pointer<C>, objs: impl IntoIterator<Item = ObjId>) -> Vec<ObjId> {
        let set = self.sets.entry(p).or_default();
        let mut delta = Vec::new();
        for obj in objs {
            if set.insert(obj) {
                delta.push(obj);
            }
        }
        delta
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pointer<C>, &AHashSet<ObjId>)> {
        self.sets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        intern::NameId,
        ir::{BlockId, VarId, Variable, VariableKind},
        object::ObjId as Obj,
        pointer::VarPtr,
    };

    fn var_ptr(n: u32) -> Pointer<()> {
        Pointer::Var(VarPtr::new(
            Variable::new(BlockId(0), VarId(n), NameId::default(), VariableKind::Named),
            (),
        ))
    }

    /// `ObjId` has no public constructor outside the arena, so tests mint
    /// handles through a shared pool keyed by distinct allocation sites.
    fn objs(pool: &mut crate::object::ObjectPool<()>, n: u32) -> Obj {
        pool.create(crate::object::ObjectData::Builtin {
            site: crate::ir::StmtId(n),
            ctx: (),
            type_tag: NameId::default(),
            value: None,
        })
    }

    #[test]
    fn put_all_returns_only_new_objects() {
        let mut pt: PointsToStore<()> = PointsToStore::new();
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let p = var_ptr(0);
        let o1 = objs(&mut pool, 1);
        let o2 = objs(&mut pool, 2);
        let delta1 = pt.put_all(p.clone(), [o1]);
        assert_eq!(delta1, vec![o1]);
        let delta2 = pt.put_all(p.clone(), [o1, o2]);
        assert_eq!(delta2, vec![o2]);
        assert_eq!(pt.get(&p).len(), 2);
    }

    #[test]
    fn missing_pointer_reads_as_empty() {
        let pt: PointsToStore<()> = PointsToStore::new();
        assert!(pt.get(&var_ptr(5)).is_empty());
    }

    #[test]
    fn distinct_sites_mint_distinct_objects() {
        let mut pool: crate::object::ObjectPool<()> = crate::object::ObjectPool::new();
        let o1 = objs(&mut pool, 1);
        let o2 = objs(&mut pool, 2);
        assert_ne!(o1, o2);
    }
}
