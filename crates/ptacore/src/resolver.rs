//! Attribute resolver (spec §3.4, §4.7, L7).
//!
//! Resolving `a` on a class or super object walks the resolver's MRO once
//! and materializes the answer as a pointer-flow edge into the synthetic
//! slot `AttrPtr(R, $r_a)`; subsequent reads of `a` on `R` just read that
//! slot instead of re-walking the MRO. `resolveAttrIfNot` is the
//! memoization gate (`RA[R]`), `PA` is the persistent-attribute back-index
//! that makes `DelAttr` re-resolution (§8.1 P6) possible without
//! rescanning every resolver.
//!
//! This module only deposits pointer-flow edges and `PA`/`RA` bookkeeping;
//! it never touches `PT` directly; that stays the solver driver's job so a
//! single `ADD_POINTS_TO` dispatch can decide what to enqueue next.

use ahash::{AHashMap, AHashSet};

use crate::{context::CtxModel, flow::PointerFlowGraph, hierarchy::ClassHierarchy, intern::NameId, object::ObjId};

/// A resolver is either a class object or a super object, both identified
/// by the `ObjId` of the underlying `Class`/`Super` allocation.
pub type Resolver = ObjId;

/// Records of `(resolver, mro, position)` entries that persistently defined
/// an attribute, so `DelAttr` knows where to resume the search (spec §4.7,
/// §4.12). Keyed by `(definer, attr)`.
#[derive(Debug, Default)]
pub struct PersistentAttrIndex {
    entries: AHashMap<(ObjId, NameId), Vec<(Resolver, Vec<ObjId>, usize)>>,
}

impl PersistentAttrIndex {
    pub fn record(&mut self, definer: ObjId, attr: NameId, resolver: Resolver, mro: Vec<ObjId>, position: usize) {
        self.entries.entry((definer, attr)).or_default().push((resolver, mro, position));
    }

    #[must_use]
    pub fn take(&mut self, definer: ObjId, attr: NameId) -> Vec<(Resolver, Vec<ObjId>, usize)> {
        self.entries.remove(&(definer, attr)).unwrap_or_default()
    }

    #[must_use]
    pub fn is_persistent(&self, definer: ObjId, attr: NameId) -> bool {
        self.entries.contains_key(&(definer, attr))
    }
}

/// Which attributes have already been resolved at least once on a given
/// resolver (`RA[R]`, spec §4.7), so `resolveAttrIfNot` only walks an MRO
/// the first time a name is requested on it.
#[derive(Debug, Default)]
pub struct ResolvedAttrs {
    seen: AHashSet<(Resolver, NameId)>,
}

impl ResolvedAttrs {
    /// Returns `true` if `(resolver, attr)` was not seen before (and is now
    /// marked seen).
    pub fn mark_if_new(&mut self, resolver: Resolver, attr: NameId) -> bool {
        self.seen.insert((resolver, attr))
    }

    /// Every attribute already resolved at least once on `resolver` — used
    /// to re-materialize routes onto an MRO added after the fact (spec
    /// §4.7 "NewClass incremental").
    pub fn attrs_of(&self, resolver: Resolver) -> impl Iterator<Item = NameId> + '_ {
        self.seen.iter().filter(move |(r, _)| *r == resolver).map(|&(_, a)| a)
    }
}

/// Per-class-block attribute declarations discovered by the frontend's
/// lexical binding analysis (spec §3.1 `ClassBlock.attributes`) — the
/// source of "is `a` a persistent attribute of `P`" (`a ∈ PA[P]` in spec
/// language is really "is `a` declared on P's class block", we spell it
/// `PersistentAttrs` to avoid colliding with [`PersistentAttrIndex`]).
#[derive(Debug, Default)]
pub struct PersistentAttrs {
    declared: AHashMap<ObjId, AHashSet<NameId>>,
}

impl PersistentAttrs {
    pub fn declare(&mut self, class_obj: ObjId, attrs: impl IntoIterator<Item = NameId>) {
        self.declared.entry(class_obj).or_default().extend(attrs);
    }

    #[must_use]
    pub fn has(&self, class_obj: ObjId, attr: NameId) -> bool {
        self.declared.get(&class_obj).is_some_and(|s| s.contains(&attr))
    }
}

/// Bundles the three indices the resolver reads/writes, borrowed together
/// from the solver so `resolve_attribute` doesn't need five parameters.
pub struct ResolverState<'a, C: CtxModel> {
    pub interner: &'a mut crate::intern::Interner,
    pub flow: &'a mut PointerFlowGraph<C>,
    pub hierarchy: &'a ClassHierarchy,
    pub resolved: &'a mut ResolvedAttrs,
    pub persistent_index: &'a mut PersistentAttrIndex,
    pub persistent_attrs: &'a PersistentAttrs,
}

/// A newly materialized `AttrPtr(P, a) -> AttrPtr(R, $r_a)` route. The
/// solver still owes this edge its initial contribution from `PT(P, a)` —
/// `PointerFlowGraph::put` only records the edge, it does not know about
/// `PT` — so resolution functions return every edge they actually inserted
/// rather than insert-and-forget.
pub type NewRoute = (crate::pointer::AttrPtr, crate::pointer::AttrPtr);

/// `resolveAttribute(R, a, (mro, start))` (spec §4.7): walks `mro[start..]`,
/// wiring `AttrPtr(P, a) -> AttrPtr(R, $r_a)` for every ancestor `P`, and
/// stops at (inclusive of) the first persistent definer. Returns the routes
/// that were newly inserted (edges already present are not re-reported).
pub fn resolve_attribute<C: CtxModel>(state: &mut ResolverState<'_, C>, resolver: Resolver, attr: NameId, mro: &[ObjId], start: usize) -> Vec<NewRoute> {
    let resolved_attr = state.interner.resolved_attr_name(attr);
    let child = crate::pointer::AttrPtr::new(resolver, resolved_attr);
    let mut routes = Vec::new();
    for &ancestor in &mro[start.min(mro.len())..] {
        let parent_attr = crate::pointer::AttrPtr::new(ancestor, attr);
        if state.flow.put(parent_attr.into(), child.into()) {
            routes.push((parent_attr, child));
        }
        if state.persistent_attrs.has(ancestor, attr) {
            state.persistent_index.record(ancestor, attr, resolver, mro.to_vec(), position_of(mro, ancestor));
            break;
        }
    }
    routes
}

fn position_of(mro: &[ObjId], ancestor: ObjId) -> usize {
    mro.iter().position(|&o| o == ancestor).unwrap_or(0)
}

/// `resolveAttrIfNot(R, a)` (spec §4.7): the memoized entry point. `type_of`
/// tells the resolver what object to pull MROs from: the resolver itself
/// for a class resolver, or the bound type for a super resolver together
/// with the index to search forward from.
pub enum ResolverKind {
    /// Plain class resolver: search every MRO of `class_obj` from the start.
    Class { class_obj: ObjId },
    /// Super resolver: search every MRO of `mro_source` (the bound class,
    /// or the bound instance's class in context-sensitive mode), starting
    /// just past `search_from`.
    Super { mro_source: ObjId, search_from: ObjId },
}

pub fn resolve_attr_if_not<C: CtxModel>(state: &mut ResolverState<'_, C>, resolver: Resolver, attr: NameId, kind: &ResolverKind) -> Vec<NewRoute> {
    if !state.resolved.mark_if_new(resolver, attr) {
        return Vec::new();
    }
    let mut routes = Vec::new();
    match kind {
        ResolverKind::Class { class_obj } => {
            let mros: Vec<Vec<ObjId>> = state.hierarchy.mros_of(*class_obj).map(<[ObjId]>::to_vec).collect();
            for mro in mros {
                routes.extend(resolve_attribute(state, resolver, attr, &mro, 0));
            }
        }
        ResolverKind::Super { mro_source, search_from } => {
            let mros: Vec<Vec<ObjId>> = state.hierarchy.mros_of(*mro_source).map(<[ObjId]>::to_vec).collect();
            for mro in mros {
                let start = mro.iter().position(|&o| o == *search_from).map_or(mro.len(), |i| i + 1);
                routes.extend(resolve_attribute(state, resolver, attr, &mro, start));
            }
        }
    }
    routes
}

/// **DelAttr** re-resolution (spec §4.7, §4.12, P6): after `a` is deleted
/// from `definer`, every resolver that had stopped its search at `definer`
/// resumes one position further down each recorded MRO.
pub fn process_del_attr<C: CtxModel>(state: &mut ResolverState<'_, C>, definer: ObjId, attr: NameId) -> Vec<NewRoute> {
    let mut routes = Vec::new();
    for (resolver, mro, position) in state.persistent_index.take(definer, attr) {
        routes.extend(resolve_attribute(state, resolver, attr, &mro, position + 1));
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{intern::Interner, ir::StmtId, object::ObjectPool};

    fn class_obj(pool: &mut ObjectPool<()>, n: u32, class_block: crate::ir::BlockId) -> ObjId {
        pool.create(crate::object::ObjectData::Class { site: StmtId(n), ctx: (), class_block })
    }

    #[test]
    fn override_resolves_to_first_definer() {
        // class A: def f(self): ...
        // class B(A): def f(self): ...
        // B is first definer in (B, A) -> only B.f's edge materializes before
        // the search stops.
        let mut pool: ObjectPool<()> = ObjectPool::new();
        let a = class_obj(&mut pool, 1, crate::ir::BlockId(1));
        let b = class_obj(&mut pool, 2, crate::ir::BlockId(2));

        let mut interner = Interner::new();
        let f = interner.intern("f");
        let mut flow: PointerFlowGraph<()> = PointerFlowGraph::new();
        let hierarchy = {
            let mut ch = ClassHierarchy::new();
            ch.add_class(a, &[]);
            ch.add_class(b, &[vec![a]]);
            ch
        };
        let mut resolved = ResolvedAttrs::default();
        let mut persistent_index = PersistentAttrIndex::default();
        let mut persistent_attrs = PersistentAttrs::default();
        persistent_attrs.declare(a, [f]);
        persistent_attrs.declare(b, [f]);

        let mut state = ResolverState {
            interner: &mut interner,
            flow: &mut flow,
            hierarchy: &hierarchy,
            resolved: &mut resolved,
            persistent_index: &mut persistent_index,
            persistent_attrs: &persistent_attrs,
        };
        resolve_attr_if_not(&mut state, b, f, &ResolverKind::Class { class_obj: b });

        let resolved_f = interner.resolved_attr_name(f);
        let child = crate::pointer::AttrPtr::new(b, resolved_f);
        let from_b = crate::pointer::AttrPtr::new(b, f);
        let from_a = crate::pointer::AttrPtr::new(a, f);
        assert!(flow.successors(&from_b.into()).any(|p| *p == child.into()));
        // A's edge never materializes: B is the first (and only) definer walked.
        assert!(!flow.successors(&from_a.into()).any(|p| *p == child.into()));
    }

    #[test]
    fn del_attr_resumes_search_past_deleted_definer() {
        let mut pool: ObjectPool<()> = ObjectPool::new();
        let a = class_obj(&mut pool, 1, crate::ir::BlockId(1));
        let b = class_obj(&mut pool, 2, crate::ir::BlockId(2));

        let mut interner = Interner::new();
        let f = interner.intern("f");
        let mut flow: PointerFlowGraph<()> = PointerFlowGraph::new();
        let hierarchy = {
            let mut ch = ClassHierarchy::new();
            ch.add_class(a, &[]);
            ch.add_class(b, &[vec![a]]);
            ch
        };
        let mut resolved = ResolvedAttrs::default();
        let mut persistent_index = PersistentAttrIndex::default();
        let mut persistent_attrs = PersistentAttrs::default();
        persistent_attrs.declare(a, [f]);
        persistent_attrs.declare(b, [f]);

        let mut state = ResolverState {
            interner: &mut interner,
            flow: &mut flow,
            hierarchy: &hierarchy,
            resolved: &mut resolved,
            persistent_index: &mut persistent_index,
            persistent_attrs: &persistent_attrs,
        };
        resolve_attr_if_not(&mut state, b, f, &ResolverKind::Class { class_obj: b });
        process_del_attr(&mut state, b, f);

        let resolved_f = interner.resolved_attr_name(f);
        let child = crate::pointer::AttrPtr::new(b, resolved_f);
        let from_a = crate::pointer::AttrPtr::new(a, f);
        assert!(flow.successors(&from_a.into()).any(|p| *p == child.into()), "search should resume at A after B's definition is deleted");
    }
}
