//! Per-statement binding and edge rules (spec §4.2, §4.3, §4.7, L7/L8).
//!
//! Everything here is the glue the resolver module itself stays blind to:
//! `resolver.rs` only ever hands back the routes it newly wired, and this
//! file is what turns a route into an actual `ADD_POINTS_TO` by reading
//! `PT` and running it through `apply_phi`. Keeping that split means the
//! resolver can be unit-tested against a bare `PointerFlowGraph` while the
//! solver stays the only thing that ever touches `PT`.

use crate::{
    binding::{BindingKind, StmtInfo},
    context::CtxModel,
    intern::NameId,
    ir::{Stmt, StmtKind, Variable, VariableKind},
    object::{CtxVar, ObjId, ObjectData},
    pointer::{AttrPtr, Pointer, VarPtr},
    resolver::{self, NewRoute, ResolverKind, ResolverState},
    tracer::SolverTracer,
};

use super::{Event, Solver};

impl<C: CtxModel, Tr: SolverTracer<C>> Solver<'_, C, Tr> {
    /// Builds a `Variable` for a bare `(block, local)` pair. Identity is
    /// `(block, local)` only (see `ir::variable`), so the placeholder
    /// name/kind here never affects pointer equality.
    pub(super) fn variable_of(&self, block: crate::ir::BlockId, local: crate::ir::VarId) -> Variable {
        Variable::new(block, local, NameId::default(), VariableKind::Temporary)
    }

    /// `ADD_POINTS_TO(ptr, objs)` (spec §4.1).
    pub(super) fn add_points_to(&mut self, ptr: Pointer<C>, objs: Vec<ObjId>) {
        if objs.is_empty() {
            return;
        }
        self.enqueue(Event::AddPointsTo(ptr, objs));
    }

    /// `PF.put(src, tgt)` plus its required follow-up (spec §4.3): on first
    /// insertion, enqueue the edge's current contribution from `PT(src)`
    /// transformed by Φ.
    pub(super) fn put_flow_edge(&mut self, src: Pointer<C>, tgt: Pointer<C>) {
        if !self.pf.put(src.clone(), tgt.clone()) {
            return;
        }
        let current: Vec<ObjId> = self.pt.get(&src).iter().copied().collect();
        if current.is_empty() {
            return;
        }
        let transformed = self.apply_phi(&src, &tgt, &current);
        self.add_points_to(tgt, transformed);
    }

    /// The method-binding edge transform Φ (spec §4.7.2): identity unless
    /// `tgt` is a resolved-attribute slot `AttrPtr(O, $r_a)`, in which case
    /// every flowing `FunctionObject` is bound to its resolver. `src` is
    /// unused by the rule itself but kept in the signature so every call
    /// site (both here and in the work-list dispatcher) reads the same way.
    pub(super) fn apply_phi(&mut self, _src: &Pointer<C>, tgt: &Pointer<C>, delta: &[ObjId]) -> Vec<ObjId> {
        let Pointer::Attr(attr_ptr) = tgt else {
            return delta.to_vec();
        };
        if !self.interner.is_resolved_attr(attr_ptr.attr) {
            return delta.to_vec();
        }
        delta.iter().map(|&o| self.bind_method(attr_ptr.obj, o)).collect()
    }

    /// Substitutes `o` into a bound-method object if `owner` (the resolver
    /// an edge terminates on) and `o`'s kind call for it; otherwise returns
    /// `o` unchanged.
    fn bind_method(&mut self, owner: ObjId, o: ObjId) -> ObjId {
        match self.objects.get(owner).clone() {
            ObjectData::Class { .. } => {
                if self.objects.get(o).is_function() {
                    self.objects.create(ObjectData::ClassMethod { class_obj: owner, func: o })
                } else {
                    o
                }
            }
            ObjectData::Instance { .. } if C::is_context_sensitive() => {
                if self.objects.get(o).is_function() {
                    self.objects.create(ObjectData::InstanceMethod { self_obj: owner, func: o })
                } else {
                    o
                }
            }
            ObjectData::Super { bound, .. } => self.bind_method(bound, o),
            _ => o,
        }
    }

    /// `GetAttr`/`SetAttr` binding plus every statement kind in §4.2 that
    /// registers into `B`/`AG` and re-evaluates once with the current `PT`.
    pub(super) fn bind_stmt(&mut self, stmt: &Stmt, ctx: C) {
        match &stmt.kind {
            StmtKind::GetAttr { target, source, attr } => {
                let src_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *source), &ctx);
                let tgt_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *target), &ctx);
                self.attr_graph.add_get_attr(src_ptr.clone(), tgt_ptr.clone(), *attr);
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(src_ptr.clone())).iter().copied().collect();
                for obj in current {
                    self.get_edge_rule(&src_ptr, obj, *attr, &tgt_ptr);
                }
            }
            StmtKind::SetAttr { target, attr, source } => {
                let tgt_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *target), &ctx);
                let src_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *source), &ctx);
                self.attr_graph.add_set_attr(tgt_ptr.clone(), src_ptr.clone(), *attr);
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(tgt_ptr)).iter().copied().collect();
                for obj in current {
                    self.put_flow_edge(Pointer::Var(src_ptr.clone()), AttrPtr::new(obj, *attr).into());
                }
            }
            StmtKind::NewClass { bases, .. } => {
                for (i, &base) in bases.iter().enumerate() {
                    let base_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, base), &ctx);
                    self.binding.bind(BindingKind::NewClass, base_ptr.clone(), StmtInfo::NewClassBase { stmt: stmt.id, base_index: u32::try_from(i).unwrap() });
                    let current: Vec<ObjId> = self.pt.get(&Pointer::Var(base_ptr)).iter().copied().collect();
                    self.process_new_class_base(stmt.id, i, &ctx, &current);
                }
            }
            StmtKind::Call { callee, .. } => {
                let callee_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *callee), &ctx);
                self.binding.bind(BindingKind::Call, callee_ptr.clone(), StmtInfo::Call { stmt: stmt.id });
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(callee_ptr)).iter().copied().collect();
                self.process_call(stmt.id, &ctx, &current);
            }
            StmtKind::DelAttr { var, .. } => {
                let ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *var), &ctx);
                self.binding.bind(BindingKind::DelAttr, ptr.clone(), StmtInfo::DelAttr { stmt: stmt.id });
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(ptr)).iter().copied().collect();
                self.process_del_attr_stmt(stmt.id, &ctx, &current);
            }
            StmtKind::NewStaticMethod { func, .. } => {
                let ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *func), &ctx);
                self.binding.bind(BindingKind::NewStaticMethod, ptr.clone(), StmtInfo::NewStaticMethod { stmt: stmt.id });
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(ptr)).iter().copied().collect();
                self.process_new_static_method(stmt.id, &ctx, &current);
            }
            StmtKind::NewClassMethod { func, .. } => {
                let ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *func), &ctx);
                self.binding.bind(BindingKind::NewClassMethod, ptr.clone(), StmtInfo::NewClassMethod { stmt: stmt.id });
                let current: Vec<ObjId> = self.pt.get(&Pointer::Var(ptr)).iter().copied().collect();
                self.process_new_class_method(stmt.id, &ctx, &current);
            }
            StmtKind::NewSuper { ty, bound, .. } => {
                if let Some(ty_var) = ty {
                    let ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *ty_var), &ctx);
                    self.binding.bind(BindingKind::NewSuper, ptr.clone(), StmtInfo::NewSuperType { stmt: stmt.id });
                    let current: Vec<ObjId> = self.pt.get(&Pointer::Var(ptr)).iter().copied().collect();
                    self.process_new_super_type(stmt.id, &ctx, &current);
                }
                if let Some(bound_var) = bound {
                    let ptr = self.var_ptr(self.variable_of(stmt.belongs_to, *bound_var), &ctx);
                    self.binding.bind(BindingKind::NewSuper, ptr.clone(), StmtInfo::NewSuperBound { stmt: stmt.id });
                    let current: Vec<ObjId> = self.pt.get(&Pointer::Var(ptr)).iter().copied().collect();
                    self.process_new_super_bound(stmt.id, &ctx, &current);
                }
            }
            // Assign/NewModule/NewFunction/NewBuiltin already ran their one-shot
            // effect in reachability expansion (§4.1); nothing left to bind.
            _ => {}
        }
    }

    /// The GET-edge rule (spec §4.7) for a single newly arrived `obj` on a
    /// `GetAttr`'s source.
    pub(super) fn get_edge_rule(&mut self, source: &VarPtr<C>, obj: ObjId, attr: NameId, target: &VarPtr<C>) {
        match self.objects.get(obj).clone() {
            ObjectData::Fake { .. } => {
                let f = self.fake_create(obj, source.clone(), target.clone(), attr);
                self.add_points_to(Pointer::Var(target.clone()), vec![f]);
            }
            ObjectData::Class { .. } => {
                self.do_resolve_attr_if_not(obj, attr, ResolverKind::Class { class_obj: obj });
                let resolved = self.interner.resolved_attr_name(attr);
                self.put_flow_edge(AttrPtr::new(obj, resolved).into(), Pointer::Var(target.clone()));
            }
            ObjectData::Super { ty, bound } => {
                let mro_source = match self.objects.get(bound) {
                    ObjectData::Instance { class_obj, .. } => *class_obj,
                    _ => bound,
                };
                self.do_resolve_attr_if_not(obj, attr, ResolverKind::Super { mro_source, search_from: ty });
                let resolved = self.interner.resolved_attr_name(attr);
                self.put_flow_edge(AttrPtr::new(obj, resolved).into(), Pointer::Var(target.clone()));
            }
            ObjectData::Instance { class_obj, .. } if C::is_context_sensitive() => {
                self.put_flow_edge(AttrPtr::new(obj, attr).into(), Pointer::Var(target.clone()));
                let resolved = self.interner.resolved_attr_name(attr);
                self.put_flow_edge(AttrPtr::new(obj, resolved).into(), Pointer::Var(target.clone()));
                self.do_resolve_attr_if_not(class_obj, attr, ResolverKind::Class { class_obj });
                self.put_flow_edge(AttrPtr::new(class_obj, resolved).into(), AttrPtr::new(obj, resolved).into());
            }
            _ => {
                self.put_flow_edge(AttrPtr::new(obj, attr).into(), Pointer::Var(target.clone()));
            }
        }
    }

    /// `FakeObject.create` (spec §4.7.1): walks `prefix`'s own chain first,
    /// collapsing onto a prior node that carries the identical witness
    /// rather than growing the chain forever.
    fn fake_create(&mut self, prefix: ObjId, source: VarPtr<C>, target: VarPtr<C>, attr: NameId) -> ObjId {
        let witness = (CtxVar { var: source.var, ctx: source.ctx }, CtxVar { var: target.var, ctx: target.ctx }, attr);
        let mut cursor = Some(prefix);
        while let Some(node) = cursor {
            match self.objects.get(node) {
                ObjectData::Fake { witness: Some(w), .. } if *w == witness => return node,
                ObjectData::Fake { prefix: p, .. } => cursor = *p,
                _ => break,
            }
        }
        self.objects.create(ObjectData::Fake { prefix: Some(prefix), witness: Some(witness), root: None })
    }

    /// `resolveAttrIfNot` (spec §4.7): memoized MRO walk, with the resulting
    /// routes immediately given their initial `PT` contribution.
    pub(super) fn do_resolve_attr_if_not(&mut self, resolver: ObjId, attr: NameId, kind: ResolverKind) {
        let routes = {
            let mut state = ResolverState {
                interner: &mut self.interner,
                flow: &mut self.pf,
                hierarchy: &self.hierarchy,
                resolved: &mut self.resolved_attrs,
                persistent_index: &mut self.persistent_index,
                persistent_attrs: &self.persistent_attrs,
            };
            resolver::resolve_attr_if_not(&mut state, resolver, attr, &kind)
        };
        self.tracer.on_attribute_resolved(resolver, attr);
        self.propagate_new_attr_edges(routes);
    }

    /// Reads `PT(src)` for every newly materialized resolver route and
    /// enqueues its Φ-transformed contribution onto `tgt` — the half of
    /// spec §4.3 the resolver itself cannot perform since it never touches
    /// `PT`.
    pub(super) fn propagate_new_attr_edges(&mut self, routes: Vec<NewRoute>) {
        for (src, tgt) in routes {
            let src_ptr: Pointer<C> = src.into();
            let tgt_ptr: Pointer<C> = tgt.into();
            let current: Vec<ObjId> = self.pt.get(&src_ptr).iter().copied().collect();
            if current.is_empty() {
                continue;
            }
            let transformed = self.apply_phi(&src_ptr, &tgt_ptr, &current);
            self.add_points_to(tgt_ptr, transformed);
        }
    }

    /// The SET-edge rule (spec §4.7) for every newly arrived object on a
    /// `SetAttr`'s target.
    pub(super) fn run_set_attr_rules(&mut self, var_ptr: &VarPtr<C>, delta: &[ObjId]) {
        let entries: Vec<(VarPtr<C>, NameId)> = self.attr_graph.set_attrs_onto(var_ptr).to_vec();
        for (source, attr) in entries {
            for &obj in delta {
                self.put_flow_edge(Pointer::Var(source.clone()), AttrPtr::new(obj, attr).into());
            }
        }
    }

    /// The GET-edge rule, driven from `ADD_POINTS_TO` dispatch rather than
    /// first binding (spec §4.1: "for each `(target, attr)` where `p` is the
    /// source of a GetAttr: apply the GET-edge rule with `δ`").
    pub(super) fn run_get_attr_rules(&mut self, var_ptr: &VarPtr<C>, delta: &[ObjId]) {
        let entries: Vec<(VarPtr<C>, NameId)> = self.attr_graph.get_attrs_from(var_ptr).to_vec();
        for (target, attr) in entries {
            for &obj in delta {
                self.get_edge_rule(var_ptr, obj, attr, &target);
            }
        }
    }

    /// Re-invokes every statement-kind processor bound at `var_ptr` with the
    /// newly-arrived `delta` (spec §4.1's "for each statement kind k in B").
    pub(super) fn run_bound_processors(&mut self, var_ptr: &VarPtr<C>, delta: &[ObjId]) {
        let kinds: Vec<BindingKind> = self.binding.kinds_at(var_ptr).collect();
        let ctx = var_ptr.ctx.clone();
        for kind in kinds {
            let infos: Vec<StmtInfo> = self.binding.get(kind, var_ptr).to_vec();
            for info in infos {
                match info {
                    StmtInfo::NewClassBase { stmt, base_index } => {
                        self.process_new_class_base(stmt, base_index as usize, &ctx, delta);
                    }
                    StmtInfo::Call { stmt } => self.process_call(stmt, &ctx, delta),
                    StmtInfo::DelAttr { stmt } => self.process_del_attr_stmt(stmt, &ctx, delta),
                    StmtInfo::NewStaticMethod { stmt } => self.process_new_static_method(stmt, &ctx, delta),
                    StmtInfo::NewClassMethod { stmt } => self.process_new_class_method(stmt, &ctx, delta),
                    StmtInfo::NewSuperType { stmt } => self.process_new_super_type(stmt, &ctx, delta),
                    StmtInfo::NewSuperBound { stmt } => self.process_new_super_bound(stmt, &ctx, delta),
                }
            }
        }
    }

    /// DelAttr processor (spec §4.7, §4.12).
    pub(super) fn process_del_attr_stmt(&mut self, stmt_id: crate::ir::StmtId, _ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let StmtKind::DelAttr { attr, .. } = &stmt.kind else { return };
        for &obj in delta {
            let routes = {
                let mut state = ResolverState {
                    interner: &mut self.interner,
                    flow: &mut self.pf,
                    hierarchy: &self.hierarchy,
                    resolved: &mut self.resolved_attrs,
                    persistent_index: &mut self.persistent_index,
                    persistent_attrs: &self.persistent_attrs,
                };
                resolver::process_del_attr(&mut state, obj, *attr)
            };
            self.tracer.on_del_attr(obj, *attr);
            self.propagate_new_attr_edges(routes);
        }
    }
}
