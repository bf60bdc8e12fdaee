//! Call-site and class-hierarchy statement processors (spec §4.6-§4.12, L8).
//!
//! Every function here is re-run from two places: once when its binding is
//! first registered (with whatever is already in `PT`) and again every time
//! `ADD_POINTS_TO` grows one of its operands (`solver::stmt::run_bound_processors`).
//! None of them mutate `PT` directly — they end in `add_points_to`/
//! `put_flow_edge`/`propagate_new_attr_edges`, keeping the single
//! `dispatch_add_points_to` loop as the only place deltas are computed.

use crate::{
    context::CtxModel,
    intern::NameId,
    ir::{BlockId, FunctionBlock, StmtId},
    object::{ObjId, ObjectData},
    pointer::Pointer,
    resolver::{self, ResolverKind, ResolverState},
    tracer::SolverTracer,
};

use super::{Event, Solver};

impl<C: CtxModel, Tr: SolverTracer<C>> Solver<'_, C, Tr> {
    /// `NewClass` incremental base processor (spec §4.6): a class object
    /// newly arrives at one of `cls`'s base positions.
    pub(super) fn process_new_class_base(&mut self, stmt_id: StmtId, base_index: usize, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let crate::ir::StmtKind::NewClass { class_block, .. } = stmt.kind else { return };
        let site_ctx = self.obj_ctx(stmt.belongs_to, ctx);
        let class_obj = self.objects.create(ObjectData::Class { site: stmt.id, ctx: site_ctx, class_block });

        for &base in delta {
            if base == class_obj || !self.is_class_or_fake(base) {
                continue;
            }
            let added = self.hierarchy.add_class_base(class_obj, base_index, base);
            self.rematerialize_added_mros(added);
        }
    }

    fn is_class_or_fake(&self, obj: ObjId) -> bool {
        matches!(self.objects.get(obj), ObjectData::Class { .. } | ObjectData::Fake { .. })
    }

    /// For every `(class, mro)` pair the hierarchy update newly produced,
    /// re-resolves every attribute already resolved on `class` against the
    /// new MRO (spec §4.7 "NewClass incremental").
    pub(super) fn rematerialize_added_mros(&mut self, added: Vec<(ObjId, Vec<ObjId>)>) {
        for (cls, mro) in added {
            self.tracer.on_mro_added(cls);
            let attrs: Vec<NameId> = self.resolved_attrs.attrs_of(cls).collect();
            for attr in attrs {
                let routes = {
                    let mut state = ResolverState {
                        interner: &mut self.interner,
                        flow: &mut self.pf,
                        hierarchy: &self.hierarchy,
                        resolved: &mut self.resolved_attrs,
                        persistent_index: &mut self.persistent_index,
                        persistent_attrs: &self.persistent_attrs,
                    };
                    resolver::resolve_attribute(&mut state, cls, attr, &mro, 0)
                };
                self.propagate_new_attr_edges(routes);
            }
        }
    }

    /// Call processor (spec §4.8): dispatches on the callee object's kind.
    pub(super) fn process_call(&mut self, stmt_id: StmtId, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let crate::ir::StmtKind::Call { target, pos_args, kw_args, .. } = &stmt.kind else { return };
        let belongs_to = stmt.belongs_to;
        let target_ptr = self.var_ptr(self.variable_of(belongs_to, *target), ctx);
        let pos_arg_ptrs: Vec<_> = pos_args.iter().map(|&v| self.var_ptr(self.variable_of(belongs_to, v), ctx)).collect();
        let kw_arg_ptrs: Vec<(NameId, _)> = kw_args.iter().map(|(&name, &v)| (name, self.var_ptr(self.variable_of(belongs_to, v), ctx))).collect();

        for &callee_obj in delta {
            match self.objects.get(callee_obj).clone() {
                ObjectData::Function { function_block, .. } => {
                    self.invoke_function(stmt_id, ctx, function_block, None, None, &pos_arg_ptrs, &kw_arg_ptrs, &target_ptr, belongs_to);
                }
                ObjectData::StaticMethod { func } => {
                    if let ObjectData::Function { function_block, .. } = self.objects.get(func) {
                        let function_block = *function_block;
                        self.invoke_function(stmt_id, ctx, function_block, None, None, &pos_arg_ptrs, &kw_arg_ptrs, &target_ptr, belongs_to);
                    }
                }
                ObjectData::ClassMethod { class_obj, func } => {
                    if let ObjectData::Function { function_block, .. } = self.objects.get(func) {
                        let function_block = *function_block;
                        self.invoke_function(stmt_id, ctx, function_block, Some(class_obj), None, &pos_arg_ptrs, &kw_arg_ptrs, &target_ptr, belongs_to);
                    }
                }
                ObjectData::InstanceMethod { self_obj, func } if C::is_context_sensitive() => {
                    if let ObjectData::Function { function_block, .. } = self.objects.get(func) {
                        let function_block = *function_block;
                        let receiver_ctx = match self.objects.get(self_obj) {
                            ObjectData::Instance { site, ctx: inst_ctx, .. } => Some((inst_ctx.clone(), *site)),
                            _ => None,
                        };
                        self.invoke_function(stmt_id, ctx, function_block, Some(self_obj), receiver_ctx, &pos_arg_ptrs, &kw_arg_ptrs, &target_ptr, belongs_to);
                    }
                }
                ObjectData::Class { .. } => {
                    self.process_constructor_call(stmt_id, ctx, callee_obj, &target_ptr);
                }
                _ => {}
            }
        }
    }

    /// Shared invocation path for `Function`/`StaticMethod`/`ClassMethod`/
    /// `InstanceMethod` callees (spec §4.8): optionally bind a receiver into
    /// the callee's first positional parameter, match the remaining
    /// arguments, and wire the return flow plus call-graph edge.
    #[allow(clippy::too_many_arguments)]
    fn invoke_function(
        &mut self,
        stmt_id: StmtId,
        ctx: &C,
        function_block: BlockId,
        bind_first_arg: Option<ObjId>,
        receiver_ctx: Option<(C, StmtId)>,
        pos_arg_ptrs: &[crate::pointer::VarPtr<C>],
        kw_arg_ptrs: &[(NameId, crate::pointer::VarPtr<C>)],
        target_ptr: &crate::pointer::VarPtr<C>,
        caller_block: BlockId,
    ) {
        let Some(function) = self.program.block(function_block).as_function().cloned() else {
            return;
        };
        let receiver_for_selector = receiver_ctx.as_ref().map(|(c, s)| (c, *s));
        let callee_ctx = ctx.enter_call(self.config.k(), stmt_id, receiver_for_selector);
        let params_offset = if let Some(receiver) = bind_first_arg {
            let Some(&first_param) = function.pos_params.first() else {
                return; // spec §4.8: "if f has no positional parameter, skip"
            };
            let param_ptr = self.var_ptr(self.variable_of(function_block, first_param), &callee_ctx);
            self.add_points_to(Pointer::Var(param_ptr), vec![receiver]);
            1
        } else {
            0
        };
        self.match_arguments(function_block, &function, pos_arg_ptrs, kw_arg_ptrs, &callee_ctx, params_offset);
        self.finish_call(stmt_id, function_block, function.return_var, &callee_ctx, target_ptr, caller_block);
    }

    /// Argument matching (spec §4.8.1): positional args fill `pos_params`
    /// left-to-right past any receiver-bound slot, excess positional args
    /// spill into `vararg` if present, keyword args fill the matching
    /// `kw_params` entry by name or spill into `kwarg`. Arguments that
    /// cannot be matched at all are dropped.
    fn match_arguments(
        &mut self,
        function_block: BlockId,
        function: &FunctionBlock,
        pos_arg_ptrs: &[crate::pointer::VarPtr<C>],
        kw_arg_ptrs: &[(NameId, crate::pointer::VarPtr<C>)],
        callee_ctx: &C,
        params_offset: usize,
    ) {
        let remaining_params = &function.pos_params[params_offset.min(function.pos_params.len())..];
        let mut pos_iter = pos_arg_ptrs.iter();
        for &param in remaining_params {
            let Some(arg_ptr) = pos_iter.next() else { break };
            let param_ptr = self.var_ptr(self.variable_of(function_block, param), callee_ctx);
            self.put_flow_edge(Pointer::Var(arg_ptr.clone()), Pointer::Var(param_ptr));
        }
        if let Some(vararg) = function.vararg {
            let vararg_ptr = self.var_ptr(self.variable_of(function_block, vararg), callee_ctx);
            for arg_ptr in pos_iter {
                self.put_flow_edge(Pointer::Var(arg_ptr.clone()), Pointer::Var(vararg_ptr.clone()));
            }
        }

        for (name, arg_ptr) in kw_arg_ptrs {
            if let Some(&param) = function.kw_params.get(name) {
                let param_ptr = self.var_ptr(self.variable_of(function_block, param), callee_ctx);
                self.put_flow_edge(Pointer::Var(arg_ptr.clone()), Pointer::Var(param_ptr));
            } else if let Some(kwarg) = function.kwarg {
                let kwarg_ptr = self.var_ptr(self.variable_of(function_block, kwarg), callee_ctx);
                self.put_flow_edge(Pointer::Var(arg_ptr.clone()), Pointer::Var(kwarg_ptr));
            }
        }
    }

    /// Wires the callee's return flow, marks its body reachable, and records
    /// the call-graph edge under both foldings (spec §4.8, §6.3).
    fn finish_call(
        &mut self,
        stmt_id: StmtId,
        function_block: BlockId,
        return_var: crate::ir::VarId,
        callee_ctx: &C,
        target_ptr: &crate::pointer::VarPtr<C>,
        caller_block: BlockId,
    ) {
        let return_ptr = self.var_ptr(self.variable_of(function_block, return_var), callee_ctx);
        self.put_flow_edge(Pointer::Var(return_ptr), Pointer::Var(target_ptr.clone()));
        self.mark_reachable(function_block, callee_ctx.clone());
        let caller_name = self.program.block(caller_block).readable_name();
        let callee_name = self.program.block(function_block).readable_name();
        self.call_graph.add_edge(stmt_id, caller_name, function_block, callee_name);
        self.tracer.on_call_edge(stmt_id, callee_name);
    }

    /// Constructor-call processor (spec §4.8): allocates (or, in
    /// context-insensitive mode, reuses — §9 OQ1) an instance, resolves
    /// `__init__` on the class, and synthesizes a `$init_<id>` call so the
    /// rest of `process_call`'s machinery handles argument binding uniformly
    /// rather than duplicating it here.
    fn process_constructor_call(&mut self, stmt_id: StmtId, ctx: &C, class_obj: ObjId, target_ptr: &crate::pointer::VarPtr<C>) {
        let instance_obj = if C::is_context_sensitive() {
            self.objects.create(ObjectData::Instance { site: stmt_id, ctx: ctx.clone(), class_obj })
        } else {
            class_obj
        };
        self.add_points_to(Pointer::Var(target_ptr.clone()), vec![instance_obj]);

        let init_name = self.interner.intern("__init__");
        self.do_resolve_attr_if_not(class_obj, init_name, ResolverKind::Class { class_obj });
        let resolved_init = self.interner.resolved_attr_name(init_name);
        self.put_flow_edge(
            crate::pointer::AttrPtr::new(class_obj, resolved_init).into(),
            crate::pointer::AttrPtr::new(instance_obj, resolved_init).into(),
        );

        let stmt = self.stmt(stmt_id).clone();
        let crate::ir::StmtKind::Call { pos_args, kw_args, .. } = stmt.kind else { return };
        let belongs_to = stmt.belongs_to;

        let init_var = self.fresh_var();
        let init_ptr = self.var_ptr(self.variable_of(belongs_to, init_var), ctx);
        self.put_flow_edge(crate::pointer::AttrPtr::new(instance_obj, resolved_init).into(), Pointer::Var(init_ptr));

        let void_target = self.fresh_var();
        let synthetic_id = self.fresh_stmt_id();
        let synthetic = crate::ir::Stmt::new(
            synthetic_id,
            belongs_to,
            crate::ir::StmtKind::Call { target: void_target, callee: init_var, pos_args, kw_args },
        );
        self.synthetic_stmts.insert(synthetic_id, synthetic);
        self.enqueue(Event::BindStmt(synthetic_id, ctx.clone()));
    }

    /// `NewStaticMethod` processor (spec §4.9): only meaningful inside a
    /// class block.
    pub(super) fn process_new_static_method(&mut self, stmt_id: StmtId, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        if self.program.block(stmt.belongs_to).as_class().is_none() {
            return;
        }
        let crate::ir::StmtKind::NewStaticMethod { target, .. } = stmt.kind else { return };
        let target_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, target), ctx);
        let mut created = Vec::new();
        for &func in delta {
            if self.objects.get(func).is_function() {
                created.push(self.objects.create(ObjectData::StaticMethod { func }));
            }
        }
        self.add_points_to(Pointer::Var(target_ptr), created);
    }

    /// `NewClassMethod` processor (spec §4.10): cross-products every newly
    /// arrived function against every class object currently bound to the
    /// class block's own `this_class_variable`. No function-kind guard on
    /// `func` — matches the reference algorithm's literal wording.
    pub(super) fn process_new_class_method(&mut self, stmt_id: StmtId, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let Some(class_block) = self.program.block(stmt.belongs_to).as_class().cloned() else {
            return;
        };
        let crate::ir::StmtKind::NewClassMethod { target, .. } = stmt.kind else { return };
        let target_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, target), ctx);
        let this_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, class_block.this_class_variable), ctx);
        let class_objs: Vec<ObjId> = self.pt.get(&Pointer::Var(this_ptr)).iter().copied().filter(|&o| self.objects.get(o).is_class()).collect();

        let mut created = Vec::new();
        for &func in delta {
            for &class_obj in &class_objs {
                created.push(self.objects.create(ObjectData::ClassMethod { class_obj, func }));
            }
        }
        self.add_points_to(Pointer::Var(target_ptr), created);
    }

    /// `NewSuper` type-side processor (spec §4.11).
    pub(super) fn process_new_super_type(&mut self, stmt_id: StmtId, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let crate::ir::StmtKind::NewSuper { target, bound, .. } = stmt.kind else { return };
        let Some(bound_var) = bound else { return };
        let target_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, target), ctx);
        let bound_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, bound_var), ctx);
        let bound_objs: Vec<ObjId> = self.pt.get(&Pointer::Var(bound_ptr)).iter().copied().filter(|&o| self.is_class_or_instance(o)).collect();

        let mut created = Vec::new();
        for &ty in delta {
            if !self.objects.get(ty).is_class() {
                continue;
            }
            for &bound in &bound_objs {
                created.push(self.objects.create(ObjectData::Super { ty, bound }));
            }
        }
        self.add_points_to(Pointer::Var(target_ptr), created);
    }

    /// `NewSuper` bound-side processor (spec §4.11), symmetric to
    /// [`Self::process_new_super_type`].
    pub(super) fn process_new_super_bound(&mut self, stmt_id: StmtId, ctx: &C, delta: &[ObjId]) {
        let stmt = self.stmt(stmt_id).clone();
        let crate::ir::StmtKind::NewSuper { target, ty, .. } = stmt.kind else { return };
        let Some(ty_var) = ty else { return };
        let target_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, target), ctx);
        let ty_ptr = self.var_ptr(self.variable_of(stmt.belongs_to, ty_var), ctx);
        let ty_objs: Vec<ObjId> = self.pt.get(&Pointer::Var(ty_ptr)).iter().copied().filter(|&o| self.objects.get(o).is_class()).collect();

        let mut created = Vec::new();
        for &bound in delta {
            if !self.is_class_or_instance(bound) {
                continue;
            }
            for &ty in &ty_objs {
                created.push(self.objects.create(ObjectData::Super { ty, bound }));
            }
        }
        self.add_points_to(Pointer::Var(target_ptr), created);
    }

    fn is_class_or_instance(&self, obj: ObjId) -> bool {
        matches!(self.objects.get(obj), ObjectData::Class { .. } | ObjectData::Instance { .. })
    }
}
