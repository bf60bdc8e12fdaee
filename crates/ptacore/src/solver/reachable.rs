//! Reachability expansion (spec §4.1): marking a block reachable enqueues
//! `BIND_STMT` for every one of its statements and, for the statement kinds
//! that need no operand to already be populated, performs their effect
//! immediately.

use crate::{
    context::CtxModel,
    ir::{BlockId, ModuleRef, Stmt, StmtKind, Variable, VariableKind},
    object::ObjectData,
    pointer::Pointer,
    tracer::SolverTracer,
};

use super::{Event, Solver};

impl<C: CtxModel, Tr: SolverTracer<C>> Solver<'_, C, Tr> {
    /// Returns the context an object allocated (or variable referenced)
    /// inside `belongs_to` should be keyed by, given the chain active while
    /// executing it (spec §6.5: `ctx[:var.belongsTo.scopeLevel]`).
    pub(super) fn obj_ctx(&self, belongs_to: BlockId, ctx: &C) -> C {
        ctx.truncated(self.program.block(belongs_to).scope_level())
    }

    /// Marks `(block, ctx)` reachable if it is not already, enqueuing
    /// `BIND_STMT` for every statement and running the handful of
    /// statement kinds that have no binding step.
    pub(super) fn mark_reachable(&mut self, block: BlockId, ctx: C) {
        if !self.reachable.insert((block, ctx.clone())) {
            return;
        }
        let stmts = self.program.block(block).stmts().to_vec();
        for stmt in &stmts {
            self.tracer.on_reachable(stmt.id);
            match &stmt.kind {
                StmtKind::Assign { .. }
                | StmtKind::NewModule { .. }
                | StmtKind::NewFunction { .. }
                | StmtKind::NewClass { .. }
                | StmtKind::NewBuiltin { .. } => self.run_immediate_effect(stmt, &ctx),
                _ => {}
            }
            self.enqueue(Event::BindStmt(stmt.id, ctx.clone()));
        }
    }

    fn run_immediate_effect(&mut self, stmt: &Stmt, ctx: &C) {
        let belongs_to = stmt.belongs_to;
        match &stmt.kind {
            StmtKind::Assign { target, source } => {
                let target = self.var_ptr(Variable::new(belongs_to, *target, crate::intern::NameId::default(), VariableKind::Temporary), ctx);
                let source = self.var_ptr(Variable::new(belongs_to, *source, crate::intern::NameId::default(), VariableKind::Temporary), ctx);
                self.put_flow_edge(Pointer::Var(source), Pointer::Var(target));
            }
            StmtKind::NewModule { target, module } => {
                let obj = match module {
                    ModuleRef::Resolved(block) => self.objects.create(ObjectData::Module { block: *block }),
                    ModuleRef::Unresolved(name) => {
                        self.objects.create(ObjectData::Fake { prefix: None, witness: None, root: Some(*name) })
                    }
                };
                self.publish_target(belongs_to, *target, ctx, obj);
            }
            StmtKind::NewFunction { target, function_block } => {
                let site_ctx = self.obj_ctx(belongs_to, ctx);
                let obj = self.objects.create(ObjectData::Function { site: stmt.id, ctx: site_ctx, function_block: *function_block });
                self.publish_target(belongs_to, *target, ctx, obj);
            }
            StmtKind::NewClass { target, class_block, bases } => {
                let site_ctx = self.obj_ctx(belongs_to, ctx);
                let obj = self.objects.create(ObjectData::Class { site: stmt.id, ctx: site_ctx, class_block: *class_block });
                self.publish_target(belongs_to, *target, ctx, obj);

                let this_class_var = self.program.block(*class_block).as_class().map(|c| c.this_class_variable);
                if let Some(local) = this_class_var {
                    let this_ptr = self.var_ptr(Variable::new(*class_block, local, crate::intern::NameId::default(), VariableKind::Named), ctx);
                    self.add_points_to(Pointer::Var(this_ptr), vec![obj]);
                }
                self.mark_reachable(*class_block, ctx.clone());
                let caller_name = self.program.block(belongs_to).readable_name();
                let callee_name = self.program.block(*class_block).readable_name();
                self.call_graph.add_edge(stmt.id, caller_name, *class_block, callee_name);
                self.tracer.on_call_edge(stmt.id, callee_name);

                self.hierarchy.add_class(obj, &vec![Vec::new(); bases.len()]);
                self.tracer.on_mro_added(obj);
                if let Some(class) = self.program.block(*class_block).as_class() {
                    self.persistent_attrs.declare(obj, class.attributes.clone());
                }
            }
            StmtKind::NewBuiltin { target, payload } => {
                let site_ctx = self.obj_ctx(belongs_to, ctx);
                let obj = self.objects.create(ObjectData::Builtin { site: stmt.id, ctx: site_ctx, type_tag: payload.type_tag, value: payload.value });
                self.publish_target(belongs_to, *target, ctx, obj);
            }
            _ => {}
        }
    }

    /// Publishes a single freshly allocated object to `target`.
    fn publish_target(&mut self, belongs_to: BlockId, target: crate::ir::VarId, ctx: &C, obj: crate::object::ObjId) {
        let ptr = self.var_ptr(Variable::new(belongs_to, target, crate::intern::NameId::default(), VariableKind::Temporary), ctx);
        self.add_points_to(Pointer::Var(ptr), vec![obj]);
    }
}
