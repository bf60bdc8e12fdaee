//! S7: `outer(f): return f` called twice, once as `outer(g)` and once as
//! `outer(h)`. The IR has no lexical-capture statement of its own — a
//! parameter flowing straight back out through `return_var` is the closest
//! thing it can express to "a value threaded through by name" — so this
//! scenario is really exercising what distinguishes the two calls from each
//! other: under a context-insensitive run the two calls share one `VarPtr`
//! for `f` and one for the result, so both outcomes collapse to `{g, h}`;
//! under a 1-context-sensitive run each call site gets its own copy of
//! `outer`'s parameter and return variable, so the results stay separated.

mod support;

use ptacore::{
    ContextChain, ContextMode, ObjectData, Pointer, Solver, SolverConfig, VarPtr,
    ir::{BuiltinPayload, FunctionBlock, ModuleBlock, StmtKind, VarId},
};
use support::{Builder, var};

fn build() -> ptacore::ir::Program {
    let mut b = Builder::new();
    let module = b.reserve();
    let outer_block = b.reserve();

    let global = b.name("__main__");
    let str_tag = b.name("str");
    let g_value = b.name("g-value");
    let h_value = b.name("h-value");

    let (param_f, return_f) = (VarId(0), VarId(1));
    let outer_stmts = vec![b.stmt(outer_block, StmtKind::Assign { target: return_f, source: param_f })];
    b.set_function(
        outer_block,
        FunctionBlock {
            id: outer_block,
            readable_name: global,
            scope_level: 1,
            pos_params: vec![param_f],
            kw_params: Default::default(),
            vararg: None,
            kwarg: None,
            return_var: return_f,
            locals: vec![param_f, return_f],
            declared_globals: vec![],
            stmts: outer_stmts,
        },
    );

    let (v_outer, v_g, v_h, v_r1, v_r2) = (1u32, 2u32, 3u32, 4u32, 5u32);
    let module_stmts = vec![
        b.stmt(module, StmtKind::NewFunction { target: VarId(v_outer), function_block: outer_block }),
        b.stmt(module, StmtKind::NewBuiltin { target: VarId(v_g), payload: BuiltinPayload { type_tag: str_tag, value: Some(g_value) } }),
        b.stmt(module, StmtKind::NewBuiltin { target: VarId(v_h), payload: BuiltinPayload { type_tag: str_tag, value: Some(h_value) } }),
        b.stmt(module, StmtKind::Call { target: VarId(v_r1), callee: VarId(v_outer), pos_args: vec![VarId(v_g)], kw_args: Default::default() }),
        b.stmt(module, StmtKind::Call { target: VarId(v_r2), callee: VarId(v_outer), pos_args: vec![VarId(v_h)], kw_args: Default::default() }),
    ];
    b.set_module(module, ModuleBlock { id: module, readable_name: global, global_variable: VarId(0), exported_globals: vec![], stmts: module_stmts });

    b.build(vec![module])
}

fn resolve_names<'a, C: ptacore::CtxModel>(solver: &'a Solver<'a, C>, ptr: &Pointer<C>) -> Vec<&'a str> {
    let mut names: Vec<&str> = solver
        .points_to()
        .get(ptr)
        .iter()
        .map(|&o| match solver.objects().get(o) {
            ObjectData::Builtin { value: Some(v), .. } => solver.interner().resolve(*v),
            other => panic!("expected a Builtin object, got {other:?}"),
        })
        .collect();
    names.sort_unstable();
    names
}

#[test]
fn context_insensitive_run_collapses_both_calls() {
    let program = build();
    let config = SolverConfig { context: ContextMode::Insensitive, work_budget: None, include_prefix: None };
    let mut solver: Solver<'_, ()> = Solver::new(&program, config);
    solver.run().expect("solver run");

    // module is BlockId(0), v_r1 = local 4, v_r2 = local 5.
    let r1 = Pointer::Var(VarPtr::new(var(ptacore::ir::BlockId(0), 4), ()));
    let r2 = Pointer::Var(VarPtr::new(var(ptacore::ir::BlockId(0), 5), ()));

    assert_eq!(resolve_names(&solver, &r1), vec!["g-value", "h-value"], "insensitive analysis must merge both call sites' parameters");
    assert_eq!(resolve_names(&solver, &r2), vec!["g-value", "h-value"]);
}

#[test]
fn context_sensitive_run_keeps_calls_separated() {
    let program = build();
    let config = SolverConfig { context: ContextMode::Sensitive { k: 1 }, work_budget: None, include_prefix: None };
    let mut solver: Solver<'_, ContextChain> = Solver::new(&program, config);
    solver.run().expect("solver run");

    // both result variables live at module scope (scope_level 0), which
    // `ContextChain::truncated` collapses to the empty context regardless
    // of which call site produced the flow into them.
    let r1 = Pointer::Var(VarPtr::new(var(ptacore::ir::BlockId(0), 4), ContextChain::empty()));
    let r2 = Pointer::Var(VarPtr::new(var(ptacore::ir::BlockId(0), 5), ContextChain::empty()));

    assert_eq!(resolve_names(&solver, &r1), vec!["g-value"], "1-context-sensitive analysis must keep each call site's argument distinct");
    assert_eq!(resolve_names(&solver, &r2), vec!["h-value"]);
}
