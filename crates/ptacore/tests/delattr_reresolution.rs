//! S4: deleting `Derived`'s own `greet` override re-resolves the attribute
//! past `Derived` in the MRO, wiring a fresh flow edge from `Base.greet`
//! into the same shared resolved-attribute slot. Points-to sets never
//! shrink (PT is monotone) and the pointer-flow graph never removes edges,
//! so every read already flow-connected to that slot ends up seeing *both*
//! the original and the fallback value once the solver reaches a fixed
//! point — this is the correct conservative answer, not an artifact of
//! statement order.

mod support;

use ptacore::{
    ContextMode, ObjectData, Pointer, Solver, SolverConfig, VarPtr,
    ir::{BuiltinPayload, ClassBlock, FunctionBlock, ModuleBlock, StmtKind, VarId},
};
use support::{Builder, var};

#[test]
fn del_attr_on_override_surfaces_both_values() {
    let mut b = Builder::new();
    let module = b.reserve();
    let base_block = b.reserve();
    let greet_base = b.reserve();
    let derived_block = b.reserve();
    let greet_derived = b.reserve();

    let global = b.name("__main__");
    let base_name = b.name("Base");
    let derived_name = b.name("Derived");
    let greet_attr = b.name("greet");
    let str_tag = b.name("str");
    let base_value = b.name("base-value");
    let derived_value = b.name("derived-value");

    let v_greet_b_fn = 1u32;
    let base_stmts = vec![
        b.stmt(base_block, StmtKind::NewFunction { target: VarId(v_greet_b_fn), function_block: greet_base }),
        b.stmt(base_block, StmtKind::SetAttr { target: VarId(0), attr: greet_attr, source: VarId(v_greet_b_fn) }),
    ];
    b.set_class(
        base_block,
        ClassBlock { id: base_block, readable_name: base_name, scope_level: 0, this_class_variable: VarId(0), declared_globals: vec![], attributes: vec![greet_attr], stmts: base_stmts },
    );
    let base_return = VarId(0);
    let greet_base_stmts = vec![b.stmt(greet_base, StmtKind::NewBuiltin { target: base_return, payload: BuiltinPayload { type_tag: str_tag, value: Some(base_value) } })];
    b.set_function(
        greet_base,
        FunctionBlock {
            id: greet_base,
            readable_name: greet_attr,
            scope_level: 1,
            pos_params: vec![VarId(1)],
            kw_params: Default::default(),
            vararg: None,
            kwarg: None,
            return_var: base_return,
            locals: vec![VarId(1), base_return],
            declared_globals: vec![],
            stmts: greet_base_stmts,
        },
    );

    let v_greet_d_fn = 1u32;
    let derived_stmts = vec![
        b.stmt(derived_block, StmtKind::NewFunction { target: VarId(v_greet_d_fn), function_block: greet_derived }),
        b.stmt(derived_block, StmtKind::SetAttr { target: VarId(0), attr: greet_attr, source: VarId(v_greet_d_fn) }),
    ];
    b.set_class(
        derived_block,
        ClassBlock { id: derived_block, readable_name: derived_name, scope_level: 0, this_class_variable: VarId(0), declared_globals: vec![], attributes: vec![greet_attr], stmts: derived_stmts },
    );
    let derived_return = VarId(0);
    let greet_derived_stmts =
        vec![b.stmt(greet_derived, StmtKind::NewBuiltin { target: derived_return, payload: BuiltinPayload { type_tag: str_tag, value: Some(derived_value) } })];
    b.set_function(
        greet_derived,
        FunctionBlock {
            id: greet_derived,
            readable_name: greet_attr,
            scope_level: 1,
            pos_params: vec![VarId(1)],
            kw_params: Default::default(),
            vararg: None,
            kwarg: None,
            return_var: derived_return,
            locals: vec![VarId(1), derived_return],
            declared_globals: vec![],
            stmts: greet_derived_stmts,
        },
    );

    let (v_base, v_derived, v_inst, v_method, v_result) = (1u32, 2u32, 3u32, 4u32, 5u32);
    let module_stmts = vec![
        b.stmt(module, StmtKind::NewClass { target: VarId(v_base), class_block: base_block, bases: vec![] }),
        b.stmt(module, StmtKind::NewClass { target: VarId(v_derived), class_block: derived_block, bases: vec![VarId(v_base)] }),
        b.stmt(module, StmtKind::Call { target: VarId(v_inst), callee: VarId(v_derived), pos_args: vec![], kw_args: Default::default() }),
        b.stmt(module, StmtKind::GetAttr { target: VarId(v_method), source: VarId(v_inst), attr: greet_attr }),
        b.stmt(module, StmtKind::Call { target: VarId(v_result), callee: VarId(v_method), pos_args: vec![], kw_args: Default::default() }),
        b.stmt(module, StmtKind::DelAttr { var: VarId(v_inst), attr: greet_attr }),
    ];
    b.set_module(module, ModuleBlock { id: module, readable_name: global, global_variable: VarId(0), exported_globals: vec![], stmts: module_stmts });

    let program = b.build(vec![module]);
    let config = SolverConfig { context: ContextMode::Insensitive, work_budget: None, include_prefix: None };
    let mut solver: Solver<'_, ()> = Solver::new(&program, config);
    solver.run().expect("solver run");

    let result_ptr = Pointer::Var(VarPtr::new(var(module, v_result), ()));
    let result_set = solver.points_to().get(&result_ptr);

    let mut values: Vec<&str> = result_set
        .iter()
        .map(|&o| match solver.objects().get(o) {
            ObjectData::Builtin { value: Some(v), .. } => solver.interner().resolve(*v),
            other => panic!("expected a Builtin object, got {other:?}"),
        })
        .collect();
    values.sort_unstable();

    assert_eq!(values, vec!["base-value", "derived-value"], "DelAttr must add the fallback without retracting the original");
}
