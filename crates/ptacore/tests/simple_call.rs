//! S1: a module defines a function and calls it; the call's target variable
//! ends up pointing at whatever builtin value the callee's body returns.

mod support;

use ptacore::{
    ContextMode, ObjectData, Pointer, Solver, SolverConfig, VarPtr,
    ir::{BuiltinPayload, FunctionBlock, ModuleBlock, StmtKind, VarId},
};
use support::{Builder, var};

#[test]
fn call_result_points_to_callees_return_value() {
    let mut b = Builder::new();
    let module = b.reserve();
    let greet = b.reserve();

    let global = b.name("__main__");
    let value = b.name("hello");
    let str_tag = b.name("str");

    let v_greet = 1u32;
    let v_result = 2u32;
    let stmts = vec![
        b.stmt(module, StmtKind::NewFunction { target: VarId(v_greet), function_block: greet }),
        b.stmt(
            module,
            StmtKind::Call { target: VarId(v_result), callee: VarId(v_greet), pos_args: vec![], kw_args: Default::default() },
        ),
    ];
    b.set_module(
        module,
        ModuleBlock { id: module, readable_name: global, global_variable: VarId(0), exported_globals: vec![], stmts },
    );

    let return_var = VarId(0);
    let greet_name = b.name("greet");
    let greet_stmts = vec![b.stmt(greet, StmtKind::NewBuiltin { target: return_var, payload: BuiltinPayload { type_tag: str_tag, value: Some(value) } })];
    b.set_function(
        greet,
        FunctionBlock {
            id: greet,
            readable_name: greet_name,
            scope_level: 1,
            pos_params: vec![],
            kw_params: Default::default(),
            vararg: None,
            kwarg: None,
            return_var,
            locals: vec![return_var],
            declared_globals: vec![],
            stmts: greet_stmts,
        },
    );

    let program = b.build(vec![module]);

    let config = SolverConfig { context: ContextMode::Insensitive, work_budget: None, include_prefix: None };
    let mut solver: Solver<'_, ()> = Solver::new(&program, config);
    let outcome = solver.run().expect("solver run");
    assert_eq!(outcome, ptacore::RunOutcome::Converged);

    let result_ptr = Pointer::Var(VarPtr::new(var(module, v_result), ()));
    let result_set = solver.points_to().get(&result_ptr);
    assert_eq!(result_set.len(), 1, "expected exactly one object in the call result, got {result_set:?}");

    let obj = *result_set.iter().next().unwrap();
    match solver.objects().get(obj) {
        ObjectData::Builtin { type_tag, value: Some(v), .. } => {
            assert_eq!(solver.interner().resolve(*type_tag), "str");
            assert_eq!(solver.interner().resolve(*v), "hello");
        }
        other => panic!("expected a Builtin object, got {other:?}"),
    }
}
