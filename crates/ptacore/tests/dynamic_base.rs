//! S5: `cls = random_choice([A, B]); class X(cls)` — an ambiguous base
//! expression yields one MRO per resolved candidate rather than a single
//! merged answer (spec §3.4's `mros_of` returning a set).

mod support;

use ptacore::{
    ContextMode, ObjectData, Solver, SolverConfig,
    ir::{ClassBlock, ModuleBlock, StmtKind, VarId},
};
use support::Builder;

fn empty_class(id: ptacore::ir::BlockId, name: ptacore::intern::NameId) -> ClassBlock {
    ClassBlock { id, readable_name: name, scope_level: 0, this_class_variable: VarId(0), declared_globals: vec![], attributes: vec![], stmts: vec![] }
}

#[test]
fn ambiguous_base_expression_yields_two_mros() {
    let mut b = Builder::new();
    let module = b.reserve();
    let a_block = b.reserve();
    let b_block = b.reserve();
    let x_block = b.reserve();

    let global = b.name("__main__");
    let a_name = b.name("A");
    let b_name = b.name("B");
    let x_name = b.name("X");

    b.set_class(a_block, empty_class(a_block, a_name));
    b.set_class(b_block, empty_class(b_block, b_name));
    b.set_class(x_block, empty_class(x_block, x_name));

    let (v_a, v_b, v_cls, v_x) = (1u32, 2u32, 3u32, 4u32);
    let stmts = vec![
        b.stmt(module, StmtKind::NewClass { target: VarId(v_a), class_block: a_block, bases: vec![] }),
        b.stmt(module, StmtKind::NewClass { target: VarId(v_b), class_block: b_block, bases: vec![] }),
        b.stmt(module, StmtKind::Assign { target: VarId(v_cls), source: VarId(v_a) }),
        b.stmt(module, StmtKind::Assign { target: VarId(v_cls), source: VarId(v_b) }),
        b.stmt(module, StmtKind::NewClass { target: VarId(v_x), class_block: x_block, bases: vec![VarId(v_cls)] }),
    ];
    b.set_module(module, ModuleBlock { id: module, readable_name: global, global_variable: VarId(0), exported_globals: vec![], stmts });

    let program = b.build(vec![module]);
    let config = SolverConfig { context: ContextMode::Insensitive, work_budget: None, include_prefix: None };
    let mut solver: Solver<'_, ()> = Solver::new(&program, config);
    solver.run().expect("solver run");

    let find_class = |block: ptacore::ir::BlockId| {
        solver
            .objects()
            .iter()
            .find_map(|(id, data)| match data {
                ObjectData::Class { class_block, .. } if *class_block == block => Some(id),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no Class object for block {block:?}"))
    };
    let (obj_a, obj_b, obj_x) = (find_class(a_block), find_class(b_block), find_class(x_block));

    let mut mros: Vec<Vec<_>> = solver.hierarchy().mros_of(obj_x).map(<[_]>::to_vec).collect();
    mros.sort();
    assert_eq!(mros.len(), 2, "expected one MRO per ambiguous base candidate, got {mros:?}");
    let mut expected = vec![vec![obj_x, obj_a], vec![obj_x, obj_b]];
    expected.sort();
    assert_eq!(mros, expected);
}
