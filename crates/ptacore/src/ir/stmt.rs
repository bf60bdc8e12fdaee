//! IR statements (spec §3.1).
//!
//! Every statement carries a stable id unique across the whole program and a
//! back-pointer to its owning block, so the solver can re-derive "which
//! block does this binding belong to" from a bare `StmtId` without
//! threading a `(block, stmt)` pair through the binding index, the call
//! graph, and every context element (§4.5, §6.5).

use indexmap::IndexMap;

use crate::{
    intern::NameId,
    ir::{block::BlockId, variable::VarId},
};

/// Id of a statement, unique across the whole [`crate::ir::Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct StmtId(pub u32);

/// Either a resolved module block or a textual reference the module resolver
/// (§6.2) could not settle — the frontend hands us this, we never call the
/// resolver ourselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModuleRef {
    Resolved(BlockId),
    Unresolved(NameId),
}

/// `NewBuiltin`'s payload: a type tag plus an optional literal value,
/// both opaque to the solver (spec's non-goal: "precise modeling of the
/// standard library beyond what the IR encodes").
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BuiltinPayload {
    pub type_tag: NameId,
    pub value: Option<NameId>,
}

/// The tagged statement kinds from spec §3.1.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StmtKind {
    Assign { target: VarId, source: VarId },
    GetAttr { target: VarId, source: VarId, attr: NameId },
    SetAttr { target: VarId, attr: NameId, source: VarId },
    DelAttr { var: VarId, attr: NameId },
    NewModule { target: VarId, module: ModuleRef },
    NewFunction { target: VarId, function_block: BlockId },
    NewClass { target: VarId, class_block: BlockId, bases: Vec<VarId> },
    NewBuiltin { target: VarId, payload: BuiltinPayload },
    NewStaticMethod { target: VarId, func: VarId },
    NewClassMethod { target: VarId, func: VarId },
    NewSuper { target: VarId, ty: Option<VarId>, bound: Option<VarId> },
    Call { target: VarId, callee: VarId, pos_args: Vec<VarId>, kw_args: IndexMap<NameId, VarId> },
}

/// A statement: a stable id, its owning block, and its kind.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stmt {
    pub id: StmtId,
    pub belongs_to: BlockId,
    pub kind: StmtKind,
}

impl Stmt {
    #[must_use]
    pub fn new(id: StmtId, belongs_to: BlockId, kind: StmtKind) -> Self {
        Self { id, belongs_to, kind }
    }
}

/// Every [`VarId`] a statement mentions, in no particular order.
///
/// Used by IR validation and by diagnostics that need to know a statement's
/// operand set without a per-kind match at every call site.
pub fn referenced_vars(stmt: &Stmt) -> impl Iterator<Item = VarId> + '_ {
    let mut vars = Vec::new();
    match &stmt.kind {
        StmtKind::Assign { target, source } => vars.extend([*target, *source]),
        StmtKind::GetAttr { target, source, .. } => vars.extend([*target, *source]),
        StmtKind::SetAttr { target, source, .. } => vars.extend([*target, *source]),
        StmtKind::DelAttr { var, .. } => vars.push(*var),
        StmtKind::NewModule { target, .. }
        | StmtKind::NewFunction { target, .. }
        | StmtKind::NewBuiltin { target, .. } => vars.push(*target),
        StmtKind::NewClass { target, bases, .. } => {
            vars.push(*target);
            vars.extend(bases.iter().copied());
        }
        StmtKind::NewStaticMethod { target, func } | StmtKind::NewClassMethod { target, func } => {
            vars.extend([*target, *func]);
        }
        StmtKind::NewSuper { target, ty, bound } => {
            vars.push(*target);
            vars.extend(ty.iter().copied());
            vars.extend(bound.iter().copied());
        }
        StmtKind::Call { target, callee, pos_args, kw_args } => {
            vars.push(*target);
            vars.push(*callee);
            vars.extend(pos_args.iter().copied());
            vars.extend(kw_args.values().copied());
        }
    }
    vars.into_iter()
}
