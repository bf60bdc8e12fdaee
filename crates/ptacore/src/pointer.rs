//! Pointer universe (spec §3.3, L2): `VarPtr` and `AttrPtr`.

use crate::{context::CtxModel, intern::NameId, ir::Variable, object::ObjId};

/// A variable pointer: `(variable, context chain)` (spec §3.3).
///
/// For the context-insensitive solver `C = ()`, so every instance of a
/// given `Variable` collapses onto one `VarPtr` regardless of call history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarPtr<C: CtxModel> {
    pub var: Variable,
    pub ctx: C,
}

impl<C: CtxModel> VarPtr<C> {
    #[must_use]
    pub fn new(var: Variable, ctx: C) -> Self {
        Self { var, ctx }
    }
}

// Manual Copy-free Clone is already derived; VarPtr is small but not Copy
// because `C` (e.g. `ContextChain`) owns a `Vec`.

/// An attribute pointer: `(abstract object, attribute name)` (spec §3.3).
///
/// Attribute namespaces (real vs. `$r_`-resolved) are just different
/// [`NameId`]s from the interner's point of view — callers never need to
/// special-case the marker beyond what `Interner::is_resolved_attr` exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttrPtr {
    pub obj: ObjId,
    pub attr: NameId,
}

impl AttrPtr {
    #[must_use]
    pub fn new(obj: ObjId, attr: NameId) -> Self {
        Self { obj, attr }
    }
}

/// Either pointer variant, used wherever the solver handles both uniformly
/// (the work list, the pointer-flow graph).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pointer<C: CtxModel> {
    Var(VarPtr<C>),
    Attr(AttrPtr),
}

impl<C: CtxModel> From<VarPtr<C>> for Pointer<C> {
    fn from(p: VarPtr<C>) -> Self {
        Self::Var(p)
    }
}

impl<C: CtxModel> From<AttrPtr> for Pointer<C> {
    fn from(p: AttrPtr) -> Self {
        Self::Attr(p)
    }
}

impl<C: CtxModel> Pointer<C> {
    #[must_use]
    pub fn as_var(&self) -> Option<&VarPtr<C>> {
        match self {
            Self::Var(v) => Some(v),
            Self::Attr(_) => None,
        }
    }
}
