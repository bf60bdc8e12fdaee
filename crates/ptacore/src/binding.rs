//! Binding index (spec §3.4, §4.5, L5a).
//!
//! For each statement kind that needs to react to points-to growth on one of
//! its operands — `NewClass`, `Call`, `DelAttr`, `NewStaticMethod`,
//! `NewClassMethod`, `NewSuper` — this is the multimap from a `VarPtr` to
//! the statement-info tuples that must be re-evaluated when that pointer's
//! set grows. Pure bookkeeping: no dispatch logic lives here, that is
//! `crate::solver`'s job.

use ahash::AHashMap;

use crate::{context::CtxModel, ir::StmtId, pointer::VarPtr};

/// Which statement kind a binding was registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    NewClass,
    Call,
    DelAttr,
    NewStaticMethod,
    NewClassMethod,
    NewSuper,
}

/// The discriminator carried alongside a bound statement (spec §3.4:
/// "statement + optional discriminator such as a base-position index or a
/// `type`/`bound` tag").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtInfo {
    NewClassBase { stmt: StmtId, base_index: u32 },
    Call { stmt: StmtId },
    DelAttr { stmt: StmtId },
    NewStaticMethod { stmt: StmtId },
    NewClassMethod { stmt: StmtId },
    NewSuperType { stmt: StmtId },
    NewSuperBound { stmt: StmtId },
}

#[derive(Debug)]
pub struct BindingIndex<C: CtxModel> {
    map: AHashMap<(BindingKind, VarPtr<C>), Vec<StmtInfo>>,
}

impl<C: CtxModel> Default for BindingIndex<C> {
    fn default() -> Self {
        Self { map: AHashMap::new() }
    }
}

impl<C: CtxModel> BindingIndex<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, kind: BindingKind, ptr: VarPtr<C>, info: StmtInfo) {
        self.map.entry((kind, ptr)).or_default().push(info);
    }

    #[must_use]
    pub fn get(&self, kind: BindingKind, ptr: &VarPtr<C>) -> &[StmtInfo] {
        self.map.get(&(kind, ptr.clone())).map_or(&[], Vec::as_slice)
    }

    /// All kinds currently bound at `ptr`, for the solver's `ADD_POINTS_TO`
    /// dispatch (spec §4.1: "for each statement kind k in B ... invoke the
    /// corresponding processor").
    pub fn kinds_at<'a>(&'a self, ptr: &'a VarPtr<C>) -> impl Iterator<Item = BindingKind> + 'a {
        [
            BindingKind::NewClass,
            BindingKind::Call,
            BindingKind::DelAttr,
            BindingKind::NewStaticMethod,
            BindingKind::NewClassMethod,
            BindingKind::NewSuper,
        ]
        .into_iter()
        .filter(move |k| self.map.contains_key(&(*k, ptr.clone())))
    }
}
