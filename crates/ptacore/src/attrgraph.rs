//! Attribute graph (spec §3.4, L5b).
//!
//! Reverse index over `GetAttr`/`SetAttr` statements, keyed by the pointer
//! whose points-to growth should trigger re-evaluation:
//!
//! * for `GetAttr target = source.attr`, indexed under `source` as
//!   `(target, attr)` — when an object reaches `source`, the resolver tries
//!   `attr` on it and flows the result into `target`.
//! * for `SetAttr target.attr = source`, indexed under `target` as
//!   `(source, attr)` — when an object reaches `target`, `source` flows into
//!   that object's `attr` slot.
//!
//! Same shape as [`crate::binding::BindingIndex`], split into its own type
//! because the two `GetAttr`/`SetAttr` maps are walked together constantly
//! (every object landing on a variable needs both checked) while the
//! statement-kind bindings are walked one kind at a time.

use ahash::AHashMap;

use crate::{context::CtxModel, intern::NameId, pointer::VarPtr};

#[derive(Debug)]
pub struct AttributeGraph<C: CtxModel> {
    get_attr: AHashMap<VarPtr<C>, Vec<(VarPtr<C>, NameId)>>,
    set_attr: AHashMap<VarPtr<C>, Vec<(VarPtr<C>, NameId)>>,
}

impl<C: CtxModel> Default for AttributeGraph<C> {
    fn default() -> Self {
        Self { get_attr: AHashMap::new(), set_attr: AHashMap::new() }
    }
}

impl<C: CtxModel> AttributeGraph<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target = source.attr`.
    pub fn add_get_attr(&mut self, source: VarPtr<C>, target: VarPtr<C>, attr: NameId) {
        self.get_attr.entry(source).or_default().push((target, attr));
    }

    /// Registers `target.attr = source`.
    pub fn add_set_attr(&mut self, target: VarPtr<C>, source: VarPtr<C>, attr: NameId) {
        self.set_attr.entry(target).or_default().push((source, attr));
    }

    /// `GetAttr`s whose source is `ptr`: pairs of `(target, attr)`.
    #[must_use]
    pub fn get_attrs_from(&self, ptr: &VarPtr<C>) -> &[(VarPtr<C>, NameId)] {
        self.get_attr.get(ptr).map_or(&[], Vec::as_slice)
    }

    /// `SetAttr`s whose target is `ptr`: pairs of `(source, attr)`.
    #[must_use]
    pub fn set_attrs_onto(&self, ptr: &VarPtr<C>) -> &[(VarPtr<C>, NameId)] {
        self.set_attr.get(ptr).map_or(&[], Vec::as_slice)
    }
}
