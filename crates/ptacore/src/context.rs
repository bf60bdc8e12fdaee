//! Context model for the k-limited context-sensitive solver variant (spec §6.5, §9).
//!
//! "The context-insensitive and context-sensitive solvers differ only in
//! ... VarPtr/Object keying ... Structure the implementation so that the
//! context type is a parameter ... not a duplicated file." Every generic
//! piece of the solver (`Pointer<C>`, `Object<C>`, `Solver<C, Tr>`) is
//! parameterized over a [`CtxModel`]; context-insensitive analysis
//! instantiates it with the empty singleton `()`, context-sensitive
//! analysis instantiates it with [`ContextChain`].

use std::fmt;

use smallvec::SmallVec;

use crate::ir::StmtId;

/// Default k for k-limited call-site contexts (spec §6.5: "K = 1 by default").
pub const DEFAULT_K: u8 = 1;

/// A context element: the identity of a `Call` IR statement (spec §6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContextElement(pub StmtId);

/// A k-limited tuple of context elements, newest at the end. When full, the
/// oldest element is dropped on push (spec §6.5: "A context is a tuple of
/// at most K context elements").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct CallSiteContext(SmallVec<[ContextElement; 2]>);

impl CallSiteContext {
    #[must_use]
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    /// Returns the context obtained by appending `elem`, keeping at most `k`
    /// elements (drops the oldest when full).
    #[must_use]
    pub fn pushed(&self, k: u8, elem: ContextElement) -> Self {
        let mut v = self.0.clone();
        v.push(elem);
        let k = k as usize;
        if v.len() > k {
            let drop = v.len() - k;
            v.drain(0..drop);
        }
        Self(v)
    }

    #[must_use]
    pub fn elements(&self) -> &[ContextElement] {
        &self.0
    }
}

/// A context chain: one [`CallSiteContext`] per enclosing scope level of the
/// current code block (spec §6.5: "chain length equals
/// `codeBlock.scopeLevel`"). Index 0 is the outermost function's context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct ContextChain(Vec<CallSiteContext>);

impl ContextChain {
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The chain's own most specific (innermost) context, if any.
    #[must_use]
    pub fn innermost(&self) -> Option<&CallSiteContext> {
        self.0.last()
    }

    /// Appends a new innermost context (entering one more level of scope).
    #[must_use]
    pub fn extended(&self, next: CallSiteContext) -> Self {
        let mut v = self.0.clone();
        v.push(next);
        Self(v)
    }

    /// Returns `ctx[:scope_level]` — the §6.5 rule for keying a `VarPtr` or
    /// object allocated in a block at the given scope level.
    #[must_use]
    pub fn truncated(&self, scope_level: u32) -> Self {
        let n = (scope_level as usize).min(self.0.len());
        Self(self.0[..n].to_vec())
    }
}

/// A model for how pointers and objects are keyed by context.
///
/// `()` is the empty singleton used by the context-insensitive solver: all
/// truncations collapse to the same unit value, so `VarPtr<()>` and
/// `Object<()>` carry no context information at all and the solver behaves
/// exactly as an insensitive analysis.
pub trait CtxModel: Clone + Eq + std::hash::Hash + fmt::Debug + Default + Send + Sync + 'static {
    /// Restricts `self` to the prefix appropriate for a definition at
    /// `scope_level` (spec §6.5).
    #[must_use]
    fn truncated(&self, scope_level: u32) -> Self;

    /// The context an entry module executes under.
    #[must_use]
    fn root() -> Self;

    /// The context a callee's own body executes under, given the caller's
    /// context (`self`) and, when the callee is bound to a receiver, that
    /// receiver's allocation context and site (spec §6.5 mixed selector).
    /// `()` has nothing to compute and always returns itself.
    #[must_use]
    fn enter_call(&self, k: u8, call_site: StmtId, receiver: Option<(&Self, StmtId)>) -> Self;

    /// Whether this model distinguishes call histories at all. Gates the
    /// spec §9 OQ1 policy (real `Instance` allocation vs. reusing the class
    /// object) and the Φ transform's extra `InstanceMethod` substitution
    /// (§4.7.2), both of which the spec says apply only in the
    /// context-sensitive solver.
    #[must_use]
    fn is_context_sensitive() -> bool;
}

impl CtxModel for () {
    fn truncated(&self, _scope_level: u32) -> Self {}

    fn root() -> Self {}

    fn enter_call(&self, _k: u8, _call_site: StmtId, _receiver: Option<(&Self, StmtId)>) -> Self {}

    fn is_context_sensitive() -> bool {
        false
    }
}

impl CtxModel for ContextChain {
    fn truncated(&self, scope_level: u32) -> Self {
        ContextChain::truncated(self, scope_level)
    }

    fn root() -> Self {
        ContextChain::empty()
    }

    fn enter_call(&self, k: u8, call_site: StmtId, receiver: Option<(&Self, StmtId)>) -> Self {
        let input = match receiver {
            Some((receiver_chain, receiver_site)) => SelectorInput::BoundReceiver { receiver_chain, receiver_site },
            None => SelectorInput::CallSite,
        };
        let chosen = select_mixed_context(k, self, call_site, &input);
        self.extended(chosen)
    }

    fn is_context_sensitive() -> bool {
        true
    }
}

/// Inputs to the mixed context selector (spec §6.5, §9): at a call site
/// where the callee resolves through a bound `self`/class object, select
/// object context; otherwise select call-site context.
pub enum SelectorInput<'a> {
    /// The callee is a plain function or static method: no receiver.
    CallSite,
    /// The callee is bound to a receiver (instance or class) allocated at
    /// `receiver_chain`/`receiver_site` — select object context from it.
    BoundReceiver { receiver_chain: &'a ContextChain, receiver_site: StmtId },
}

/// Selects the context a callee's own body should execute under, given the
/// caller's context chain, the call-site statement, and whether the callee
/// is bound to a receiver (spec §6.5 "mixed selector").
#[must_use]
pub fn select_mixed_context(k: u8, caller_chain: &ContextChain, call_site: StmtId, input: &SelectorInput) -> CallSiteContext {
    match input {
        SelectorInput::CallSite => {
            let base = caller_chain.innermost().cloned().unwrap_or_else(CallSiteContext::empty);
            base.pushed(k, ContextElement(call_site))
        }
        SelectorInput::BoundReceiver { receiver_chain, receiver_site } => {
            let base = receiver_chain.innermost().cloned().unwrap_or_else(CallSiteContext::empty);
            base.pushed(k, ContextElement(*receiver_site))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(n: u32) -> StmtId {
        StmtId(n)
    }

    #[test]
    fn k_limited_push_drops_oldest() {
        let ctx = CallSiteContext::empty().pushed(1, ContextElement(stmt(1)));
        let ctx = ctx.pushed(1, ContextElement(stmt(2)));
        assert_eq!(ctx.elements(), &[ContextElement(stmt(2))]);
    }

    #[test]
    fn truncation_keeps_prefix() {
        let chain = ContextChain::empty()
            .extended(CallSiteContext::empty().pushed(1, ContextElement(stmt(1))))
            .extended(CallSiteContext::empty().pushed(1, ContextElement(stmt(2))));
        assert_eq!(chain.len(), 2);
        let truncated = chain.truncated(1);
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated.innermost(), chain.truncated(2).0.first());
    }

    #[test]
    fn mixed_selector_prefers_call_site_without_receiver() {
        let chain = ContextChain::empty();
        let ctx = select_mixed_context(1, &chain, stmt(7), &SelectorInput::CallSite);
        assert_eq!(ctx.elements(), &[ContextElement(stmt(7))]);
    }

    #[test]
    fn mixed_selector_uses_receiver_site_when_bound() {
        let receiver_chain = ContextChain::empty().extended(CallSiteContext::empty().pushed(1, ContextElement(stmt(3))));
        let caller_chain = ContextChain::empty();
        let ctx = select_mixed_context(
            1,
            &caller_chain,
            stmt(7),
            &SelectorInput::BoundReceiver { receiver_chain: &receiver_chain, receiver_site: stmt(9) },
        );
        // object context is selected from the receiver's allocation site, not the call site
        assert_eq!(ctx.elements(), &[ContextElement(stmt(9))]);
    }
}
