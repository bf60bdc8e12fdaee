//! String interning for variable, attribute, and code-block names.
//!
//! The solver compares names constantly (attribute lookups, readable-name
//! folding for the call graph, binding-index keys) so we intern every name
//! the frontend hands us once and pass around a cheap [`NameId`] afterwards.
//!
//! Unlike a general-purpose interner, this one also recognizes the
//! `$r_`-prefixed *resolved-attribute* namespace from spec §3.3: resolving
//! `a` on a class materializes an answer at the synthetic name `$r_a`. We
//! intern that derived name lazily the first time it is requested and cache
//! the mapping so repeated resolutions do not re-allocate.

use std::fmt;

use ahash::AHashMap;

/// Index into the name interner's storage.
///
/// `u32` keeps pointer/object keys small; analyses with more than four
/// billion distinct names do not exist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct NameId(u32);

impl NameId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameId({})", self.0)
    }
}

/// Marker prefix for the resolved-attribute namespace (spec §3.3, §4.7).
pub const RESOLVED_ATTR_PREFIX: &str = "$r_";

/// A bidirectional string interner.
///
/// Populated during IR ingestion, then treated as append-only read-through
/// storage for the lifetime of one analysis run — mirrors the teacher's
/// interner, which is filled during parsing and only read during execution.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: AHashMap<Box<str>, NameId>,
    /// Cache from a plain attribute's `NameId` to its `$r_`-prefixed `NameId`.
    resolved_cache: AHashMap<NameId, NameId>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning its stable [`NameId`].
    pub fn intern(&mut self, s: &str) -> NameId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let id = NameId(u32::try_from(self.strings.len()).expect("name interner overflow"));
        self.strings.push(s.into());
        self.lookup.insert(s.into(), id);
        id
    }

    /// Resolves a previously interned [`NameId`] back to its string.
    #[must_use]
    pub fn resolve(&self, id: NameId) -> &str {
        &self.strings[id.index()]
    }

    /// Returns whether `id` names an attribute in the resolved namespace
    /// (i.e. its text starts with [`RESOLVED_ATTR_PREFIX`]).
    #[must_use]
    pub fn is_resolved_attr(&self, id: NameId) -> bool {
        self.resolve(id).starts_with(RESOLVED_ATTR_PREFIX)
    }

    /// Returns the `$r_`-prefixed [`NameId`] for a plain attribute name,
    /// interning it on first use.
    pub fn resolved_attr_name(&mut self, attr: NameId) -> NameId {
        if let Some(&cached) = self.resolved_cache.get(&attr) {
            return cached;
        }
        let resolved_str = format!("{RESOLVED_ATTR_PREFIX}{}", self.resolve(attr));
        let resolved = self.intern(&resolved_str);
        self.resolved_cache.insert(attr, resolved);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "foo");
    }

    #[test]
    fn resolved_attr_name_round_trips() {
        let mut interner = Interner::new();
        let attr = interner.intern("f");
        let resolved = interner.resolved_attr_name(attr);
        assert_eq!(interner.resolve(resolved), "$r_f");
        assert!(interner.is_resolved_attr(resolved));
        assert!(!interner.is_resolved_attr(attr));
        // second call hits the cache and must return the same id
        assert_eq!(interner.resolved_attr_name(attr), resolved);
    }
}
