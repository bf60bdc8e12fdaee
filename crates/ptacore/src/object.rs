//! Abstract object universe (spec §3.2, L1) and its arena.
//!
//! Every abstract object is allocation-site-keyed (invariant O-1/O-2): two
//! requests to allocate "the object for this `NewClass` site under this
//! context" must return the *same* [`ObjId`], never two. We intern objects
//! into an arena the same way the teacher interns heap values behind a
//! `HeapId` (`heap.rs`) and the reference implementation dedupes through its
//! `ObjectPool.create(...)` — both exist so that `PT`/`PF`/`CH` can key off
//! a small `Copy` handle instead of a recursive, allocation-heavy struct.

use std::hash::Hash;

use ahash::AHashMap;

use crate::{
    context::CtxModel,
    intern::NameId,
    ir::{BlockId, StmtId, Variable},
};

/// Interned handle to an abstract object. Cheap to copy, compare, and hash —
/// this is what flows through points-to sets, pointer-flow edges, and the
/// binding index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ObjId(u32);

impl ObjId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A variable pointer's context-qualified identity, used as part of the
/// `Fake` cycle-cut witness (spec §4.7.1) without pulling in the full
/// `Pointer` enum here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CtxVar<C: CtxModel> {
    pub var: Variable,
    pub ctx: C,
}

/// A `GetAttr` witness: `(source, target, attribute)`, used to cut cycles
/// among derived `Fake` objects (spec §4.7.1).
pub type GetAttrWitness<C> = (CtxVar<C>, CtxVar<C>, NameId);

/// Data for each object variant (spec §3.2). Shared structure across both
/// solver modes: the context field is `C`, instantiated to `()` for the
/// context-insensitive solver and [`crate::context::ContextChain`] for the
/// context-sensitive one (spec §9's "context as a parameter").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectData<C: CtxModel> {
    /// Wraps a module block.
    Module { block: BlockId },
    /// Wraps a `NewFunction` site.
    Function { site: StmtId, ctx: C, function_block: BlockId },
    /// Wraps a `NewClass` site.
    Class { site: StmtId, ctx: C, class_block: BlockId },
    /// Wraps a `Call` site and the class object invoked (context-sensitive
    /// mode only — see spec §4.8 OQ1 / DESIGN.md).
    Instance { site: StmtId, ctx: C, class_obj: ObjId },
    /// Wraps a `NewBuiltin` site.
    Builtin { site: StmtId, ctx: C, type_tag: NameId, value: Option<NameId> },
    /// Wraps an underlying function object.
    StaticMethod { func: ObjId },
    /// Wraps a (class object, function object) pair.
    ClassMethod { class_obj: ObjId, func: ObjId },
    /// Wraps a (self instance, function object) pair (context-sensitive only).
    InstanceMethod { self_obj: ObjId, func: ObjId },
    /// Wraps a (type-class object, bound object) pair.
    Super { ty: ObjId, bound: ObjId },
    /// Synthetic stand-in for an attribute access on an unresolved import.
    /// `prefix = None` marks a root fake (straight from an unresolved
    /// `NewModule`); `witness = None` alongside it.
    Fake { prefix: Option<ObjId>, witness: Option<GetAttrWitness<C>>, root: Option<NameId> },
}

impl<C: CtxModel> ObjectData<C> {
    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class { .. })
    }

    #[must_use]
    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake { .. })
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Module { .. } => "Module",
            Self::Function { .. } => "Function",
            Self::Class { .. } => "Class",
            Self::Instance { .. } => "Instance",
            Self::Builtin { .. } => "Builtin",
            Self::StaticMethod { .. } => "StaticMethod",
            Self::ClassMethod { .. } => "ClassMethod",
            Self::InstanceMethod { .. } => "InstanceMethod",
            Self::Super { .. } => "Super",
            Self::Fake { .. } => "Fake",
        }
    }
}

/// Arena interning [`ObjectData`] behind stable [`ObjId`] handles.
///
/// `create` is the only constructor and is idempotent by construction
/// (invariant O-2): calling it twice with equal `ObjectData` returns the
/// same `ObjId`, mirroring `ObjectPool.create` in the reference
/// implementation and the dedup-on-insert discipline of the teacher's
/// `Heap`.
#[derive(Debug)]
pub struct ObjectPool<C: CtxModel> {
    data: Vec<ObjectData<C>>,
    lookup: AHashMap<ObjectData<C>, ObjId>,
}

impl<C: CtxModel> Default for ObjectPool<C> {
    fn default() -> Self {
        Self { data: Vec::new(), lookup: AHashMap::new() }
    }
}

impl<C: CtxModel> ObjectPool<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `data`, returning the existing handle if an equal object was
    /// already allocated, or a fresh one otherwise.
    pub fn create(&mut self, data: ObjectData<C>) -> ObjId {
        if let Some(&id) = self.lookup.get(&data) {
            return id;
        }
        let id = ObjId(u32::try_from(self.data.len()).expect("object arena overflow"));
        self.lookup.insert(data.clone(), id);
        self.data.push(data);
        id
    }

    #[must_use]
    pub fn get(&self, id: ObjId) -> &ObjectData<C> {
        &self.data[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjId, &ObjectData<C>)> {
        self.data.iter().enumerate().map(|(i, d)| (ObjId(u32::try_from(i).unwrap()), d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
