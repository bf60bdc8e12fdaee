//! Variable identity (spec §3.1).
//!
//! "A variable is identified by a (name, owning block) pair; equality and
//! hashing are by that identity. Variables are pure labels: they carry no
//! values." We implement that identity as `(block, local)` rather than
//! `(block, name)` directly: the frontend assigns each variable a unique
//! local slot when it registers it, which is strictly finer than name
//! (two distinct temporaries in the same block may share a display name)
//! and trivially recovers name-based identity since the frontend never
//! reuses a slot for two different names.

use crate::{intern::NameId, ir::block::BlockId};

/// Local index of a variable within its owning block, assigned by the
/// frontend in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct VarId(pub u32);

/// Whether a variable came from source (`Named`) or was synthesized by the
/// frontend or the solver itself (`Temporary`) — e.g. the `$init_<id>`
/// variable the call processor synthesizes for constructor calls (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VariableKind {
    Named,
    Temporary,
}

/// A variable: a (name, owning block) label, carrying no runtime value.
///
/// Identity is `(block, local)` only: `name` and `kind` are display/debug
/// payload, not part of equality or hashing, so two lookups for the same
/// local slot always collapse onto the same `VarPtr`/`AttrPtr` key even if
/// callers reconstruct a `Variable` with a placeholder `name`/`kind` (the
/// solver does this whenever it only has a `VarId` handy and the
/// statement's actual variable metadata is elsewhere).
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Variable {
    pub block: BlockId,
    pub local: VarId,
    pub name: NameId,
    pub kind: VariableKind,
}

impl Variable {
    #[must_use]
    pub fn new(block: BlockId, local: VarId, name: NameId, kind: VariableKind) -> Self {
        Self { block, local, name, kind }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.local == other.local
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.block.hash(state);
        self.local.hash(state);
    }
}
