//! Code blocks (spec §3.1): module, class, and function flavors.

use indexmap::IndexMap;

use crate::{
    intern::NameId,
    ir::{stmt::Stmt, variable::VarId},
};

/// Index of a code block in a [`crate::ir::Program`]'s block arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct BlockId(pub u32);

/// A module block: `scopeLevel = 0`, owns the module's global variable.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModuleBlock {
    pub id: BlockId,
    pub readable_name: NameId,
    pub global_variable: VarId,
    pub exported_globals: Vec<NameId>,
    pub stmts: Vec<Stmt>,
}

/// A class block: `scopeLevel` equals its enclosing function's.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassBlock {
    pub id: BlockId,
    pub readable_name: NameId,
    pub scope_level: u32,
    pub this_class_variable: VarId,
    pub declared_globals: Vec<NameId>,
    /// Attribute names discovered by lexical binding analysis of the class
    /// body — these are the *persistent attributes* of §4.7.
    pub attributes: Vec<NameId>,
    pub stmts: Vec<Stmt>,
}

/// A function block: `scopeLevel` = enclosing function's + 1.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionBlock {
    pub id: BlockId,
    pub readable_name: NameId,
    pub scope_level: u32,
    pub pos_params: Vec<VarId>,
    pub kw_params: IndexMap<NameId, VarId>,
    pub vararg: Option<VarId>,
    pub kwarg: Option<VarId>,
    pub return_var: VarId,
    pub locals: Vec<VarId>,
    pub declared_globals: Vec<NameId>,
    pub stmts: Vec<Stmt>,
}

/// The three code-block flavors from spec §3.1.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum CodeBlock {
    Module(ModuleBlock),
    Class(ClassBlock),
    Function(FunctionBlock),
}

impl CodeBlock {
    #[must_use]
    pub fn id(&self) -> BlockId {
        match self {
            Self::Module(b) => b.id,
            Self::Class(b) => b.id,
            Self::Function(b) => b.id,
        }
    }

    #[must_use]
    pub fn readable_name(&self) -> NameId {
        match self {
            Self::Module(b) => b.readable_name,
            Self::Class(b) => b.readable_name,
            Self::Function(b) => b.readable_name,
        }
    }

    #[must_use]
    pub fn scope_level(&self) -> u32 {
        match self {
            Self::Module(_) => 0,
            Self::Class(b) => b.scope_level,
            Self::Function(b) => b.scope_level,
        }
    }

    #[must_use]
    pub fn stmts(&self) -> &[Stmt] {
        match self {
            Self::Module(b) => &b.stmts,
            Self::Class(b) => &b.stmts,
            Self::Function(b) => &b.stmts,
        }
    }

    #[must_use]
    pub fn as_class(&self) -> Option<&ClassBlock> {
        match self {
            Self::Class(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionBlock> {
        match self {
            Self::Function(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_module(&self) -> Option<&ModuleBlock> {
        match self {
            Self::Module(b) => Some(b),
            _ => None,
        }
    }
}
