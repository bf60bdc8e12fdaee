//! Immutable intermediate representation produced by the frontend (spec §3.1, §6.1).
//!
//! This module is a pure data model: no behavior lives here beyond
//! structural validation. The solver (`crate::solver`) is the only consumer
//! that interprets these statements.

pub mod block;
pub mod program;
pub mod stmt;
pub mod variable;

pub use block::{BlockId, ClassBlock, CodeBlock, FunctionBlock, ModuleBlock};
pub use program::Program;
pub use stmt::{BuiltinPayload, ModuleRef, Stmt, StmtId, StmtKind};
pub use variable::{VarId, Variable, VariableKind};
