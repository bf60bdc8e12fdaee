//! Shared fixture builder for the scenario/property integration tests.
//!
//! `Program`'s block arena indexes directly by `BlockId`, so nested blocks
//! (a class's methods, a function's own locals) need their id reserved
//! before the blocks that reference them are built. `Builder` does that:
//! `reserve()` hands out a `BlockId` up front, the corresponding `set_*`
//! call fills the slot in later, and `build()` panics if anything was
//! reserved but never filled — a fixture bug, not something a test should
//! silently tolerate.

#![allow(dead_code)]

use indexmap::IndexMap;
use ptacore::{
    intern::{Interner, NameId},
    ir::{BlockId, ClassBlock, CodeBlock, FunctionBlock, ModuleBlock, Program, Stmt, StmtId, StmtKind, VarId, Variable, VariableKind},
};

pub struct Builder {
    interner: Interner,
    blocks: Vec<Option<CodeBlock>>,
    next_stmt: u32,
}

impl Builder {
    pub fn new() -> Self {
        Self { interner: Interner::new(), blocks: Vec::new(), next_stmt: 0 }
    }

    pub fn name(&mut self, s: &str) -> NameId {
        self.interner.intern(s)
    }

    pub fn reserve(&mut self) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).unwrap());
        self.blocks.push(None);
        id
    }

    pub fn stmt(&mut self, belongs_to: BlockId, kind: StmtKind) -> Stmt {
        let id = StmtId(self.next_stmt);
        self.next_stmt += 1;
        Stmt::new(id, belongs_to, kind)
    }

    pub fn set_module(&mut self, id: BlockId, block: ModuleBlock) {
        self.blocks[id.0 as usize] = Some(CodeBlock::Module(block));
    }

    pub fn set_class(&mut self, id: BlockId, block: ClassBlock) {
        self.blocks[id.0 as usize] = Some(CodeBlock::Class(block));
    }

    pub fn set_function(&mut self, id: BlockId, block: FunctionBlock) {
        self.blocks[id.0 as usize] = Some(CodeBlock::Function(block));
    }

    pub fn build(self, entry_modules: Vec<BlockId>) -> Program {
        let blocks = self
            .blocks
            .into_iter()
            .enumerate()
            .map(|(i, b)| b.unwrap_or_else(|| panic!("block {i} reserved but never filled")))
            .collect();
        Program::new(self.interner, blocks, entry_modules)
    }
}

/// Builds a placeholder `Variable` the same way `Solver::variable_of` does:
/// identity is `(block, local)` only, so the display `name`/`kind` here
/// don't need to match whatever the fixture itself used.
pub fn var(block: BlockId, local: u32) -> Variable {
    Variable::new(block, VarId(local), NameId::default(), VariableKind::Temporary)
}

pub fn kw_args(pairs: Vec<(NameId, VarId)>) -> IndexMap<NameId, VarId> {
    pairs.into_iter().collect()
}
