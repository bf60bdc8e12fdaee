//! The whole-program IR arena (spec §3.1, §6.1).
//!
//! A [`Program`] is immutable once built: the solver only ever reads from
//! it, exactly as the teacher's bytecode `Code` objects are immutable once
//! compiled and only read by the VM.

use crate::{
    error::AnalyzerError,
    intern::Interner,
    ir::{
        block::{BlockId, CodeBlock},
        stmt::{ModuleRef, StmtKind},
        variable::VarId,
    },
};

/// An immutable whole-program IR: a block arena plus the set of entry
/// module blocks the solver should seed reachability from.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub interner: Interner,
    blocks: Vec<CodeBlock>,
    pub entry_modules: Vec<BlockId>,
}

impl Program {
    #[must_use]
    pub fn new(interner: Interner, blocks: Vec<CodeBlock>, entry_modules: Vec<BlockId>) -> Self {
        Self { interner, blocks, entry_modules }
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> &CodeBlock {
        &self.blocks[id.0 as usize]
    }

    #[must_use]
    pub fn blocks(&self) -> &[CodeBlock] {
        &self.blocks
    }

    /// Validates the §6.1 frontend contract: every statement belongs to a
    /// block whose id matches its own `belongs_to`, referenced blocks and
    /// local variable slots exist, and `scopeLevel`s are well-formed.
    ///
    /// Violations are programmer errors in the frontend (§7): we report
    /// them eagerly rather than let the solver panic deep in a fixed point.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        for block in &self.blocks {
            for stmt in block.stmts() {
                if stmt.belongs_to != block.id() {
                    return Err(AnalyzerError::MalformedIr {
                        reason: "statement belongs_to does not match owning block".into(),
                        block: block.id(),
                        stmt_id: Some(stmt.id),
                    });
                }
                self.validate_stmt_refs(block, &stmt.kind)?;
            }
        }
        for &entry in &self.entry_modules {
            match self.blocks.get(entry.0 as usize) {
                Some(CodeBlock::Module(_)) => {}
                _ => return Err(AnalyzerError::UnknownEntryModule { block: entry }),
            }
        }
        Ok(())
    }

    fn check_block(&self, block: &CodeBlock, target: BlockId, what: &str) -> Result<(), AnalyzerError> {
        if self.blocks.get(target.0 as usize).is_none() {
            return Err(AnalyzerError::MalformedIr {
                reason: format!("{what} references unknown block {}", target.0),
                block: block.id(),
                stmt_id: None,
            });
        }
        Ok(())
    }

    fn validate_stmt_refs(&self, block: &CodeBlock, kind: &StmtKind) -> Result<(), AnalyzerError> {
        match kind {
            StmtKind::NewFunction { function_block, .. } => {
                self.check_block(block, *function_block, "NewFunction")?;
            }
            StmtKind::NewClass { class_block, .. } => {
                self.check_block(block, *class_block, "NewClass")?;
            }
            StmtKind::NewModule { module: ModuleRef::Resolved(m), .. } => {
                self.check_block(block, *m, "NewModule")?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Number of local variable slots a block declares, used only for
    /// sanity-checking frontend output in tests.
    #[must_use]
    pub fn max_local(&self, block: BlockId) -> Option<VarId> {
        self.block(block)
            .stmts()
            .iter()
            .flat_map(crate::ir::stmt::referenced_vars)
            .max()
    }
}
