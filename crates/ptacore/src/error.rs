//! Error surface of the analyzer (spec §7).
//!
//! The solver's fixed point is total: once the IR has passed
//! [`crate::ir::Program::validate`], nothing inside the work-list loop can
//! fail (§7's "malformed call" and "illegal MRO" cases are handled by
//! silent discard, not by `Result`). The only fallible boundary is IR
//! ingestion and the optional work-budget ceiling from §5.

use crate::ir::{BlockId, StmtId};

/// Errors the analyzer can report. Mirrors the teacher's `ExcType`/`RunError`
/// split in spirit: a small closed enum at the one boundary that can fail,
/// rather than `Result` threaded through code that cannot.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize)]
pub enum AnalyzerError {
    /// The frontend produced IR violating the §6.1 contract: an unknown
    /// block reference, a statement claimed by the wrong block, and so on.
    /// Per §7 this is a programmer error in the frontend, not a condition
    /// the solver recovers from.
    #[strum(to_string = "malformed IR in block {block:?}: {reason} (statement {stmt_id:?})")]
    MalformedIr { reason: String, block: BlockId, stmt_id: Option<StmtId> },
    /// An entry point named a block that is not a module block.
    #[strum(to_string = "entry point {block:?} is not a module block")]
    UnknownEntryModule { block: BlockId },
    /// The optional work-budget ceiling (§5) was exceeded before the fixed
    /// point was reached. Not a correctness error — whatever was computed
    /// up to this point remains valid, just incomplete.
    #[strum(to_string = "work-list budget of {budget} events exceeded before reaching a fixed point")]
    ResourceBudgetExceeded { budget: usize },
}

impl std::error::Error for AnalyzerError {}
