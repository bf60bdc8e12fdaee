//! Whole-program points-to/alias analysis for a dynamic OO scripting
//! language: an iterative work-list fixed point over a pointer-flow graph
//! and a points-to store, generic over the context discipline (§9) and
//! instrumented through a zero-cost [`tracer::SolverTracer`].
#![expect(clippy::too_many_arguments, reason = "call binding mirrors the wire Call statement's own arity")]
#![expect(clippy::type_complexity, reason = "context-generic pointer/object tuples are intentionally explicit")]

pub mod attrgraph;
pub mod binding;
pub mod callgraph;
pub mod context;
pub mod error;
pub mod flow;
pub mod hierarchy;
pub mod intern;
pub mod ir;
pub mod object;
pub mod pointer;
pub mod report;
pub mod resolver;
pub mod resource;
mod solver;
pub mod store;
pub mod tracer;

pub use crate::{
    context::{CallSiteContext, ContextChain, ContextElement, CtxModel},
    error::AnalyzerError,
    object::{ObjId, ObjectData, ObjectPool},
    pointer::{AttrPtr, Pointer, VarPtr},
    report::{AnalysisReport, build_report},
    solver::{ContextMode, RunOutcome, Solver, SolverConfig},
    tracer::{NoopTracer, SolverTracer, StatsTracer, StderrTracer},
};
