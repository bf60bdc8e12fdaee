//! Solver tracer (ambient diagnostics, carried forward from the teacher's
//! zero-cost `VmTracer` pattern).
//!
//! The solver is generic over `Tr: SolverTracer` rather than calling into a
//! logging facade directly: the default [`NoopTracer`] compiles away to
//! nothing, so a release build pays zero overhead for hooks nobody is
//! listening to. [`StderrTracer`] is for ad-hoc human debugging;
//! [`StatsTracer`] accumulates counts a test can assert monotonicity
//! against (§8.1 P1) without capturing the whole work-list history.

use crate::{context::CtxModel, intern::NameId, ir::StmtId, object::ObjId, pointer::Pointer};

/// Hooks into solver progress. All methods have a no-op default so an
/// implementor only needs to override the ones it cares about.
#[allow(unused_variables)]
pub trait SolverTracer<C: CtxModel> {
    fn on_enqueue(&mut self, pending_len: usize) {}
    fn on_dispatch(&mut self, pointer: &Pointer<C>, delta_len: usize) {}
    fn on_reachable(&mut self, stmt: StmtId) {}
    fn on_call_edge(&mut self, site: StmtId, callee_name: NameId) {}
    fn on_mro_added(&mut self, class_obj: ObjId) {}
    fn on_attribute_resolved(&mut self, resolver: ObjId, attr: NameId) {}
    fn on_del_attr(&mut self, object: ObjId, attr: NameId) {}
}

/// The default: every hook is a no-op, and the compiler is free to inline
/// that away entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl<C: CtxModel> SolverTracer<C> for NoopTracer {}

/// Logs every hook to stderr via the `log` crate, for interactive debugging
/// (not used by default; wire in explicitly when diagnosing a run).
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl<C: CtxModel> SolverTracer<C> for StderrTracer {
    fn on_enqueue(&mut self, pending_len: usize) {
        log::trace!("enqueue: work list now has {pending_len} pending events");
    }

    fn on_dispatch(&mut self, pointer: &Pointer<C>, delta_len: usize) {
        log::debug!("dispatch: {pointer:?} grew by {delta_len} objects");
    }

    fn on_reachable(&mut self, stmt: StmtId) {
        log::debug!("reachable: statement {stmt:?}");
    }

    fn on_call_edge(&mut self, site: StmtId, callee_name: NameId) {
        log::info!("call edge: {site:?} -> {callee_name:?}");
    }

    fn on_mro_added(&mut self, class_obj: ObjId) {
        log::debug!("mro added for {class_obj:?}");
    }

    fn on_attribute_resolved(&mut self, resolver: ObjId, attr: NameId) {
        log::trace!("resolved attribute {attr:?} on {resolver:?}");
    }

    fn on_del_attr(&mut self, object: ObjId, attr: NameId) {
        log::debug!("del attr {attr:?} on {object:?}");
    }
}

/// Counts worklist events without retaining them, used by the CLI's
/// `--stats` flag and by tests asserting that counters only move forward.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsTracer {
    pub enqueues: u64,
    pub dispatches: u64,
    pub reachable_stmts: u64,
    pub call_edges: u64,
    pub mros_added: u64,
    pub attributes_resolved: u64,
    pub del_attrs: u64,
}

impl<C: CtxModel> SolverTracer<C> for StatsTracer {
    fn on_enqueue(&mut self, _pending_len: usize) {
        self.enqueues += 1;
    }

    fn on_dispatch(&mut self, _pointer: &Pointer<C>, _delta_len: usize) {
        self.dispatches += 1;
    }

    fn on_reachable(&mut self, _stmt: StmtId) {
        self.reachable_stmts += 1;
    }

    fn on_call_edge(&mut self, _site: StmtId, _callee_name: NameId) {
        self.call_edges += 1;
    }

    fn on_mro_added(&mut self, _class_obj: ObjId) {
        self.mros_added += 1;
    }

    fn on_attribute_resolved(&mut self, _resolver: ObjId, _attr: NameId) {
        self.attributes_resolved += 1;
    }

    fn on_del_attr(&mut self, _object: ObjId, _attr: NameId) {
        self.del_attrs += 1;
    }
}
