//! The work-list fixed-point driver (spec §4.1, L8).
//!
//! [`Solver`] owns every piece of mutable analysis state (`PT`, `PF`, `AG`,
//! `B`, `CH`, `RA`/`PA`, the reachable set, the call graph) and is generic
//! over the context model `C` (§9: "context as a parameter, not a
//! duplicated file") and a [`SolverTracer`] `Tr` for zero-cost diagnostics.
//! `Solver<(), NoopTracer>` is the context-insensitive solver;
//! `Solver<ContextChain, _>` is the k-limited context-sensitive one.

mod call;
mod reachable;
mod stmt;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    attrgraph::AttributeGraph,
    binding::BindingIndex,
    callgraph::CallGraph,
    context::CtxModel,
    error::AnalyzerError,
    hierarchy::ClassHierarchy,
    intern::Interner,
    ir::{BlockId, Program, Stmt, StmtId},
    object::ObjectPool,
    pointer::{Pointer, VarPtr},
    resolver::{PersistentAttrIndex, PersistentAttrs, ResolvedAttrs},
    resource::ResourceTracker,
    store::PointsToStore,
    tracer::{NoopTracer, SolverTracer},
};

/// Which context discipline a run uses. Chooses which `Solver<C, _>` the
/// CLI instantiates; the solver itself only reads `k` out of `Sensitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ContextMode {
    Insensitive,
    Sensitive { k: u8 },
}

impl Default for ContextMode {
    fn default() -> Self {
        Self::Sensitive { k: crate::context::DEFAULT_K }
    }
}

/// Run-time knobs (spec §5's optional budget, §6.4's CLI flags minus I/O).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SolverConfig {
    pub context: ContextMode,
    /// §5: "An implementer may add a work-budget ceiling that aborts with a
    /// partial-result flag". `None` runs to completion.
    pub work_budget: Option<usize>,
    /// §6.4: call-graph filter, applied at report time only — carried here
    /// so the CLI has one place to assemble config from flags.
    pub include_prefix: Option<String>,
}

impl SolverConfig {
    #[must_use]
    pub fn k(&self) -> u8 {
        match self.context {
            ContextMode::Insensitive => 0,
            ContextMode::Sensitive { k } => k,
        }
    }
}

/// Outcome of running to completion or hitting the optional work budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Converged,
    BudgetExhausted,
}

/// The two work-list event kinds (spec §4.1).
#[derive(Debug, Clone)]
enum Event<C: CtxModel> {
    AddPointsTo(Pointer<C>, Vec<crate::object::ObjId>),
    /// Binds one statement under one context — a function reached under two
    /// different call-site contexts enqueues two of these, one per context.
    BindStmt(StmtId, C),
}

pub struct Solver<'p, C: CtxModel, Tr: SolverTracer<C> = NoopTracer> {
    program: &'p Program,
    config: SolverConfig,
    tracer: Tr,
    resources: ResourceTracker,

    /// Independent from `program.interner`: the solver derives new names
    /// (`$r_<attr>`) the frontend never produced, and `program` is meant to
    /// stay immutable (§5 "The frontend's IR is immutable; the solver only
    /// reads from it"), so the solver interns into its own copy seeded from
    /// the frontend's table. Original `NameId`s remain valid since cloning
    /// preserves index order.
    interner: Interner,
    /// `StmtId -> (owning block, index within that block's stmts)`, built
    /// once at construction so binding re-evaluation can go from a bare
    /// `StmtId` (as stored in `B`/`CG`) back to the actual statement.
    stmt_index: AHashMap<StmtId, (BlockId, usize)>,

    pub(crate) objects: ObjectPool<C>,
    pub(crate) pt: PointsToStore<C>,
    pub(crate) pf: crate::flow::PointerFlowGraph<C>,
    pub(crate) binding: BindingIndex<C>,
    pub(crate) attr_graph: AttributeGraph<C>,
    pub(crate) hierarchy: ClassHierarchy,
    pub(crate) resolved_attrs: ResolvedAttrs,
    pub(crate) persistent_index: PersistentAttrIndex,
    pub(crate) persistent_attrs: PersistentAttrs,
    pub(crate) call_graph: CallGraph,
    /// `R`: reachable `(block, context)` pairs, so a block already bound
    /// under a given context is never re-bound (§4.1).
    reachable: ahash::AHashSet<(BlockId, C)>,

    /// Statements synthesized by the call processor (the `$init_<id>` call
    /// emitted for a constructor invocation, §4.8) that have no home in
    /// `program`'s own block arena, since that arena is immutable.
    synthetic_stmts: AHashMap<StmtId, Stmt>,
    /// Counters for fresh synthetic ids, offset well past anything a real
    /// frontend would emit rather than scanning the whole program for an
    /// exact maximum.
    next_stmt_id: u32,
    next_var_id: u32,

    work: std::collections::VecDeque<Event<C>>,
}

/// Floor for synthetic `StmtId`/`VarId` values, chosen far above anything a
/// realistic frontend would assign.
const SYNTHETIC_ID_FLOOR: u32 = 1_000_000_000;

impl<'p, C: CtxModel> Solver<'p, C, NoopTracer> {
    #[must_use]
    pub fn new(program: &'p Program, config: SolverConfig) -> Self {
        Self::with_tracer(program, config, NoopTracer)
    }
}

impl<'p, C: CtxModel, Tr: SolverTracer<C>> Solver<'p, C, Tr> {
    #[must_use]
    pub fn with_tracer(program: &'p Program, config: SolverConfig, tracer: Tr) -> Self {
        let mut stmt_index = AHashMap::new();
        for block in program.blocks() {
            for (i, stmt) in block.stmts().iter().enumerate() {
                stmt_index.insert(stmt.id, (block.id(), i));
            }
        }
        let resources = ResourceTracker::new(config.work_budget);
        Self {
            interner: program.interner.clone(),
            stmt_index,
            program,
            config,
            tracer,
            resources,
            objects: ObjectPool::new(),
            pt: PointsToStore::new(),
            pf: crate::flow::PointerFlowGraph::new(),
            binding: BindingIndex::new(),
            attr_graph: AttributeGraph::new(),
            hierarchy: ClassHierarchy::new(),
            resolved_attrs: ResolvedAttrs::default(),
            persistent_index: PersistentAttrIndex::default(),
            persistent_attrs: PersistentAttrs::default(),
            call_graph: CallGraph::new(),
            reachable: ahash::AHashSet::new(),
            synthetic_stmts: AHashMap::new(),
            next_stmt_id: SYNTHETIC_ID_FLOOR,
            next_var_id: SYNTHETIC_ID_FLOOR,
            work: std::collections::VecDeque::new(),
        }
    }

    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[must_use]
    pub fn points_to(&self) -> &PointsToStore<C> {
        &self.pt
    }

    #[must_use]
    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    #[must_use]
    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectPool<C> {
        &self.objects
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    fn stmt(&self, id: StmtId) -> &Stmt {
        if let Some(synthetic) = self.synthetic_stmts.get(&id) {
            return synthetic;
        }
        let (block, idx) = self.stmt_index[&id];
        &self.program.block(block).stmts()[idx]
    }

    /// Mints a fresh `StmtId` for a synthesized statement (the constructor
    /// call processor's `$init_<id>` invocation, §4.8).
    fn fresh_stmt_id(&mut self) -> StmtId {
        let id = StmtId(self.next_stmt_id);
        self.next_stmt_id += 1;
        id
    }

    /// Mints a fresh `VarId` for a synthesized variable, owned by whichever
    /// block the caller places it in.
    fn fresh_var(&mut self) -> crate::ir::VarId {
        let id = crate::ir::VarId(self.next_var_id);
        self.next_var_id += 1;
        id
    }

    fn enqueue(&mut self, event: Event<C>) {
        self.work.push_back(event);
        self.tracer.on_enqueue(self.work.len());
    }

    fn var_ptr(&self, var: crate::ir::Variable, ctx: &C) -> VarPtr<C> {
        let scope_level = self.program.block(var.block).scope_level();
        VarPtr::new(var, ctx.truncated(scope_level))
    }

    /// Runs the solver to completion (or budget exhaustion). §6.1: entry
    /// modules become reachable under the root context and get a
    /// `ModuleObject` published to their global variable.
    pub fn run(&mut self) -> Result<RunOutcome, AnalyzerError> {
        self.program.validate()?;
        let root = C::root();
        let entry_modules: Vec<BlockId> = self.program.entry_modules.clone();
        for module_block in entry_modules {
            self.seed_entry_module(module_block, root.clone());
        }
        self.drain_work_list()
    }

    fn seed_entry_module(&mut self, module_block: BlockId, ctx: C) {
        let Some(module) = self.program.block(module_block).as_module() else {
            return;
        };
        let global_var = crate::ir::Variable::new(module_block, module.global_variable, module.readable_name, crate::ir::VariableKind::Named);
        let obj = self.objects.create(crate::object::ObjectData::Module { block: module_block });
        let ptr = self.var_ptr(global_var, &ctx);
        self.mark_reachable(module_block, ctx);
        self.enqueue(Event::AddPointsTo(Pointer::Var(ptr), vec![obj]));
    }

    fn drain_work_list(&mut self) -> Result<RunOutcome, AnalyzerError> {
        while let Some(event) = self.work.pop_front() {
            if !self.resources.tick() {
                return Ok(RunOutcome::BudgetExhausted);
            }
            match event {
                Event::AddPointsTo(ptr, objs) => self.dispatch_add_points_to(ptr, objs),
                Event::BindStmt(stmt_id, ctx) => {
                    let stmt = self.stmt(stmt_id).clone();
                    self.bind_stmt(&stmt, ctx);
                }
            }
        }
        Ok(RunOutcome::Converged)
    }

    /// `ADD_POINTS_TO(p, objs)` (spec §4.1 main loop).
    fn dispatch_add_points_to(&mut self, ptr: Pointer<C>, objs: Vec<crate::object::ObjId>) {
        let delta = self.pt.put_all(ptr.clone(), objs);
        if delta.is_empty() {
            return;
        }
        self.tracer.on_dispatch(&ptr, delta.len());

        let successors: SmallVec<[Pointer<C>; 4]> = self.pf.successors(&ptr).cloned().collect();
        for succ in successors {
            let transformed = self.apply_phi(&ptr, &succ, &delta);
            if !transformed.is_empty() {
                self.enqueue(Event::AddPointsTo(succ, transformed));
            }
        }

        if let Pointer::Var(var_ptr) = &ptr {
            self.run_get_attr_rules(var_ptr, &delta);
            self.run_set_attr_rules(var_ptr, &delta);
            self.run_bound_processors(var_ptr, &delta);
        }
    }
}
