//! JSON-serializable dumps of analysis results (spec §6.3, supplemented
//! from `class_hiearchy.py: to_json` / `PTA/json_utils.py`).
//!
//! A thin `serde` adapter over [`crate::solver::Solver`]'s read-only
//! accessors: no analysis logic lives here, only stringification of the
//! three dumps the spec names (points-to set, dual call graph, class
//! hierarchy). Lives outside the core solver module on purpose.

use ahash::AHashMap;
use serde::Serialize;

use crate::{
    context::CtxModel,
    intern::Interner,
    object::{ObjId, ObjectData, ObjectPool},
    pointer::Pointer,
    solver::Solver,
    tracer::SolverTracer,
};

/// The points-to set: every populated pointer mapped to its stringified
/// object identities (spec §6.3, first bullet).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointsToReport {
    pub pointers: AHashMap<String, Vec<String>>,
}

/// Both call-graph foldings (spec §6.3, second bullet): "both foldings are
/// required".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallGraphReport {
    pub by_readable_name: AHashMap<String, Vec<String>>,
    pub by_call_statement: AHashMap<String, Vec<String>>,
}

/// One class's MRO set and subclass back-edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassEntry {
    pub class: String,
    pub mros: Vec<Vec<String>>,
    pub subclasses: Vec<(String, usize)>,
}

/// The class hierarchy dump (spec §6.3, third bullet).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassHierarchyReport {
    pub classes: Vec<ClassEntry>,
}

/// The complete report a CLI run writes to `-o/--output` (spec §6.3/§6.4).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub points_to: PointsToReport,
    pub call_graph: CallGraphReport,
    pub class_hierarchy: ClassHierarchyReport,
}

/// Stringifies one abstract object. Never used as a key for anything the
/// solver itself compares — `ObjId` remains the real identity throughout;
/// this exists purely to make the dump human-readable.
fn describe_object<C: CtxModel>(interner: &Interner, objects: &ObjectPool<C>, id: ObjId) -> String {
    match objects.get(id) {
        ObjectData::Module { block } => format!("Module#{}(blk{})", id.index(), block.0),
        ObjectData::Function { site, ctx, function_block } => {
            format!("Function#{}(stmt{},blk{}){:?}", id.index(), site.0, function_block.0, ctx)
        }
        ObjectData::Class { site, ctx, class_block } => {
            format!("Class#{}(stmt{},blk{}){:?}", id.index(), site.0, class_block.0, ctx)
        }
        ObjectData::Instance { site, ctx, class_obj } => {
            format!("Instance#{}(stmt{},of={}){:?}", id.index(), site.0, class_obj.index(), ctx)
        }
        ObjectData::Builtin { site, ctx, type_tag, value } => {
            let tag = interner.resolve(*type_tag);
            let value = value.map(|v| interner.resolve(v)).unwrap_or("");
            format!("Builtin#{}(stmt{},{tag},{value}){:?}", id.index(), site.0, ctx)
        }
        ObjectData::StaticMethod { func } => format!("StaticMethod#{}(of={})", id.index(), func.index()),
        ObjectData::ClassMethod { class_obj, func } => {
            format!("ClassMethod#{}({}.{})", id.index(), class_obj.index(), func.index())
        }
        ObjectData::InstanceMethod { self_obj, func } => {
            format!("InstanceMethod#{}({}.{})", id.index(), self_obj.index(), func.index())
        }
        ObjectData::Super { ty, bound } => format!("Super#{}(ty={},bound={})", id.index(), ty.index(), bound.index()),
        ObjectData::Fake { prefix, root, .. } => {
            let root = root.map(|r| interner.resolve(r)).unwrap_or("");
            let prefix = prefix.map(ObjId::index);
            format!("Fake#{}(prefix={prefix:?},root={root})", id.index())
        }
    }
}

fn describe_pointer<C: CtxModel>(interner: &Interner, objects: &ObjectPool<C>, ptr: &Pointer<C>) -> String {
    match ptr {
        Pointer::Var(v) => {
            let name = interner.resolve(v.var.name);
            format!("Var(blk{}:v{}:{name}){:?}", v.var.block.0, v.var.local.0, v.ctx)
        }
        Pointer::Attr(a) => {
            let attr = interner.resolve(a.attr);
            format!("Attr({}.{attr})", describe_object(interner, objects, a.obj))
        }
    }
}

/// Builds the full report from a solver that has already run to
/// completion (or budget exhaustion — a partial report is still a valid
/// report, per §5). `include_prefix` filters the call graph's caller side
/// only (spec §6.4), matching the CLI's `--include-prefix` flag.
#[must_use]
pub fn build_report<C: CtxModel, Tr: SolverTracer<C>>(solver: &Solver<'_, C, Tr>, include_prefix: Option<&str>) -> AnalysisReport {
    let interner = solver.interner();
    let objects = solver.objects();

    let mut pointers = AHashMap::new();
    for (ptr, objs) in solver.points_to().iter() {
        let mut names: Vec<String> = objs.iter().map(|&o| describe_object(interner, objects, o)).collect();
        names.sort();
        pointers.insert(describe_pointer(interner, objects, ptr), names);
    }

    let mut by_readable_name = AHashMap::new();
    let mut by_call_statement = AHashMap::new();
    for (caller, callees) in solver.call_graph().iter_by_name() {
        let caller_name = interner.resolve(caller);
        if include_prefix.is_some_and(|p| !caller_name.starts_with(p)) {
            continue;
        }
        let mut names: Vec<String> = callees.iter().map(|&c| interner.resolve(c).to_owned()).collect();
        names.sort();
        by_readable_name.insert(caller_name.to_owned(), names);
    }
    for (site, blocks) in solver.call_graph().iter_by_stmt() {
        let mut names: Vec<String> = blocks.iter().map(|b| format!("blk{}", b.0)).collect();
        names.sort();
        by_call_statement.insert(format!("stmt{}", site.0), names);
    }

    let mut classes = Vec::new();
    for (id, data) in objects.iter() {
        if !data.is_class() {
            continue;
        }
        let mros: Vec<Vec<String>> = solver
            .hierarchy()
            .mros_of(id)
            .map(|mro| mro.iter().map(|&o| describe_object(interner, objects, o)).collect())
            .collect();
        let subclasses: Vec<(String, usize)> = solver
            .hierarchy()
            .subclasses_of(id)
            .map(|(sub, pos)| (describe_object(interner, objects, sub), pos))
            .collect();
        classes.push(ClassEntry { class: describe_object(interner, objects, id), mros, subclasses });
    }
    classes.sort_by(|a, b| a.class.cmp(&b.class));

    AnalysisReport {
        points_to: PointsToReport { pointers },
        call_graph: CallGraphReport { by_readable_name, by_call_statement },
        class_hierarchy: ClassHierarchyReport { classes },
    }
}
