//! External driver (spec §6.4): reads a JSON-encoded IR file, runs the
//! solver, writes the JSON report. Flags are informative, not part of the
//! core — everything here maps onto `ptacore::SolverConfig`/`build_report`.

use std::{fs, io::BufReader, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ptacore::{
    AnalysisReport, ContextMode, CtxModel, NoopTracer, RunOutcome, Solver, SolverConfig, StatsTracer, build_report,
    context::ContextChain,
    ir::{BlockId, Program},
};

#[derive(Parser)]
#[command(name = "ptacore")]
#[command(version)]
#[command(about = "Whole-program points-to / alias analyzer for a dynamic OO scripting language")]
struct Cli {
    /// Path to the JSON-encoded IR file (the frontend's output contract, §6.1).
    input: PathBuf,

    /// Treat these block ids as entry modules instead of whatever the IR file declares.
    #[arg(long = "entry-module", value_name = "BLOCK_ID")]
    entry_modules: Vec<u32>,

    /// Run the k-limited context-sensitive solver, optionally overriding K (default 1).
    #[arg(long = "context-sensitive", value_name = "K", num_args = 0..=1, default_missing_value = "1")]
    context_sensitive: Option<u8>,

    /// Abort the work-list loop after this many events rather than running to completion.
    #[arg(long)]
    budget: Option<usize>,

    /// Keep only callers whose readable name starts with this prefix in the call-graph dump.
    #[arg(long = "include-prefix", value_name = "PREFIX")]
    include_prefix: Option<String>,

    /// Write the report here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log work-list event counters after the run.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = fs::File::open(&cli.input).with_context(|| format!("reading IR file {}", cli.input.display()))?;
    let mut program: Program =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing IR file {}", cli.input.display()))?;

    if !cli.entry_modules.is_empty() {
        program.entry_modules = cli.entry_modules.iter().map(|&b| BlockId(b)).collect();
    }

    let config = SolverConfig {
        context: match cli.context_sensitive {
            Some(k) => ContextMode::Sensitive { k },
            None => ContextMode::Insensitive,
        },
        work_budget: cli.budget,
        include_prefix: cli.include_prefix.clone(),
    };

    log::info!("running {:?} over {} blocks, entries {:?}", config.context, program.blocks().len(), program.entry_modules);

    let (report, outcome) = match (config.context, cli.stats) {
        (ContextMode::Insensitive, false) => analyze::<()>(&program, config)?,
        (ContextMode::Insensitive, true) => analyze_with_stats::<()>(&program, config)?,
        (ContextMode::Sensitive { .. }, false) => analyze::<ContextChain>(&program, config)?,
        (ContextMode::Sensitive { .. }, true) => analyze_with_stats::<ContextChain>(&program, config)?,
    };

    match outcome {
        RunOutcome::Converged => log::info!("solver converged to a fixed point"),
        RunOutcome::BudgetExhausted => log::warn!("work-list budget exhausted before reaching a fixed point; report is partial"),
    }

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    match cli.output {
        Some(path) => fs::write(&path, json).with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

/// The default path: a `NoopTracer` so an ordinary run carries no
/// instrumentation overhead.
fn analyze<C: CtxModel>(program: &Program, config: SolverConfig) -> Result<(AnalysisReport, RunOutcome)> {
    let include_prefix = config.include_prefix.clone();
    let mut solver: Solver<'_, C, NoopTracer> = Solver::new(program, config);
    let outcome = solver.run().context("running the solver")?;
    let report = build_report(&solver, include_prefix.as_deref());
    Ok((report, outcome))
}

/// The `--stats` path: swaps in `StatsTracer` to count work-list events.
fn analyze_with_stats<C: CtxModel>(program: &Program, config: SolverConfig) -> Result<(AnalysisReport, RunOutcome)> {
    let include_prefix = config.include_prefix.clone();
    let mut solver: Solver<'_, C, StatsTracer> = Solver::with_tracer(program, config, StatsTracer::default());
    let outcome = solver.run().context("running the solver")?;
    log::info!("{:?}", solver.tracer());
    let report = build_report(&solver, include_prefix.as_deref());
    Ok((report, outcome))
}
