use crate::analyses::{
    ConstantProp, Faintness, Liveness, NullCheckElimination, NullCheckMode, ReachingDefs,
};
use crate::cfg::ControlFlowGraph;
use crate::config::OptimizeConfig;
use crate::flow::{Analysis, Solver};
use crate::quad::QuadId;
use crate::report::FlowReport;
use crate::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Liveness,
    Faintness,
    ReachingDefs,
    ConstantProp,
    NullCheck,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Liveness,
        AnalysisKind::Faintness,
        AnalysisKind::ReachingDefs,
        AnalysisKind::ConstantProp,
        AnalysisKind::NullCheck,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisKind::Liveness => "liveness",
            AnalysisKind::Faintness => "faintness",
            AnalysisKind::ReachingDefs => "reaching-defs",
            AnalysisKind::ConstantProp => "constant-prop",
            AnalysisKind::NullCheck => "null-check",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| FlowError::UnknownAnalysis(s.to_string()))
    }
}

/// Redundant null checks found in one method, rendered as `name id id ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCheckReport {
    pub method: String,
    pub redundant: Vec<QuadId>,
}

impl fmt::Display for NullCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.method)?;
        for id in &self.redundant {
            write!(f, " {}", id)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassOutcome {
    pub pass: String,
    pub round: usize,
    pub removed: Vec<QuadId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeSummary {
    pub method: String,
    pub passes: Vec<PassOutcome>,
}

impl OptimizeSummary {
    pub fn total_removed(&self) -> usize {
        self.passes.iter().map(|p| p.removed.len()).sum()
    }
}

pub fn run_analysis(kind: AnalysisKind, cfg: &mut ControlFlowGraph) -> Result<FlowReport> {
    match kind {
        AnalysisKind::Liveness => solve_and_report(Liveness::new(), cfg),
        AnalysisKind::Faintness => solve_and_report(Faintness::new(), cfg),
        AnalysisKind::ReachingDefs => solve_and_report(ReachingDefs::new(), cfg),
        AnalysisKind::ConstantProp => solve_and_report(ConstantProp::new(), cfg),
        AnalysisKind::NullCheck => {
            solve_and_report(NullCheckElimination::new(NullCheckMode::report()), cfg)
        }
    }
}

fn solve_and_report<A: Analysis>(analysis: A, cfg: &mut ControlFlowGraph) -> Result<FlowReport> {
    let mut solver = Solver::with_analysis(analysis);
    let stats = solver.run(cfg)?;
    let analysis = solver
        .take_analysis()
        .ok_or(FlowError::NoAnalysisRegistered)?;
    info!(
        analysis = stats.analysis,
        method = %cfg.method().name,
        sweeps = stats.sweeps,
        quads = stats.quads,
        "analysis converged"
    );
    let mut report = analysis.report(cfg);
    report.removed = analysis.pending_removals();
    Ok(report)
}

pub fn find_redundant_null_checks(cfg: &mut ControlFlowGraph) -> Result<NullCheckReport> {
    let mut solver = Solver::with_analysis(NullCheckElimination::new(NullCheckMode::report()));
    solver.run(cfg)?;
    let redundant = solver
        .analysis()
        .map(|a| a.redundant_checks().iter().copied().collect())
        .unwrap_or_default();
    Ok(NullCheckReport {
        method: cfg.method().name.clone(),
        redundant,
    })
}

/// Null-check-only mode runs one plain elimination. Otherwise each round runs
/// extended null-check elimination followed by dead code elimination.
pub fn optimize(cfg: &mut ControlFlowGraph, config: &OptimizeConfig) -> Result<OptimizeSummary> {
    let mut passes = Vec::new();

    if config.null_check_only {
        let mut solver = Solver::with_analysis(NullCheckElimination::new(NullCheckMode::remove()));
        passes.push(run_pass(&mut solver, cfg, 0)?);
    } else {
        let mut null_checks =
            Solver::with_analysis(NullCheckElimination::new(NullCheckMode::extended_remove()));
        let mut dead_code = Solver::with_analysis(Liveness::with_dead_code_elimination());
        for round in 0..config.rounds {
            passes.push(run_pass(&mut null_checks, cfg, round)?);
            passes.push(run_pass(&mut dead_code, cfg, round)?);
        }
    }

    let summary = OptimizeSummary {
        method: cfg.method().name.clone(),
        passes,
    };
    info!(
        method = %summary.method,
        removed = summary.total_removed(),
        "optimized"
    );
    Ok(summary)
}

fn run_pass<A: Analysis>(
    solver: &mut Solver<A>,
    cfg: &mut ControlFlowGraph,
    round: usize,
) -> Result<PassOutcome> {
    let stats = solver.run(cfg)?;
    let removed = solver
        .analysis()
        .map(|a| a.pending_removals())
        .unwrap_or_default();
    Ok(PassOutcome {
        pass: stats.analysis.to_string(),
        round,
        removed,
    })
}
