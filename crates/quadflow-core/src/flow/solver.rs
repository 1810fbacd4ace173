use super::Analysis;
use crate::cfg::{ControlFlowGraph, QuadEdges};
use crate::lattice::DataflowObject;
use crate::quad::{Quad, QuadId};
use crate::{FlowError, Result};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveStats {
    pub analysis: &'static str,
    pub sweeps: usize,
    pub quads: usize,
    pub removed: usize,
    pub duration: Duration,
}

/// Iterative solver holding at most one registered analysis.
pub struct Solver<A: Analysis> {
    analysis: Option<A>,
}

impl<A: Analysis> Default for Solver<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Analysis> Solver<A> {
    pub fn new() -> Self {
        Self { analysis: None }
    }

    pub fn with_analysis(analysis: A) -> Self {
        Self {
            analysis: Some(analysis),
        }
    }

    /// Replaces the registered analysis, handing back the previous one.
    pub fn register_analysis(&mut self, analysis: A) -> Option<A> {
        self.analysis.replace(analysis)
    }

    pub fn analysis(&self) -> Option<&A> {
        self.analysis.as_ref()
    }

    pub fn analysis_mut(&mut self) -> Option<&mut A> {
        self.analysis.as_mut()
    }

    pub fn take_analysis(&mut self) -> Option<A> {
        self.analysis.take()
    }

    pub fn run(&mut self, cfg: &mut ControlFlowGraph) -> Result<SolveStats> {
        let analysis = self
            .analysis
            .as_mut()
            .ok_or(FlowError::NoAnalysisRegistered)?;
        let start = Instant::now();

        analysis.preprocess(cfg)?;
        debug!(
            analysis = analysis.name(),
            method = %cfg.method().name,
            quads = cfg.quad_count(),
            "solving"
        );

        let edges = cfg.quad_edges();
        let quads: Vec<&Quad> = cfg.quads().collect();
        let sweeps = if analysis.is_forward() {
            solve_forward(analysis, &quads, &edges)?
        } else {
            solve_backward(analysis, &quads, &edges)?
        };
        let quad_count = quads.len();

        analysis.postprocess(cfg)?;

        let removals = analysis.pending_removals();
        let removed = cfg.remove_quads(&removals);
        if removed > 0 {
            debug!(analysis = analysis.name(), removed, "removed quads");
        }

        Ok(SolveStats {
            analysis: analysis.name(),
            sweeps,
            quads: quad_count,
            removed,
            duration: start.elapsed(),
        })
    }
}

/// Folds the neighbours' values: the first is copied, the rest are met into it.
/// `None` neighbours contribute `boundary`; no neighbours at all yields top.
fn meet_neighbors<A, F>(
    analysis: &A,
    neighbors: &[Option<QuadId>],
    boundary: &A::Lattice,
    value_of: F,
) -> A::Lattice
where
    A: Analysis,
    F: Fn(&A, QuadId) -> A::Lattice,
{
    let mut result = analysis.new_temp_var();
    for (i, neighbor) in neighbors.iter().enumerate() {
        let value = match neighbor {
            Some(id) => value_of(analysis, *id),
            None => boundary.clone(),
        };
        if i == 0 {
            result.copy_from(&value);
        } else {
            result.meet_with(&value);
        }
    }
    result
}

fn boundary_value<A, F>(
    analysis: &A,
    ids: Vec<QuadId>,
    fallback: &A::Lattice,
    value_of: F,
) -> A::Lattice
where
    A: Analysis,
    F: Fn(&A, QuadId) -> A::Lattice,
{
    if ids.is_empty() {
        return fallback.clone();
    }
    let neighbors: Vec<Option<QuadId>> = ids.into_iter().map(Some).collect();
    meet_neighbors(analysis, &neighbors, fallback, value_of)
}

fn solve_forward<A: Analysis>(
    analysis: &mut A,
    quads: &[&Quad],
    edges: &QuadEdges,
) -> Result<usize> {
    let top = analysis.new_temp_var();
    for quad in quads {
        analysis.set_out(quad.id, &top);
    }
    let entry = analysis.get_entry();

    let mut sweeps = 0;
    loop {
        sweeps += 1;
        let mut changed = false;
        for quad in quads {
            let incoming = meet_neighbors(analysis, edges.predecessors(quad.id), &entry, |a, id| {
                a.get_out(id)
            });
            analysis.set_in(quad.id, &incoming);
            let before = analysis.get_out(quad.id);
            analysis.process_quad(quad)?;
            if before != analysis.get_out(quad.id) {
                changed = true;
            }
        }
        trace!(analysis = analysis.name(), sweeps, changed, "forward sweep");
        if !changed {
            break;
        }
    }

    let exit = boundary_value(analysis, edges.exit_quads(), &entry, |a, id| a.get_out(id));
    analysis.set_exit(&exit);
    Ok(sweeps)
}

fn solve_backward<A: Analysis>(
    analysis: &mut A,
    quads: &[&Quad],
    edges: &QuadEdges,
) -> Result<usize> {
    let top = analysis.new_temp_var();
    for quad in quads {
        analysis.set_in(quad.id, &top);
    }
    let exit = analysis.get_exit();

    let mut sweeps = 0;
    loop {
        sweeps += 1;
        let mut changed = false;
        for quad in quads {
            let outgoing = meet_neighbors(analysis, edges.successors(quad.id), &exit, |a, id| {
                a.get_in(id)
            });
            analysis.set_out(quad.id, &outgoing);
            let before = analysis.get_in(quad.id);
            analysis.process_quad(quad)?;
            if before != analysis.get_in(quad.id) {
                changed = true;
            }
        }
        trace!(analysis = analysis.name(), sweeps, changed, "backward sweep");
        if !changed {
            break;
        }
    }

    let entry = boundary_value(analysis, edges.entry_quads(), &exit, |a, id| a.get_in(id));
    analysis.set_entry(&entry);
    Ok(sweeps)
}
