use crate::cfg::ControlFlowGraph;
use crate::flow::{Analysis, FlowState};
use crate::lattice::{MeetOp, RegisterSet};
use crate::quad::{Operator, Quad};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Faint registers: those whose value never reaches a real use, even through
/// copies and arithmetic feeding other faint registers.
#[derive(Debug, Clone)]
pub struct Faintness {
    state: FlowState<RegisterSet>,
}

impl Default for Faintness {
    fn default() -> Self {
        Self::new()
    }
}

impl Faintness {
    pub fn new() -> Self {
        Self {
            state: FlowState::new(RegisterSet::empty(Arc::default(), MeetOp::Intersection)),
        }
    }
}

impl Analysis for Faintness {
    type Lattice = RegisterSet;

    fn name(&self) -> &'static str {
        "faintness"
    }

    fn is_forward(&self) -> bool {
        false
    }

    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        let universe = Arc::new(cfg.register_universe());
        let top = RegisterSet::top(universe, MeetOp::Intersection);
        self.state = FlowState::for_graph(cfg, top.clone());
        self.state.set_exit(&top);
        debug!(method = %cfg.method().name, "faintness: preprocess");
        Ok(())
    }

    fn process_quad(&mut self, quad: &Quad) -> Result<()> {
        let mut faint = self.state.get_out(quad.id);
        match &quad.operator {
            Operator::Move { dest, .. } | Operator::Binary { dest, .. } => {
                let was_faint = faint.contains(dest.name());
                faint.insert(dest.name());
                if !was_faint {
                    for used in quad.used_registers() {
                        faint.remove(used.name());
                    }
                }
            }
            _ => {
                for def in quad.defined_registers() {
                    faint.insert(def.name());
                }
                for used in quad.used_registers() {
                    faint.remove(used.name());
                }
            }
        }
        self.state.set_in(quad.id, &faint);
        Ok(())
    }

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        debug!(method = %cfg.method().name, "faintness: postprocess");
        Ok(())
    }

    fn state(&self) -> &FlowState<RegisterSet> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FlowState<RegisterSet> {
        &mut self.state
    }
}
