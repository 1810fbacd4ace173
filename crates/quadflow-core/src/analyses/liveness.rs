use crate::cfg::ControlFlowGraph;
use crate::flow::{Analysis, FlowState};
use crate::lattice::{MeetOp, RegisterSet};
use crate::quad::{Quad, QuadId};
use crate::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Live registers, computed backward. With dead-code elimination enabled, every quad
/// without side effects whose results are all dead afterwards is scheduled for removal.
#[derive(Debug, Clone)]
pub struct Liveness {
    state: FlowState<RegisterSet>,
    eliminate_dead_code: bool,
    dead: BTreeSet<QuadId>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            state: FlowState::new(RegisterSet::empty(Arc::default(), MeetOp::Union)),
            eliminate_dead_code: false,
            dead: BTreeSet::new(),
        }
    }

    pub fn with_dead_code_elimination() -> Self {
        Self {
            eliminate_dead_code: true,
            ..Self::new()
        }
    }

    pub fn dead_quads(&self) -> &BTreeSet<QuadId> {
        &self.dead
    }

    pub fn is_live_out(&self, id: QuadId, register: &str) -> bool {
        self.state
            .out_ref(id)
            .map(|live| live.contains(register))
            .unwrap_or(false)
    }
}

impl Analysis for Liveness {
    type Lattice = RegisterSet;

    fn name(&self) -> &'static str {
        "liveness"
    }

    fn is_forward(&self) -> bool {
        false
    }

    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        let universe = Arc::new(cfg.register_universe());
        self.state = FlowState::for_graph(cfg, RegisterSet::top(universe, MeetOp::Union));
        self.dead.clear();
        debug!(method = %cfg.method().name, "liveness: preprocess");
        Ok(())
    }

    fn process_quad(&mut self, quad: &Quad) -> Result<()> {
        let mut live = self.state.get_out(quad.id);
        for def in quad.defined_registers() {
            live.remove(def.name());
        }
        for used in quad.used_registers() {
            live.insert(used.name());
        }
        self.state.set_in(quad.id, &live);
        Ok(())
    }

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        if self.eliminate_dead_code {
            for quad in cfg.quads() {
                if quad.has_side_effects() {
                    continue;
                }
                let all_dead = quad
                    .defined_registers()
                    .iter()
                    .all(|def| !self.is_live_out(quad.id, def.name()));
                if all_dead {
                    self.dead.insert(quad.id);
                }
            }
        }
        debug!(
            method = %cfg.method().name,
            dead = self.dead.len(),
            "liveness: postprocess"
        );
        Ok(())
    }

    fn state(&self) -> &FlowState<RegisterSet> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FlowState<RegisterSet> {
        &mut self.state
    }

    fn pending_removals(&self) -> Vec<QuadId> {
        self.dead.iter().copied().collect()
    }
}
