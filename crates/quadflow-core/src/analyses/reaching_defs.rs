use crate::cfg::ControlFlowGraph;
use crate::flow::{Analysis, FlowState};
use crate::lattice::DefSet;
use crate::quad::{Quad, QuadId};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ReachingDefs {
    state: FlowState<DefSet>,
    def_sites: BTreeMap<String, BTreeSet<QuadId>>,
}

impl Default for ReachingDefs {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachingDefs {
    pub fn new() -> Self {
        Self {
            state: FlowState::new(DefSet::new()),
            def_sites: BTreeMap::new(),
        }
    }

    /// Every quad defining `register` in the last preprocessed graph.
    pub fn def_sites(&self, register: &str) -> Option<&BTreeSet<QuadId>> {
        self.def_sites.get(register)
    }
}

impl Analysis for ReachingDefs {
    type Lattice = DefSet;

    fn name(&self) -> &'static str {
        "reaching-defs"
    }

    fn is_forward(&self) -> bool {
        true
    }

    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        self.state = FlowState::for_graph(cfg, DefSet::new());
        self.def_sites.clear();
        for quad in cfg.quads() {
            for def in quad.defined_registers() {
                self.def_sites
                    .entry(def.name().to_string())
                    .or_default()
                    .insert(quad.id);
            }
        }
        debug!(
            method = %cfg.method().name,
            registers = self.def_sites.len(),
            "reaching-defs: preprocess"
        );
        Ok(())
    }

    fn process_quad(&mut self, quad: &Quad) -> Result<()> {
        let mut reaching = self.state.get_in(quad.id);
        let defs = quad.defined_registers();
        for def in &defs {
            if let Some(sites) = self.def_sites.get(def.name()) {
                reaching.kill(sites);
            }
        }
        if !defs.is_empty() {
            reaching.insert(quad.id);
        }
        self.state.set_out(quad.id, &reaching);
        Ok(())
    }

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        debug!(method = %cfg.method().name, "reaching-defs: postprocess");
        Ok(())
    }

    fn state(&self) -> &FlowState<DefSet> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FlowState<DefSet> {
        &mut self.state
    }
}
