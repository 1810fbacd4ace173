use crate::cfg::ControlFlowGraph;
use crate::lattice::DataflowObject;
use crate::quad::QuadId;
use crate::report::{FlowReport, NodeReport};

/// Per-graph IN/OUT storage indexed by quad id.
#[derive(Debug, Clone)]
pub struct FlowState<L> {
    top: L,
    ins: Vec<L>,
    outs: Vec<L>,
    entry: L,
    exit: L,
    present: Vec<QuadId>,
}

impl<L: DataflowObject> FlowState<L> {
    /// Storage for no graph at all; analyses start here before their first preprocess.
    pub fn new(top: L) -> Self {
        Self {
            ins: Vec::new(),
            outs: Vec::new(),
            entry: top.clone(),
            exit: top.clone(),
            present: Vec::new(),
            top,
        }
    }

    pub fn for_graph(cfg: &ControlFlowGraph, top: L) -> Self {
        let slots = cfg.max_quad_id().map(|id| id.index() + 1).unwrap_or(0);
        let mut present = cfg.quad_order();
        present.sort();
        Self {
            ins: vec![top.clone(); slots],
            outs: vec![top.clone(); slots],
            entry: top.clone(),
            exit: top.clone(),
            present,
            top,
        }
    }

    pub fn top(&self) -> L {
        self.top.clone()
    }

    pub fn entry(&self) -> L {
        self.entry.clone()
    }

    pub fn exit(&self) -> L {
        self.exit.clone()
    }

    pub fn set_entry(&mut self, value: &L) {
        self.entry.copy_from(value);
    }

    pub fn set_exit(&mut self, value: &L) {
        self.exit.copy_from(value);
    }

    pub fn get_in(&self, id: QuadId) -> L {
        self.ins.get(id.index()).unwrap_or(&self.top).clone()
    }

    pub fn get_out(&self, id: QuadId) -> L {
        self.outs.get(id.index()).unwrap_or(&self.top).clone()
    }

    pub fn in_ref(&self, id: QuadId) -> Option<&L> {
        self.ins.get(id.index())
    }

    pub fn out_ref(&self, id: QuadId) -> Option<&L> {
        self.outs.get(id.index())
    }

    pub fn set_in(&mut self, id: QuadId, value: &L) {
        Self::slot(&mut self.ins, &self.top, id).copy_from(value);
    }

    pub fn set_out(&mut self, id: QuadId, value: &L) {
        Self::slot(&mut self.outs, &self.top, id).copy_from(value);
    }

    fn slot<'a>(slots: &'a mut Vec<L>, top: &L, id: QuadId) -> &'a mut L {
        if slots.len() <= id.index() {
            slots.resize(id.index() + 1, top.clone());
        }
        &mut slots[id.index()]
    }

    /// Ids of the quads the storage was built for, ascending.
    pub fn ids(&self) -> &[QuadId] {
        &self.present
    }

    pub fn report(&self, analysis: &str, method: &str) -> FlowReport {
        FlowReport {
            analysis: analysis.to_string(),
            method: method.to_string(),
            entry: self.entry.to_string(),
            nodes: self
                .present
                .iter()
                .map(|id| NodeReport {
                    id: *id,
                    input: self.get_in(*id).to_string(),
                    output: self.get_out(*id).to_string(),
                })
                .collect(),
            exit: self.exit.to_string(),
            removed: Vec::new(),
        }
    }
}
