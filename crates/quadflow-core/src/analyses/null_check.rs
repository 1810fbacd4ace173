use crate::cfg::ControlFlowGraph;
use crate::flow::{Analysis, FlowState};
use crate::lattice::{MeetOp, RegisterSet};
use crate::quad::{Condition, Operand, Operator, Quad, QuadId, Register};
use crate::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullCheckMode {
    /// Schedule redundant checks for removal instead of only reporting them.
    pub remove: bool,
    /// Also learn non-nullness from the receiver, allocations, copies and null branches.
    pub extended: bool,
}

impl NullCheckMode {
    pub fn report() -> Self {
        Self::default()
    }

    pub fn remove() -> Self {
        Self {
            remove: true,
            extended: false,
        }
    }

    pub fn extended_remove() -> Self {
        Self {
            remove: true,
            extended: true,
        }
    }
}

/// Forward must-analysis of registers already null-checked on every path.
#[derive(Debug, Clone)]
pub struct NullCheckElimination {
    state: FlowState<RegisterSet>,
    mode: NullCheckMode,
    receiver: Option<String>,
    redundant: BTreeSet<QuadId>,
    branch_facts: BTreeMap<QuadId, Vec<String>>,
}

impl NullCheckElimination {
    pub fn new(mode: NullCheckMode) -> Self {
        Self {
            state: FlowState::new(RegisterSet::empty(Arc::default(), MeetOp::Intersection)),
            mode,
            receiver: None,
            redundant: BTreeSet::new(),
            branch_facts: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> NullCheckMode {
        self.mode
    }

    pub fn redundant_checks(&self) -> &BTreeSet<QuadId> {
        &self.redundant
    }

    /// `IFCMP_EQ r, null` proves `r` non-null on the fallthrough arm, `IFCMP_NE` on the
    /// taken arm. The fact is attached to that arm's first quad when the arm differs
    /// from the other one and can only be entered from the branch block.
    fn collect_branch_facts(&mut self, cfg: &ControlFlowGraph) {
        for block in cfg.blocks() {
            let Some(last) = block.last_quad() else {
                continue;
            };
            let Operator::IfCmp {
                cond,
                left,
                right,
                target,
            } = &last.operator
            else {
                continue;
            };
            let compared = match (left, right) {
                (Operand::Reg(reg), Operand::Null) | (Operand::Null, Operand::Reg(reg)) => reg,
                _ => continue,
            };
            let fallthrough = cfg.fallthrough_successor(block.id);
            // Both outcomes land in the same block, so it learns nothing.
            if fallthrough == Some(*target) {
                continue;
            }
            let non_null_arm = match cond {
                Condition::Eq => fallthrough,
                Condition::Ne => fallthrough.map(|_| *target),
                _ => None,
            };
            let Some(arm) = non_null_arm else {
                continue;
            };
            if cfg.predecessors(arm) != [block.id] {
                continue;
            }
            if let Some(first) = cfg.block(arm).and_then(|b| b.first_quad()) {
                self.branch_facts
                    .entry(first.id)
                    .or_default()
                    .push(compared.name().to_string());
            }
        }
    }

    fn checked_register(quad: &Quad, src: &Operand) -> Result<Register> {
        src.as_register()
            .cloned()
            .ok_or_else(|| FlowError::InvariantViolation {
                quad: quad.id,
                message: format!("NULL_CHECK on non-register operand {}", src),
            })
    }
}

impl Analysis for NullCheckElimination {
    type Lattice = RegisterSet;

    fn name(&self) -> &'static str {
        "null-check"
    }

    fn is_forward(&self) -> bool {
        true
    }

    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        let universe = Arc::new(cfg.register_universe());
        let top = RegisterSet::top(universe.clone(), MeetOp::Intersection);
        self.state = FlowState::for_graph(cfg, top);
        self.state
            .set_entry(&RegisterSet::empty(universe, MeetOp::Intersection));

        self.redundant.clear();
        self.branch_facts.clear();
        self.receiver = (!cfg.method().is_static).then(|| Register::param(0).0);
        if self.mode.extended {
            self.collect_branch_facts(cfg);
        }
        debug!(
            method = %cfg.method().name,
            extended = self.mode.extended,
            branch_facts = self.branch_facts.len(),
            "null-check: preprocess"
        );
        Ok(())
    }

    fn process_quad(&mut self, quad: &Quad) -> Result<()> {
        let mut checked = self.state.get_in(quad.id);
        for def in quad.defined_registers() {
            checked.remove(def.name());
        }

        if self.mode.extended {
            if let Some(receiver) = &self.receiver {
                checked.insert(receiver);
            }
            match &quad.operator {
                Operator::New { dest, .. } | Operator::NewArray { dest, .. } => {
                    checked.insert(dest.name());
                }
                Operator::Move {
                    dest,
                    src: Operand::Reg(src),
                } if checked.contains(src.name()) => {
                    checked.insert(dest.name());
                }
                _ => {}
            }
            if let Some(facts) = self.branch_facts.get(&quad.id) {
                for reg in facts {
                    checked.insert(reg);
                }
            }
        }

        if let Operator::NullCheck { src, .. } = &quad.operator {
            let reg = Self::checked_register(quad, src)?;
            if checked.contains(reg.name()) {
                self.redundant.insert(quad.id);
            } else {
                self.redundant.remove(&quad.id);
            }
            checked.insert(reg.name());
        }

        self.state.set_out(quad.id, &checked);
        Ok(())
    }

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        debug!(
            method = %cfg.method().name,
            redundant = ?self.redundant,
            remove = self.mode.remove,
            "null-check: postprocess"
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
        if self.mode.remove {
            self.redundant.iter().copied().collect()
        } else {
            Vec::new()
        }
    }
}
