use crate::cfg::ControlFlowGraph;
use crate::flow::{Analysis, FlowState};
use crate::lattice::{ConstState, ConstantTable};
use crate::quad::{BinaryOp, Operand, Operator, Quad, UnaryOp};
use crate::{FlowError, Result};
use tracing::debug;

/// Forward constant propagation over 32-bit integer registers. Parameters enter the
/// method as NAC.
#[derive(Debug, Clone)]
pub struct ConstantProp {
    state: FlowState<ConstantTable>,
}

impl Default for ConstantProp {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantProp {
    pub fn new() -> Self {
        Self {
            state: FlowState::new(ConstantTable::default()),
        }
    }

    /// `None` for operands that are neither registers nor integer constants.
    fn lookup(table: &ConstantTable, operand: &Operand) -> Option<ConstState> {
        match operand {
            Operand::Reg(reg) => Some(table.get(reg.name())),
            Operand::IConst(value) => Some(ConstState::Const(*value)),
            Operand::Null | Operand::Symbol(_) => None,
        }
    }

    fn fold(op: BinaryOp, lhs: i32, rhs: i32) -> i32 {
        match op {
            BinaryOp::Add => lhs.wrapping_add(rhs),
            BinaryOp::Sub => lhs.wrapping_sub(rhs),
            _ => lhs.wrapping_mul(rhs),
        }
    }

    fn eval_binary(
        quad: &Quad,
        table: &ConstantTable,
        op: BinaryOp,
        left: &Operand,
        right: &Operand,
    ) -> Result<ConstState> {
        if !matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul) {
            return Ok(ConstState::Nac);
        }
        let (Some(lhs), Some(rhs)) = (Self::lookup(table, left), Self::lookup(table, right))
        else {
            return Err(FlowError::InvariantViolation {
                quad: quad.id,
                message: format!("{} expects integer operands", op.mnemonic()),
            });
        };
        let state = match (lhs, rhs) {
            (ConstState::Nac, _) | (_, ConstState::Nac) => ConstState::Nac,
            (ConstState::Undef, _) | (_, ConstState::Undef) => ConstState::Undef,
            (ConstState::Const(a), ConstState::Const(b)) => ConstState::Const(Self::fold(op, a, b)),
        };
        Ok(state)
    }

    fn transfer(quad: &Quad, table: &mut ConstantTable) -> Result<()> {
        match &quad.operator {
            Operator::Move { dest, src } => {
                let state = Self::lookup(table, src).unwrap_or(ConstState::Nac);
                table.set(dest.name(), state);
            }
            Operator::Binary {
                op,
                dest,
                left,
                right,
            } => {
                let state = Self::eval_binary(quad, table, *op, left, right)?;
                table.set(dest.name(), state);
            }
            Operator::Unary {
                op: UnaryOp::Neg,
                dest,
                src,
            } => {
                let state = match Self::lookup(table, src) {
                    Some(ConstState::Undef) => ConstState::Undef,
                    Some(ConstState::Const(v)) => ConstState::Const(v.wrapping_neg()),
                    _ => ConstState::Nac,
                };
                table.set(dest.name(), state);
            }
            other => {
                for def in other.defined_registers() {
                    table.set(def.name(), ConstState::Nac);
                }
            }
        }
        Ok(())
    }
}

impl Analysis for ConstantProp {
    type Lattice = ConstantTable;

    fn name(&self) -> &'static str {
        "constant-prop"
    }

    fn is_forward(&self) -> bool {
        true
    }

    fn preprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        let universe = cfg.register_universe();
        let top = ConstantTable::undefined(&universe);
        let mut entry = top.clone();
        for param in cfg.method().param_registers() {
            entry.set(param.name(), ConstState::Nac);
        }
        self.state = FlowState::for_graph(cfg, top);
        self.state.set_entry(&entry);
        debug!(
            method = %cfg.method().name,
            registers = universe.len(),
            "constant-prop: preprocess"
        );
        Ok(())
    }

    fn process_quad(&mut self, quad: &Quad) -> Result<()> {
        let mut table = self.state.get_in(quad.id);
        Self::transfer(quad, &mut table)?;
        self.state.set_out(quad.id, &table);
        Ok(())
    }

    fn postprocess(&mut self, cfg: &ControlFlowGraph) -> Result<()> {
        debug!(method = %cfg.method().name, "constant-prop: postprocess");
        Ok(())
    }

    fn state(&self) -> &FlowState<ConstantTable> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FlowState<ConstantTable> {
        &mut self.state
    }
}
