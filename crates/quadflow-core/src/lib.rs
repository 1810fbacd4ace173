/*! Quad control-flow graphs and an iterative dataflow engine over them.
 *
 * A method body is a graph of basic blocks holding quads. Analyses pair a lattice with a
 * transfer function, and the solver iterates them over every quad until nothing changes.
 * The bundled analyses cover liveness, faintness, reaching definitions, constant
 * propagation and null-check elimination.
 */

pub mod analyses;
pub mod cfg;
pub mod config;
pub mod driver;
pub mod flow;
pub mod lattice;
pub mod quad;
pub mod report;

pub use analyses::{
    ConstantProp, Faintness, Liveness, NullCheckElimination, NullCheckMode, ReachingDefs,
};
pub use cfg::{BasicBlock, BlockId, ControlFlowGraph, MethodInfo, QuadEdges};
pub use config::OptimizeConfig;
pub use driver::{
    find_redundant_null_checks, optimize, run_analysis, AnalysisKind, NullCheckReport,
    OptimizeSummary, PassOutcome,
};
pub use flow::{Analysis, FlowState, SolveStats, Solver};
pub use lattice::{ConstState, ConstantTable, DataflowObject, DefSet, MeetOp, RegisterSet};
pub use quad::{BinaryOp, Condition, Operand, Operator, Quad, QuadId, Register, UnaryOp};
pub use report::{FlowReport, NodeReport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No analysis registered with the solver")]
    NoAnalysisRegistered,
    #[error("Unsupported lattice operation: {op} on {lattice}")]
    UnsupportedLatticeOp {
        op: &'static str,
        lattice: &'static str,
    },
    #[error("Invariant violation at quad {quad}: {message}")]
    InvariantViolation { quad: QuadId, message: String },
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),
    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests;
