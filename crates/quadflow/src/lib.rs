/*! Unified interface for quad dataflow analysis.
 *
 * One import for parsing quad files, solving the bundled analyses, running the optimizer and
 * rendering the results.
 *
 * ```
 * use quadflow::{parse_program, run_analysis, AnalysisKind, Emitter, EmitterConfig, ReportEmitter};
 *
 * let source = "method main(0) static {
 *   entry -> bb2:
 *   bb2 -> exit:
 *     1: MOVE R0, 5
 *     2: RETURN R0
 * }";
 * let mut graphs = parse_program(source).unwrap();
 * let report = run_analysis(AnalysisKind::Liveness, &mut graphs[0]).unwrap();
 * let text = ReportEmitter::new(EmitterConfig::plain()).emit_to_string(&report).unwrap();
 * assert!(text.contains("1 out: [R0]"));
 * ```
 */

pub use quadflow_core as core;
pub use quadflow_emit as emit;
pub use quadflow_parser as parser;

pub use quadflow_core::{
    find_redundant_null_checks, optimize, run_analysis, Analysis, AnalysisKind, ControlFlowGraph,
    DataflowObject, FlowError, FlowReport, OptimizeConfig, Quad, QuadId, Solver,
};

pub use quadflow_emit::{
    Emitter, EmitterConfig, NullCheckEmitter, OptimizeEmitter, OutputFormat, ReportEmitter,
};

pub use quadflow_parser::{parse_file, parse_program, ParseError};
