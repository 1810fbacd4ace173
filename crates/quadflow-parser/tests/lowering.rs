use pretty_assertions::assert_eq;
use quadflow_core::{BlockId, Operand, Operator, QuadId, Register};
use quadflow_parser::{check, parse_program, ParseError};

const TWO_METHODS: &str = r"
# two small methods
method first(2) static {
  entry -> bb2:
  bb2 -> bb3, exit:
    1: MOVE R2, 5
    2: IFCMP_EQ R2, null, exit
  bb3 -> exit:
    3: RETURN R2
}

method <init>(1) {
  entry -> bb2:
  bb2 -> exit:
    1: NULL_CHECK T0, R0      // guarded check
    2: INVOKE void, java.lang.Object.<init>, R0
    3: RETURN
}
";

#[test]
fn test_parses_every_method() {
    let graphs = parse_program(TWO_METHODS).unwrap();
    assert_eq!(graphs.len(), 2);

    let first = &graphs[0];
    assert_eq!(first.method().name, "first");
    assert_eq!(first.method().param_count, 2);
    assert!(first.method().is_static);
    assert_eq!(first.quad_order(), vec![QuadId(1), QuadId(2), QuadId(3)]);
    assert_eq!(first.fallthrough_successor(BlockId(2)), Some(BlockId(3)));
    assert_eq!(first.successors(BlockId(2)), &[BlockId(3), BlockId::EXIT]);

    let init = &graphs[1];
    assert_eq!(init.method().name, "<init>");
    assert!(!init.method().is_static);
}

#[test]
fn test_operands_lowered() {
    let graphs = parse_program(TWO_METHODS).unwrap();
    let branch = graphs[0].quad(QuadId(2)).unwrap();
    assert_eq!(branch.to_string(), "2: IFCMP_EQ R2, null, exit");

    let check = graphs[1].quad(QuadId(1)).unwrap();
    assert_eq!(
        check.operator,
        Operator::NullCheck {
            guard: Some(Register::new("T0")),
            src: Operand::reg("R0"),
        }
    );

    let call = graphs[1].quad(QuadId(2)).unwrap();
    assert_eq!(
        call.operator,
        Operator::Invoke {
            dest: None,
            method: "java.lang.Object.<init>".to_string(),
            args: vec![Operand::reg("R0")],
        }
    );
}

#[test]
fn test_quad_edges_follow_blocks() {
    let graphs = parse_program(TWO_METHODS).unwrap();
    let edges = graphs[0].quad_edges();
    assert_eq!(edges.successors(QuadId(2)), &[Some(QuadId(3)), None]);
    assert_eq!(edges.predecessors(QuadId(1)), &[None]);
}

#[test]
fn test_jump_target_becomes_edge() {
    let input = r"
method spin(0) static {
  entry -> bb2:
  bb2:
    1: GOTO bb3
  bb3 -> exit:
    2: RETURN
}
";
    let graphs = parse_program(input).unwrap();
    assert_eq!(graphs[0].successors(BlockId(2)), &[BlockId(3)]);
}

#[test]
fn test_negative_integers() {
    let input = r"
method neg(0) static {
  entry -> bb2:
  bb2 -> exit:
    1: ADD R1, R1, -3
}
";
    let graphs = parse_program(input).unwrap();
    let quad = graphs[0].quad(QuadId(1)).unwrap();
    assert_eq!(quad.to_string(), "1: ADD R1, R1, -3");
}

#[test]
fn test_unknown_opcode() {
    let input = "method f(0) static { entry -> bb2: bb2 -> exit: 1: FROB R1 }";
    assert!(check(input), "unknown opcodes are a semantic error, not a syntax error");
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::UnknownOpcode { ref opcode, .. } if opcode == "FROB"));
}

#[test]
fn test_bad_operands() {
    let input = "method f(0) static { entry -> bb2: bb2 -> exit: 1: MOVE 5, R1 }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::BadOperands { ref opcode, .. } if opcode == "MOVE"));

    let input = "method f(0) static { entry -> bb2: bb2 -> exit: 1: ADD R1, R2 }";
    let err = parse_program(input).unwrap_err();
    assert_eq!(err.to_string(), "Line 1: ADD takes 3 operands, found 2");
}

#[test]
fn test_undeclared_block() {
    let input = "method f(0) static { entry -> bb2: bb2 -> bb9: 1: RETURN }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::UnknownBlock { ref block, .. } if block == "bb9"));
}

#[test]
fn test_duplicate_quad_id() {
    let input = "method f(0) static { entry -> bb2: bb2 -> exit: 1: NOP 1: NOP }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::DuplicateQuad { id: 1, .. }));
}

#[test]
fn test_duplicate_block() {
    let input = "method f(0) static { entry -> bb2: bb2: bb2 -> exit: }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::DuplicateBlock { .. }));
}

#[test]
fn test_quads_in_pseudo_blocks_rejected() {
    let input = "method f(0) static { entry -> exit: 1: NOP }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::Graph { .. }));
}

#[test]
fn test_integer_out_of_range() {
    let input = "method f(0) static { entry -> bb2: bb2 -> exit: 1: MOVE R1, 99999999999 }";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumber { .. }));
}

#[test]
fn test_syntax_error() {
    let err = parse_program("method f(0) static { entry -> bb2 ").unwrap_err();
    assert!(matches!(err, ParseError::Syntax(_)));
}

#[test]
fn test_conditional_branch_needs_fallthrough() {
    let input = r"
method f(1) static {
  entry -> bb2:
  bb2:
    1: IFCMP_EQ R0, null, bb3
  bb3 -> exit:
    2: NULL_CHECK R0
    3: RETURN R0
}
";
    let err = parse_program(input).unwrap_err();
    assert!(matches!(
        &err,
        ParseError::MissingFallthrough { block, .. } if block == "bb2"
    ));
}
