use super::fixtures::straight;
use crate::analyses::Faintness;
use crate::flow::{Analysis, Solver};
use crate::quad::{BinaryOp, Operand, Quad, QuadId};
use pretty_assertions::assert_eq;

fn run(result: &str) -> Faintness {
    let mut cfg = straight(
        "faint",
        1,
        vec![
            Quad::mov(1, "R1", Operand::IConst(5)),
            Quad::binary(2, BinaryOp::Add, "R2", Operand::reg("R1"), Operand::reg("R0")),
            Quad::ret(3, Some(Operand::reg(result))),
        ],
    );
    let mut solver = Solver::with_analysis(Faintness::new());
    solver.run(&mut cfg).unwrap();
    solver.take_analysis().unwrap()
}

#[test]
fn test_everything_faint_at_exit() {
    let faintness = run("R0");
    assert_eq!(faintness.get_exit().to_string(), "[R0, R1, R2]");
    assert_eq!(faintness.get_out(QuadId(3)).to_string(), "[R0, R1, R2]");
}

#[test]
fn test_unused_chain_stays_faint() {
    let faintness = run("R0");
    assert_eq!(faintness.get_in(QuadId(3)).to_string(), "[R1, R2]");
    assert_eq!(faintness.get_in(QuadId(2)).to_string(), "[R1, R2]");
    assert_eq!(faintness.get_entry().to_string(), "[R1, R2]");
}

#[test]
fn test_used_result_makes_operands_live() {
    let faintness = run("R2");
    assert_eq!(faintness.get_in(QuadId(3)).to_string(), "[R0, R1]");
    assert_eq!(faintness.get_in(QuadId(2)).to_string(), "[R2]");
    assert_eq!(faintness.get_in(QuadId(1)).to_string(), "[R1, R2]");
    assert_eq!(faintness.get_entry().to_string(), "[R1, R2]");
}
