use super::fixtures::{counting_loop, invoke, new_object, straight};
use crate::analyses::Liveness;
use crate::flow::{Analysis, Solver};
use crate::quad::{Operand, Quad, QuadId};
use pretty_assertions::assert_eq;

#[test]
fn test_liveness_chain() {
    let mut cfg = straight(
        "chain",
        0,
        vec![
            Quad::mov(1, "R0", Operand::IConst(5)),
            Quad::ret(2, Some(Operand::reg("R0"))),
        ],
    );
    let mut solver = Solver::with_analysis(Liveness::new());
    solver.run(&mut cfg).unwrap();
    let liveness = solver.analysis().unwrap();

    assert_eq!(liveness.get_in(QuadId(2)).to_string(), "[R0]");
    assert_eq!(liveness.get_out(QuadId(1)).to_string(), "[R0]");
    assert_eq!(liveness.get_in(QuadId(1)).to_string(), "[]");
    assert_eq!(liveness.get_out(QuadId(2)).to_string(), "[]");
    assert_eq!(liveness.get_entry().to_string(), "[]");
    assert_eq!(liveness.get_exit().to_string(), "[]");
}

#[test]
fn test_liveness_around_loop() {
    let mut cfg = counting_loop();
    let mut solver = Solver::with_analysis(Liveness::new());
    solver.run(&mut cfg).unwrap();
    let liveness = solver.analysis().unwrap();

    assert_eq!(liveness.get_in(QuadId(1)).to_string(), "[]");
    assert_eq!(liveness.get_out(QuadId(1)).to_string(), "[R1]");
    for id in 2..=5 {
        assert_eq!(
            liveness.get_in(QuadId(id)).to_string(),
            "[R1]",
            "R1 should be live into quad {}",
            id
        );
    }
    assert_eq!(liveness.get_out(QuadId(5)).to_string(), "[]");
    assert!(liveness.is_live_out(QuadId(4), "R1"));
}

#[test]
fn test_report_mode_removes_nothing() {
    let mut cfg = straight(
        "unused",
        0,
        vec![
            Quad::mov(1, "R1", Operand::IConst(5)),
            Quad::ret(2, None),
        ],
    );
    let mut solver = Solver::with_analysis(Liveness::new());
    let stats = solver.run(&mut cfg).unwrap();
    assert_eq!(stats.removed, 0);
    assert_eq!(cfg.quad_count(), 2);
}

#[test]
fn test_dead_code_elimination() {
    let mut cfg = straight(
        "dead",
        0,
        vec![
            Quad::mov(1, "R1", Operand::IConst(5)),
            Quad::mov(2, "R2", Operand::IConst(7)),
            invoke(3, "Log.write", vec![Operand::reg("R1")]),
            new_object(4, "R3", "Foo"),
            Quad::ret(5, Some(Operand::reg("R1"))),
        ],
    );
    let mut solver = Solver::with_analysis(Liveness::with_dead_code_elimination());
    let stats = solver.run(&mut cfg).unwrap();

    assert_eq!(stats.removed, 2);
    let dead: Vec<QuadId> = solver
        .analysis()
        .unwrap()
        .dead_quads()
        .iter()
        .copied()
        .collect();
    assert_eq!(dead, vec![QuadId(2), QuadId(4)]);
    assert_eq!(cfg.quad_order(), vec![QuadId(1), QuadId(3), QuadId(5)]);
}

#[test]
fn test_dead_code_elimination_keeps_side_effects() {
    let mut cfg = straight(
        "effects",
        0,
        vec![
            invoke(1, "Foo.run", Vec::new()),
            Quad::null_check(2, "R4"),
            Quad::ret(3, None),
        ],
    );
    let mut solver = Solver::with_analysis(Liveness::with_dead_code_elimination());
    let stats = solver.run(&mut cfg).unwrap();
    assert_eq!(stats.removed, 0);
    assert_eq!(cfg.quad_count(), 3);
}
