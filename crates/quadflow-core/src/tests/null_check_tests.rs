use super::fixtures::{build, get_static, if_cmp, new_object, static_method, straight};
use crate::analyses::{NullCheckElimination, NullCheckMode};
use crate::cfg::{BlockId, ControlFlowGraph, MethodInfo};
use crate::flow::{Analysis, Solver};
use crate::quad::{Condition, Operand, Operator, Quad, QuadId, Register};
use crate::FlowError;
use pretty_assertions::assert_eq;

fn redundant(cfg: &mut ControlFlowGraph, mode: NullCheckMode) -> Vec<u32> {
    let mut solver = Solver::with_analysis(NullCheckElimination::new(mode));
    solver.run(cfg).unwrap();
    solver
        .analysis()
        .unwrap()
        .redundant_checks()
        .iter()
        .map(|id| id.0)
        .collect()
}

fn get_field(id: u32, dest: &str, object: &str) -> Quad {
    Quad::new(
        id,
        Operator::GetField {
            dest: Register::new(dest),
            object: Operand::reg(object),
            field: "Node.next".to_string(),
        },
    )
}

#[test]
fn test_repeated_check_is_redundant() {
    let mut cfg = straight(
        "f",
        1,
        vec![
            Quad::null_check(1, "R0"),
            get_field(2, "R1", "R0"),
            Quad::null_check(3, "R0"),
            Quad::ret(4, Some(Operand::reg("R1"))),
        ],
    );
    assert_eq!(redundant(&mut cfg, NullCheckMode::report()), vec![3]);
    assert_eq!(cfg.quad_count(), 4);
}

#[test]
fn test_redefinition_kills_fact() {
    let mut cfg = straight(
        "g",
        1,
        vec![
            Quad::null_check(1, "R0"),
            Quad::mov(2, "R0", Operand::Null),
            Quad::null_check(3, "R0"),
        ],
    );
    assert!(redundant(&mut cfg, NullCheckMode::report()).is_empty());
}

fn one_armed(check_before_branch: bool) -> ControlFlowGraph {
    let mut head = Vec::new();
    if check_before_branch {
        head.push(Quad::null_check(10, "R0"));
    }
    head.push(get_static(1, "T0", "Flags.on"));
    head.push(if_cmp(
        2,
        Condition::Eq,
        Operand::reg("T0"),
        Operand::IConst(0),
        BlockId(4),
    ));
    build(
        static_method("arm", 1),
        vec![
            head,
            vec![Quad::null_check(3, "R0")],
            vec![Quad::null_check(4, "R0"), Quad::ret(5, None)],
        ],
        &[(2, 3), (2, 4), (3, 4), (4, 1)],
    )
}

#[test]
fn test_fact_must_hold_on_every_path() {
    let mut cfg = one_armed(false);
    assert!(redundant(&mut cfg, NullCheckMode::report()).is_empty());

    let mut cfg = one_armed(true);
    assert_eq!(redundant(&mut cfg, NullCheckMode::report()), vec![3, 4]);
}

#[test]
fn test_entry_knows_nothing() {
    let mut cfg = straight("h", 1, vec![Quad::null_check(1, "R0")]);
    let mut solver = Solver::with_analysis(NullCheckElimination::new(NullCheckMode::report()));
    solver.run(&mut cfg).unwrap();
    let analysis = solver.analysis().unwrap();
    assert_eq!(analysis.get_entry().to_string(), "[]");
    assert_eq!(analysis.get_in(QuadId(1)).to_string(), "[]");
    assert_eq!(analysis.get_out(QuadId(1)).to_string(), "[R0]");
    assert_eq!(analysis.get_exit().to_string(), "[R0]");
}

#[test]
fn test_remove_mode_deletes_checks() {
    let mut cfg = straight(
        "f",
        1,
        vec![
            Quad::null_check(1, "R0"),
            Quad::null_check(2, "R0"),
            Quad::ret(3, None),
        ],
    );
    let mut solver = Solver::with_analysis(NullCheckElimination::new(NullCheckMode::remove()));
    let stats = solver.run(&mut cfg).unwrap();
    assert_eq!(stats.removed, 1);
    assert_eq!(cfg.quad_order(), vec![QuadId(1), QuadId(3)]);
}

#[test]
fn test_receiver_is_non_null_in_extended_mode() {
    let method = MethodInfo::new("instance", 1);
    let quads = vec![Quad::null_check(1, "R0"), Quad::ret(2, None)];

    let mut cfg = ControlFlowGraph::straight_line(method.clone(), quads.clone()).unwrap();
    assert!(redundant(&mut cfg, NullCheckMode::report()).is_empty());

    let mut cfg = ControlFlowGraph::straight_line(method, quads).unwrap();
    let extended = NullCheckMode {
        remove: false,
        extended: true,
    };
    assert_eq!(redundant(&mut cfg, extended), vec![1]);

    let mut cfg = ControlFlowGraph::straight_line(
        static_method("static", 1),
        vec![Quad::null_check(1, "R0")],
    )
    .unwrap();
    assert!(redundant(&mut cfg, extended).is_empty());
}

#[test]
fn test_allocations_and_copies_are_non_null() {
    let mut cfg = straight(
        "alloc",
        0,
        vec![
            new_object(1, "R1", "Foo"),
            Quad::mov(2, "R2", Operand::reg("R1")),
            Quad::null_check(3, "R2"),
            Quad::null_check(4, "R1"),
        ],
    );
    let extended = NullCheckMode {
        remove: false,
        extended: true,
    };
    assert_eq!(redundant(&mut cfg, extended), vec![3, 4]);

    let mut plain = straight(
        "alloc",
        0,
        vec![new_object(1, "R1", "Foo"), Quad::null_check(2, "R1")],
    );
    assert!(redundant(&mut plain, NullCheckMode::report()).is_empty());
}

fn null_branch(cond: Condition, extra_pred: bool) -> ControlFlowGraph {
    let mut edges = vec![(2, 3), (2, 4), (3, 1), (4, 1)];
    let mut bodies = vec![
        vec![if_cmp(1, cond, Operand::reg("R0"), Operand::Null, BlockId(4))],
        vec![Quad::null_check(2, "R0"), Quad::ret(3, None)],
        vec![Quad::null_check(4, "R0"), Quad::ret(5, None)],
    ];
    if extra_pred {
        bodies.push(vec![Quad::new(6, Operator::Goto { target: BlockId(3) })]);
        edges.push((5, 3));
    }
    build(static_method("branch", 1), bodies, &edges)
}

#[test]
fn test_branch_against_null_implies_non_null() {
    let extended = NullCheckMode {
        remove: false,
        extended: true,
    };

    let mut cfg = null_branch(Condition::Eq, false);
    assert_eq!(redundant(&mut cfg, extended), vec![2]);

    let mut cfg = null_branch(Condition::Ne, false);
    assert_eq!(redundant(&mut cfg, extended), vec![4]);

    let mut cfg = null_branch(Condition::Eq, false);
    assert!(redundant(&mut cfg, NullCheckMode::report()).is_empty());
}

#[test]
fn test_branch_fact_needs_single_predecessor() {
    let extended = NullCheckMode {
        remove: false,
        extended: true,
    };
    let mut cfg = null_branch(Condition::Eq, true);
    assert!(redundant(&mut cfg, extended).is_empty());
}

#[test]
fn test_branch_with_one_destination_proves_nothing() {
    let extended = NullCheckMode {
        remove: true,
        extended: true,
    };
    for cond in [Condition::Eq, Condition::Ne] {
        let mut cfg = build(
            static_method("same_arm", 1),
            vec![
                vec![if_cmp(1, cond, Operand::reg("R0"), Operand::Null, BlockId(3))],
                vec![Quad::null_check(2, "R0"), Quad::ret(3, Some(Operand::reg("R0")))],
            ],
            &[(2, 3), (3, 1)],
        );
        assert!(redundant(&mut cfg, extended).is_empty());
        assert!(cfg.quad(QuadId(2)).is_some());
    }
}

#[test]
fn test_check_on_constant_is_an_invariant_violation() {
    let mut cfg = straight(
        "bad",
        0,
        vec![Quad::new(
            1,
            Operator::NullCheck {
                guard: None,
                src: Operand::Null,
            },
        )],
    );
    let mut solver = Solver::with_analysis(NullCheckElimination::new(NullCheckMode::report()));
    let err = solver.run(&mut cfg).unwrap_err();
    assert!(matches!(err, FlowError::InvariantViolation { .. }));
}
