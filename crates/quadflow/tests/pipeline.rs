use pretty_assertions::assert_eq;
use quadflow::{
    find_redundant_null_checks, optimize, parse_program, run_analysis, AnalysisKind,
    OptimizeConfig, QuadId,
};

const SOURCE: &str = r"
# R1 is checked twice on the same path
method twice(0) static {
  entry -> bb2:
  bb2 -> exit:
    1: GETSTATIC R1, Foo.bar
    2: NULL_CHECK R1
    3: NULL_CHECK R1
    4: RETURN R1
}
";

#[test]
fn test_parse_then_report_null_checks() {
    let mut graphs = parse_program(SOURCE).unwrap();
    assert_eq!(graphs.len(), 1);

    let report = find_redundant_null_checks(&mut graphs[0]).unwrap();
    assert_eq!(report.to_string(), "twice 3");
}

#[test]
fn test_parse_then_optimize_removes_second_check() {
    let mut graphs = parse_program(SOURCE).unwrap();
    let summary = optimize(&mut graphs[0], &OptimizeConfig::default()).unwrap();

    assert_eq!(summary.total_removed(), 1);
    assert_eq!(summary.passes[0].removed, vec![QuadId(3)]);
    assert!(graphs[0].quad(QuadId(3)).is_none());
    assert!(graphs[0].quad(QuadId(2)).is_some());
}

#[test]
fn test_every_analysis_runs_on_parsed_method() {
    for kind in AnalysisKind::ALL {
        let mut graphs = parse_program(SOURCE).unwrap();
        let report = run_analysis(kind, &mut graphs[0]).unwrap();
        assert_eq!(report.analysis, kind.name());
        assert_eq!(report.nodes.len(), 4);
    }
}

#[test]
fn test_demo_null_checks() {
    let source = include_str!("../../../demos/null_checks.quad");

    let lines: Vec<String> = parse_program(source)
        .unwrap()
        .iter_mut()
        .map(|cfg| find_redundant_null_checks(cfg).unwrap().to_string())
        .collect();
    assert_eq!(lines, vec!["twice 3", "<init>", "guarded"]);

    let removed: Vec<usize> = parse_program(source)
        .unwrap()
        .iter_mut()
        .map(|cfg| optimize(cfg, &OptimizeConfig::full()).unwrap().total_removed())
        .collect();
    assert_eq!(removed, vec![1, 1, 1]);
}

#[test]
fn test_demo_constants_parse() {
    let graphs = parse_program(include_str!("../../../demos/constants.quad")).unwrap();
    let names: Vec<&str> = graphs.iter().map(|g| g.method().name.as_str()).collect();
    assert_eq!(names, vec!["merge", "loop"]);
}
