mod common;

use common::{chain, init_tracing, literal, step_block};
use mbgc::{
    compile, compile_with_options, BlockGraph, BlockKind, CompileOptions, CompileWarning,
    StepKind, SLOT_ANGLE, SLOT_DISTANCE, SLOT_DURATION, SLOT_SCALE, SLOT_TIMES,
};
use std::f64::consts::PI;

#[test]
fn move_rotate_scale_scenario() {
    init_tracing();
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let moved = step_block(
        &mut graph,
        BlockKind::Move,
        Some("moveUp"),
        &[(SLOT_DISTANCE, 2.0), (SLOT_DURATION, 1.0)],
    );
    let rotated = step_block(
        &mut graph,
        BlockKind::Rotate,
        Some("rotateY"),
        &[(SLOT_ANGLE, 180.0), (SLOT_DURATION, 2.0)],
    );
    let scaled = step_block(
        &mut graph,
        BlockKind::Scale,
        Some("scaleUp"),
        &[(SLOT_SCALE, 1.5), (SLOT_DURATION, 1.0)],
    );
    chain(&mut graph, &start, &[moved, rotated, scaled]);

    let program = compile(&graph);
    let steps = program.steps();
    assert_eq!(
        program.kinds(),
        vec![StepKind::MoveUp, StepKind::RotateY, StepKind::ScaleUp]
    );

    assert_eq!(steps[0].duration(), 1.0);
    assert_eq!(steps[0].distance(), Some(2.0));
    assert_eq!(steps[0].scale(), None);

    assert_eq!(steps[1].duration(), 2.0);
    assert!((steps[1].distance().unwrap() - PI).abs() < 1e-12);
    assert_eq!(steps[1].scale(), None);

    assert_eq!(steps[2].duration(), 1.0);
    assert_eq!(steps[2].distance(), None);
    assert_eq!(steps[2].scale(), Some(1.5));
}

#[test]
fn repeat_of_pause_scenario() {
    init_tracing();
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let repeat = graph.create_block(BlockKind::Repeat);
    literal(&mut graph, &repeat, SLOT_TIMES, 3.0);
    let pause = step_block(&mut graph, BlockKind::Pause, None, &[(SLOT_DURATION, 1.0)]);
    graph.connect_statement(&repeat, &pause).unwrap();
    graph.connect_next(&start, &repeat).unwrap();

    let program = compile(&graph);
    assert_eq!(program.kinds(), vec![StepKind::Pause; 3]);
    assert!(program.iter().all(|step| step.duration() == 1.0));
}

#[test]
fn graph_without_start_compiles_to_nothing() {
    let mut graph = BlockGraph::new();
    let moved = step_block(&mut graph, BlockKind::Move, Some("moveDown"), &[]);
    let repeat = graph.create_block(BlockKind::Repeat);
    graph.connect_next(&moved, &repeat).unwrap();

    assert!(compile(&graph).is_empty());
}

#[test]
fn repeat_emits_body_n_times_in_order() {
    init_tracing();
    for times in [0.0, 1.0, 2.0, 4.0] {
        let mut graph = BlockGraph::new();
        let start = graph.create_block(BlockKind::Start);
        let before = step_block(&mut graph, BlockKind::Pause, None, &[(SLOT_DURATION, 9.0)]);
        let repeat = graph.create_block(BlockKind::Repeat);
        literal(&mut graph, &repeat, SLOT_TIMES, times);
        let left = step_block(&mut graph, BlockKind::Move, Some("moveLeft"), &[]);
        let spin = step_block(&mut graph, BlockKind::Rotate, Some("rotateX"), &[]);
        graph.connect_statement(&repeat, &left).unwrap();
        graph.connect_next(&left, &spin).unwrap();
        let after = step_block(&mut graph, BlockKind::Scale, Some("scaleDown"), &[]);
        chain(&mut graph, &start, &[before, repeat, after]);

        let program = compile(&graph);
        let mut expected = vec![StepKind::Pause];
        for _ in 0..times as usize {
            expected.extend([StepKind::MoveLeft, StepKind::RotateX]);
        }
        expected.push(StepKind::ScaleDown);
        assert_eq!(program.kinds(), expected, "times = {times}");
    }
}

#[test]
fn nested_repeats_multiply() {
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let outer = graph.create_block(BlockKind::Repeat);
    literal(&mut graph, &outer, SLOT_TIMES, 2.0);
    let inner = graph.create_block(BlockKind::Repeat);
    literal(&mut graph, &inner, SLOT_TIMES, 3.0);
    let pause = step_block(&mut graph, BlockKind::Pause, None, &[]);
    let up = step_block(&mut graph, BlockKind::Move, Some("moveUp"), &[]);

    graph.connect_statement(&inner, &pause).unwrap();
    graph.connect_statement(&outer, &inner).unwrap();
    graph.connect_next(&inner, &up).unwrap();
    graph.connect_next(&start, &outer).unwrap();

    let program = compile(&graph);
    let mut expected = Vec::new();
    for _ in 0..2 {
        expected.extend([StepKind::Pause; 3]);
        expected.push(StepKind::MoveUp);
    }
    assert_eq!(program.kinds(), expected);

    let mut ids: Vec<&str> = program.iter().map(|step| step.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), program.len());
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    init_tracing();
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let rotate = step_block(&mut graph, BlockKind::Rotate, Some("rotateX"), &[]);
    let bad = graph.create_block(BlockKind::NumberLiteral);
    graph.set_field(&bad, mbgc::FIELD_NUM, "ninety").unwrap();
    graph.connect_value(&rotate, SLOT_ANGLE, &bad).unwrap();
    let wrong_child = graph.create_block(BlockKind::Pause);
    graph.connect_value(&rotate, SLOT_DURATION, &wrong_child).unwrap();
    graph.connect_next(&start, &rotate).unwrap();

    let compilation = compile_with_options(&graph, &CompileOptions::default());
    let step = &compilation.program.steps()[0];
    assert_eq!(step.duration(), 1.0);
    assert!((step.distance().unwrap() - PI / 2.0).abs() < 1e-12);
    assert_eq!(
        compilation
            .warnings
            .iter()
            .filter(|w| matches!(w, CompileWarning::MalformedValue { .. }))
            .count(),
        2
    );
}

#[test]
fn unknown_blocks_do_not_abort_compilation() {
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let first = step_block(&mut graph, BlockKind::Pause, None, &[(SLOT_DURATION, 0.5)]);
    let custom = graph.create_block(BlockKind::Custom("play_sound".into()));
    let stray_literal = graph.create_block(BlockKind::NumberLiteral);
    let last = step_block(&mut graph, BlockKind::Move, Some("moveBackward"), &[]);
    chain(&mut graph, &start, &[first, custom, stray_literal, last]);

    let compilation = compile_with_options(&graph, &CompileOptions::default());
    assert_eq!(
        compilation.program.kinds(),
        vec![StepKind::Pause, StepKind::MoveBackward]
    );
    assert!(compilation
        .warnings
        .iter()
        .any(|w| matches!(w, CompileWarning::UnknownBlockKind { kind, .. } if kind == "play_sound")));
    assert!(compilation
        .warnings
        .iter()
        .any(|w| matches!(w, CompileWarning::UnexpectedBlock { .. })));
}

#[test]
fn compilation_is_deterministic_up_to_ids() {
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let repeat = graph.create_block(BlockKind::Repeat);
    literal(&mut graph, &repeat, SLOT_TIMES, 2.0);
    let body = step_block(&mut graph, BlockKind::Scale, Some("scaleUp"), &[(SLOT_SCALE, 2.0)]);
    graph.connect_statement(&repeat, &body).unwrap();
    graph.connect_next(&start, &repeat).unwrap();

    let first = compile(&graph);
    let second = compile(&graph);
    assert!(first.same_effect(&second));
    assert_ne!(first, second);
}
