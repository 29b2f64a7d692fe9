mod common;

use common::{chain, init_tracing, literal, step_block};
use mbgc::{
    compile, decompile, AnimationStep, BlockGraph, BlockKind, Program, StepFamily, StepKind,
    FIELD_NUM, SLOT_ANGLE, SLOT_DURATION, SLOT_TIMES,
};

fn every_kind_program() -> Program {
    let steps = StepKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let duration = 0.25 + i as f64;
            match kind.family() {
                StepFamily::Move => AnimationStep::movement(*kind, duration, 1.0 + i as f64 * 0.5),
                StepFamily::Rotate => AnimationStep::rotation(*kind, duration, 0.3 * i as f64),
                StepFamily::Scale => AnimationStep::scaling(*kind, duration, 0.8 + i as f64 * 0.1),
                StepFamily::Pause => AnimationStep::pause(duration),
            }
        })
        .collect();
    Program::from_steps(steps)
}

#[test]
fn compile_of_decompile_reproduces_program() {
    init_tracing();
    let program = every_kind_program();
    let mut graph = BlockGraph::new();
    decompile(&mut graph, &program).unwrap();
    let recompiled = compile(&graph);

    assert_eq!(recompiled.kinds(), program.kinds());
    for (original, rebuilt) in program.iter().zip(recompiled.iter()) {
        assert_eq!(original.duration(), rebuilt.duration());
        assert_eq!(original.scale(), rebuilt.scale());
        assert_eq!(original.distance(), rebuilt.distance());
    }
}

#[test]
fn rotate_angle_survives_round_trip_in_degrees() {
    for degrees in [0.0, 15.0, 37.5, 90.0, 180.0, -45.0, 1080.0] {
        let mut graph = BlockGraph::new();
        let start = graph.create_block(BlockKind::Start);
        let rotate = step_block(
            &mut graph,
            BlockKind::Rotate,
            Some("rotateZ"),
            &[(SLOT_ANGLE, degrees)],
        );
        graph.connect_next(&start, &rotate).unwrap();

        let program = compile(&graph);
        let mut rebuilt = BlockGraph::new();
        decompile(&mut rebuilt, &program).unwrap();

        let start = rebuilt.top_blocks()[0];
        let rotate = rebuilt.block(start.next().unwrap()).unwrap();
        let angle = rebuilt
            .block(rotate.value_slot(SLOT_ANGLE).unwrap())
            .unwrap()
            .field(FIELD_NUM)
            .and_then(|field| field.as_finite_number())
            .unwrap();
        assert!((angle - degrees).abs() < 1e-9, "{degrees} came back as {angle}");
    }
}

#[test]
fn decompile_flattens_repeats() {
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let repeat = graph.create_block(BlockKind::Repeat);
    literal(&mut graph, &repeat, SLOT_TIMES, 3.0);
    let pause = step_block(&mut graph, BlockKind::Pause, None, &[(SLOT_DURATION, 0.5)]);
    graph.connect_statement(&repeat, &pause).unwrap();
    let tail = step_block(&mut graph, BlockKind::Move, Some("moveRight"), &[]);
    chain(&mut graph, &start, &[repeat, tail]);

    let program = compile(&graph);
    let mut flat = BlockGraph::new();
    decompile(&mut flat, &program).unwrap();

    assert!(flat.blocks().all(|block| *block.kind() != BlockKind::Repeat));
    let chain_kinds: Vec<BlockKind> = {
        let mut kinds = Vec::new();
        let mut cursor = flat.top_blocks()[0].next().cloned();
        while let Some(id) = cursor {
            let block = flat.block(&id).unwrap();
            kinds.push(block.kind().clone());
            cursor = block.next().cloned();
        }
        kinds
    };
    assert_eq!(
        chain_kinds,
        vec![BlockKind::Pause, BlockKind::Pause, BlockKind::Pause, BlockKind::Move]
    );
    assert!(compile(&flat).same_effect(&program));
}

#[test]
fn decompile_replaces_previous_graph() {
    let mut graph = BlockGraph::new();
    let start = graph.create_block(BlockKind::Start);
    let pause = step_block(&mut graph, BlockKind::Pause, None, &[]);
    graph.connect_next(&start, &pause).unwrap();
    graph.create_block(BlockKind::Custom("note".into()));

    let program = Program::from_steps(vec![AnimationStep::movement(StepKind::MoveUp, 1.0, 4.0)]);
    decompile(&mut graph, &program).unwrap();

    assert_eq!(graph.top_blocks().len(), 1);
    assert!(compile(&graph).same_effect(&program));
}

#[test]
fn host_json_round_trip() {
    let json = r#"[
        {"id": "a", "kind": "moveForward", "duration": 1, "distance": 3},
        {"id": "b", "kind": "rotateX", "duration": 0.5, "distance": 1.5707963267948966},
        {"id": "c", "kind": "scaleDown", "duration": 2, "scale": 0.5},
        {"id": "d", "kind": "pause", "duration": 1}
    ]"#;
    let program = Program::from_json(json).unwrap();
    assert_eq!(program.len(), 4);

    let reparsed = Program::from_json(&program.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, program);
    assert_eq!(reparsed.steps()[0].id(), "a");
}
