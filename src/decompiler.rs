//! # Decompiler
//!
//! Rebuilds a flat block chain from a [`Program`]. Repeat blocks are never
//! reconstructed: an unrolled program comes back as repeated literal blocks.

use crate::emit::{degrees_for, DEFAULT_ANGLE_DEGREES, DEFAULT_DISTANCE, DEFAULT_SCALE};
use crate::error::GraphError;
use crate::graph::{
    BlockGraph, BlockKind, ChangeReason, Position, FIELD_AXIS, FIELD_DIRECTION, FIELD_NUM,
    FIELD_RADIANS, FIELD_TYPE, SLOT_ANGLE, SLOT_DISTANCE, SLOT_DURATION, SLOT_SCALE,
};
use crate::program::{AnimationStep, Program, StepFamily};

/// Where the rebuilt Start block is placed.
pub const START_ANCHOR: Position = Position::new(20.0, 20.0);

/// Replace the graph's contents with a chain equivalent to `program`.
///
/// Mutations are tagged [`ChangeReason::Programmatic`]. The tag is advisory;
/// callers that observe the graph must suppress recompilation themselves.
pub fn decompile(graph: &mut BlockGraph, program: &Program) -> Result<(), GraphError> {
    tracing::debug!("[MBGC] Decompiling {} steps", program.len());
    graph.with_origin(ChangeReason::Programmatic, |graph| {
        graph.clear();

        let start = graph.create_block(BlockKind::Start);
        graph.move_block(&start, START_ANCHOR)?;

        let mut previous = start;
        for step in program {
            let block = build_step_block(graph, step)?;
            graph.connect_next(&previous, &block)?;
            previous = block;
        }
        Ok(())
    })
}

fn build_step_block(graph: &mut BlockGraph, step: &AnimationStep) -> Result<String, GraphError> {
    let kind = step.kind();
    let (block_kind, field) = match kind.family() {
        StepFamily::Move => (BlockKind::Move, Some(FIELD_DIRECTION)),
        StepFamily::Rotate => (BlockKind::Rotate, Some(FIELD_AXIS)),
        StepFamily::Scale => (BlockKind::Scale, Some(FIELD_TYPE)),
        StepFamily::Pause => (BlockKind::Pause, None),
    };

    let block = graph.create_block(block_kind);
    if let Some(field) = field {
        graph.set_field(&block, field, kind.as_str())?;
    }

    attach_literal(graph, &block, SLOT_DURATION, step.duration())?;
    match kind.family() {
        StepFamily::Move => {
            let distance = step.distance().unwrap_or(DEFAULT_DISTANCE);
            attach_literal(graph, &block, SLOT_DISTANCE, distance)?;
        }
        StepFamily::Rotate => match step.distance() {
            Some(radians) => {
                graph.set_field(&block, FIELD_RADIANS, radians)?;
                attach_literal(graph, &block, SLOT_ANGLE, degrees_for(radians))?;
            }
            None => attach_literal(graph, &block, SLOT_ANGLE, DEFAULT_ANGLE_DEGREES)?,
        },
        StepFamily::Scale => {
            let scale = step.scale().unwrap_or(DEFAULT_SCALE);
            attach_literal(graph, &block, SLOT_SCALE, scale)?;
        }
        StepFamily::Pause => {}
    }

    Ok(block)
}

fn attach_literal(
    graph: &mut BlockGraph,
    owner: &str,
    slot: &str,
    value: f64,
) -> Result<(), GraphError> {
    let literal = graph.create_block(BlockKind::NumberLiteral);
    graph.set_field(&literal, FIELD_NUM, value)?;
    graph.connect_value(owner, slot, &literal)
}
