#![allow(dead_code)]

use mbgc::{BlockGraph, BlockId, BlockKind, FIELD_AXIS, FIELD_DIRECTION, FIELD_NUM, FIELD_TYPE};

pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "mbgc=debug".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn literal(graph: &mut BlockGraph, owner: &str, slot: &str, value: f64) -> BlockId {
    let num = graph.create_block(BlockKind::NumberLiteral);
    graph.set_field(&num, FIELD_NUM, value).unwrap();
    graph.connect_value(owner, slot, &num).unwrap();
    num
}

/// Create a Move/Rotate/Scale/Pause block with its discrete field and numeric slots.
pub fn step_block(
    graph: &mut BlockGraph,
    kind: BlockKind,
    tag: Option<&str>,
    slots: &[(&str, f64)],
) -> BlockId {
    let block = graph.create_block(kind.clone());
    if let Some(tag) = tag {
        let field = match kind {
            BlockKind::Move => FIELD_DIRECTION,
            BlockKind::Rotate => FIELD_AXIS,
            _ => FIELD_TYPE,
        };
        graph.set_field(&block, field, tag).unwrap();
    }
    for (slot, value) in slots {
        literal(graph, &block, slot, *value);
    }
    block
}

/// Link `blocks` in order after `head`; returns the last block.
pub fn chain(graph: &mut BlockGraph, head: &str, blocks: &[BlockId]) -> BlockId {
    let mut previous = head.to_string();
    for block in blocks {
        graph.connect_next(&previous, block).unwrap();
        previous = block.clone();
    }
    previous
}
