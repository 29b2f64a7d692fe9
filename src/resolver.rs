//! # Value Resolution
//!
//! Reads numeric parameters from the number literals plugged into a block's
//! value slots. Resolution never fails: anything unusable yields the
//! caller's default, which keeps compilation total over malformed graphs.

use crate::error::MalformedReason;
use crate::graph::{Block, BlockGraph, BlockKind, FIELD_NUM};

/// Outcome of resolving one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f64,
    /// Set when `value` is the default rather than a literal.
    pub fallback: Option<MalformedReason>,
}

/// Slot value lookups against one graph.
#[derive(Debug, Clone, Copy)]
pub struct ValueResolver<'a> {
    graph: &'a BlockGraph,
}

impl<'a> ValueResolver<'a> {
    pub fn new(graph: &'a BlockGraph) -> Self {
        Self { graph }
    }

    /// Numeric value of `slot` on `block`, or `default`.
    pub fn resolve(&self, block: &Block, slot: &str, default: f64) -> f64 {
        self.resolve_detailed(block, slot, default).value
    }

    /// Like [`resolve`](Self::resolve), reporting why a default was used.
    pub fn resolve_detailed(&self, block: &Block, slot: &str, default: f64) -> Resolved {
        let fallback = |reason| Resolved {
            value: default,
            fallback: Some(reason),
        };

        let Some(child) = block
            .value_slot(slot)
            .and_then(|child_id| self.graph.block(child_id))
        else {
            return fallback(MalformedReason::Missing);
        };

        if *child.kind() != BlockKind::NumberLiteral {
            return fallback(MalformedReason::NotALiteral);
        }

        match child.field(FIELD_NUM).and_then(|field| field.as_finite_number()) {
            Some(value) => Resolved { value, fallback: None },
            None => fallback(MalformedReason::NotNumeric),
        }
    }
}

/// Free-function form of [`ValueResolver::resolve`].
pub fn resolve(graph: &BlockGraph, block: &Block, slot: &str, default: f64) -> f64 {
    ValueResolver::new(graph).resolve(block, slot, default)
}
