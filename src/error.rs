//! # Error Types
//!
//! Errors raised by graph mutations and program exchange, plus the
//! recoverable warnings collected while compiling.

use crate::graph::BlockId;
use crate::program::StepKind;
use thiserror::Error;

/// Errors raised by [`BlockGraph`](crate::graph::BlockGraph) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("block {block} ({kind}) has no statement slot")]
    NotAContainer { block: BlockId, kind: String },

    #[error("connecting {child} under {parent} would create a cycle")]
    Cycle { parent: BlockId, child: BlockId },

    #[error("block {0} cannot be connected to itself")]
    SelfConnection(BlockId),
}

/// Errors raised while reading a program handed over by the host.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("invalid program JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("step {index} ({kind}) is missing its `{field}` parameter")]
    MissingParameter {
        index: usize,
        kind: StepKind,
        field: &'static str,
    },

    #[error("step {index} has a non-finite `{field}` value")]
    InvalidNumber { index: usize, field: &'static str },

    #[error("step {index} has non-positive duration {duration}")]
    NonPositiveDuration { index: usize, duration: f64 },
}

/// Errors reported to the host when it asks for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("no program to play: add a Start block followed by at least one step")]
    EmptyProgram,
}

/// Why a value slot fell back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Nothing is attached to the slot.
    Missing,
    /// The attached block is not a number literal.
    NotALiteral,
    /// The literal does not hold a finite number.
    NotNumeric,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Missing => write!(f, "slot is empty"),
            MalformedReason::NotALiteral => write!(f, "attached block is not a number literal"),
            MalformedReason::NotNumeric => write!(f, "literal is not a finite number"),
        }
    }
}

/// Recoverable problems found during compilation.
///
/// None of these abort compilation; the offending block is skipped or its
/// value replaced by a default.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileWarning {
    #[error("block {block}: slot `{slot}` {reason}, using default {default}")]
    MalformedValue {
        block: BlockId,
        slot: String,
        reason: MalformedReason,
        default: f64,
    },

    #[error("block {block}: unknown block kind `{kind}` skipped")]
    UnknownBlockKind { block: BlockId, kind: String },

    #[error("block {block}: Start block inside a chain skipped")]
    UnexpectedStart { block: BlockId },

    #[error("block {block}: {kind} block cannot appear in a chain, skipped")]
    UnexpectedBlock { block: BlockId, kind: String },

    #[error("block {block}: field `{field}` is missing or invalid, block skipped")]
    InvalidField { block: BlockId, field: String },

    #[error("block {block}: repeat count {requested} clamped to {limit}")]
    RepeatClamped {
        block: BlockId,
        requested: f64,
        limit: usize,
    },

    #[error("{count} Start blocks found, compiling from {used}")]
    MultipleStarts { count: usize, used: BlockId },

    #[error("block {block} visited twice, chain truncated")]
    CycleDetected { block: BlockId },
}
