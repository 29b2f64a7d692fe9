//! # Graph Events
//!
//! Change notifications and the observer seam the graph reports through.

use super::BlockId;

/// What happened to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEventKind {
    Create,
    Delete,
    Move,
    FieldChange,
}

impl GraphEventKind {
    pub fn class(self) -> ChangeClass {
        match self {
            GraphEventKind::Create | GraphEventKind::Delete | GraphEventKind::Move => {
                ChangeClass::Structural
            }
            GraphEventKind::FieldChange => ChangeClass::Value,
        }
    }
}

/// Coarse classification consumed by the change coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    Structural,
    Value,
}

/// Advisory origin tag of a mutation.
///
/// Not trusted to prevent feedback loops; the coordinator's suppressed
/// state is the authoritative filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeReason {
    #[default]
    Interactive,
    Programmatic,
}

/// Notification emitted by every graph mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEvent {
    pub kind: GraphEventKind,
    pub block: BlockId,
    pub reason: ChangeReason,
}

impl GraphEvent {
    pub fn class(&self) -> ChangeClass {
        self.kind.class()
    }
}

/// Receiver of graph notifications.
///
/// The graph is single-threaded and calls observers synchronously from
/// inside mutations, so implementations must not touch the graph.
pub trait GraphObserver {
    fn notify(&self, event: &GraphEvent);
}

/// Handle returned by [`BlockGraph::subscribe`](super::BlockGraph::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
