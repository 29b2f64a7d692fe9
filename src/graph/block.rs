//! # Blocks
//!
//! Block records, kinds, field values, and the well-known field and slot names.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Opaque block identifier, unique within one graph instance.
pub type BlockId = String;

/// Field holding the direction of a Move block (`moveUp`, `moveLeft`, ...).
pub const FIELD_DIRECTION: &str = "DIRECTION";
/// Field holding the axis of a Rotate block (`rotateX`, `rotateY`, `rotateZ`).
pub const FIELD_AXIS: &str = "AXIS";
/// Field holding the type of a Scale block (`scaleUp`, `scaleDown`).
pub const FIELD_TYPE: &str = "TYPE";
/// Field holding the constant of a NumberLiteral block.
pub const FIELD_NUM: &str = "NUM";
/// Exact radians written on a rebuilt Rotate block; valid while its ANGLE
/// literal still holds the degrees the rebuild wrote.
pub const FIELD_RADIANS: &str = "RADIANS";

pub const SLOT_DISTANCE: &str = "DISTANCE";
pub const SLOT_DURATION: &str = "DURATION";
pub const SLOT_ANGLE: &str = "ANGLE";
pub const SLOT_SCALE: &str = "SCALE";
pub const SLOT_TIMES: &str = "TIMES";

/// Kind of a block in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Start,
    Move,
    Rotate,
    Scale,
    Pause,
    Repeat,
    NumberLiteral,
    /// A block registered by the host toolbox that carries no motion semantics.
    Custom(String),
}

impl BlockKind {
    /// Only Repeat owns a nested statement chain.
    pub fn has_statement_slot(&self) -> bool {
        matches!(self, BlockKind::Repeat)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Start => write!(f, "start"),
            BlockKind::Move => write!(f, "move"),
            BlockKind::Rotate => write!(f, "rotate"),
            BlockKind::Scale => write!(f, "scale"),
            BlockKind::Pause => write!(f, "pause"),
            BlockKind::Repeat => write!(f, "repeat"),
            BlockKind::NumberLiteral => write!(f, "number_literal"),
            BlockKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Primitive value stored in a block field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }

    /// Numeric reading of the field; text is parsed, non-finite results are rejected.
    pub fn as_finite_number(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Workspace coordinates of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node in the block graph.
///
/// Links are stored as ids and kept consistent by
/// [`BlockGraph`](super::BlockGraph); a block never edits its own links.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) kind: BlockKind,
    pub(crate) fields: HashMap<String, FieldValue>,
    pub(crate) value_slots: BTreeMap<String, BlockId>,
    pub(crate) statement_slot: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
    pub(crate) previous: Option<BlockId>,
    /// Owner of the value or statement slot this block is plugged into.
    pub(crate) parent: Option<BlockId>,
    pub(crate) position: Option<Position>,
}

impl Block {
    pub(crate) fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            fields: HashMap::new(),
            value_slots: BTreeMap::new(),
            statement_slot: None,
            next: None,
            previous: None,
            parent: None,
            position: None,
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }

    /// Child block plugged into the named value slot.
    pub fn value_slot(&self, slot: &str) -> Option<&BlockId> {
        self.value_slots.get(slot)
    }

    pub fn value_slots(&self) -> impl Iterator<Item = (&str, &BlockId)> {
        self.value_slots.iter().map(|(slot, child)| (slot.as_str(), child))
    }

    /// Head of the nested chain (Repeat only).
    pub fn statement_slot(&self) -> Option<&BlockId> {
        self.statement_slot.as_ref()
    }

    pub fn next(&self) -> Option<&BlockId> {
        self.next.as_ref()
    }

    pub fn previous(&self) -> Option<&BlockId> {
        self.previous.as_ref()
    }

    pub fn parent(&self) -> Option<&BlockId> {
        self.parent.as_ref()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// A top block has no incoming chain or container link.
    pub fn is_top(&self) -> bool {
        self.previous.is_none() && self.parent.is_none()
    }
}
