//! # Workspace
//!
//! Creation-ordered block storage with chain, value-slot, and statement-slot
//! links. Every mutation is reported to subscribed observers.

use super::{
    Block, BlockId, BlockKind, ChangeReason, FieldValue, GraphEvent, GraphEventKind,
    GraphObserver, ObserverId, Position,
};
use crate::error::GraphError;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

type Result<T> = std::result::Result<T, GraphError>;

/// The editable block workspace.
///
/// Blocks are kept in creation order, which makes [`top_blocks`](Self::top_blocks)
/// deterministic. Every mutation notifies the registered observers with a
/// [`GraphEvent`] tagged with the graph's current [`ChangeReason`].
pub struct BlockGraph {
    blocks: IndexMap<BlockId, Block>,
    next_serial: u64,
    next_observer: u64,
    observers: Vec<(ObserverId, Rc<dyn GraphObserver>)>,
    origin: ChangeReason,
}

impl Default for BlockGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGraph")
            .field("blocks", &self.blocks)
            .field("observers", &self.observers.len())
            .field("origin", &self.origin)
            .finish()
    }
}

impl BlockGraph {
    pub fn new() -> Self {
        Self {
            blocks: IndexMap::new(),
            next_serial: 0,
            next_observer: 0,
            observers: Vec::new(),
            origin: ChangeReason::Interactive,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Blocks with no incoming chain or container link, in creation order.
    pub fn top_blocks(&self) -> Vec<&Block> {
        self.blocks.values().filter(|block| block.is_top()).collect()
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: Rc<dyn GraphObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Reason attached to the events emitted by subsequent mutations.
    pub fn origin(&self) -> ChangeReason {
        self.origin
    }

    pub fn set_origin(&mut self, origin: ChangeReason) -> ChangeReason {
        std::mem::replace(&mut self.origin, origin)
    }

    /// Run `f` with mutations tagged as `origin`, restoring the previous tag afterwards.
    pub fn with_origin<R>(&mut self, origin: ChangeReason, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.set_origin(origin);
        let result = f(self);
        self.origin = previous;
        result
    }

    fn emit(&self, kind: GraphEventKind, block: &str) {
        if self.observers.is_empty() {
            return;
        }
        let event = GraphEvent {
            kind,
            block: block.to_string(),
            reason: self.origin,
        };
        for (_, observer) in &self.observers {
            observer.notify(&event);
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn create_block(&mut self, kind: BlockKind) -> BlockId {
        let id = format!("block_{}", self.next_serial);
        self.next_serial += 1;
        self.blocks.insert(id.clone(), Block::new(id.clone(), kind));
        self.emit(GraphEventKind::Create, &id);
        id
    }

    pub fn set_field(&mut self, id: &str, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let block = self.get_mut(id)?;
        block.fields.insert(name.to_string(), value.into());
        self.emit(GraphEventKind::FieldChange, id);
        Ok(())
    }

    pub fn move_block(&mut self, id: &str, position: Position) -> Result<()> {
        self.get_mut(id)?.position = Some(position);
        self.emit(GraphEventKind::Move, id);
        Ok(())
    }

    /// Link `next` after `block`.
    ///
    /// `next` is unplugged from wherever it was. If `block` already had a
    /// successor, that successor is re-attached at the tail of the inserted chain.
    pub fn connect_next(&mut self, block: &str, next: &str) -> Result<()> {
        self.check_connectable(block, next)?;
        if self.blocks[block].next.as_deref() == Some(next) {
            return Ok(());
        }

        self.detach(next);
        let displaced = self.get_mut(block)?.next.replace(next.to_string());
        self.get_mut(next)?.previous = Some(block.to_string());

        if let Some(displaced) = displaced {
            let tail = self.chain_tail(next);
            self.get_mut(&tail)?.next = Some(displaced.clone());
            self.get_mut(&displaced)?.previous = Some(tail);
        }

        self.emit(GraphEventKind::Move, next);
        Ok(())
    }

    /// Plug `child` into the named value slot of `block`.
    ///
    /// A child already occupying the slot is bumped to the top level.
    pub fn connect_value(&mut self, block: &str, slot: &str, child: &str) -> Result<()> {
        self.check_connectable(block, child)?;
        if self.blocks[block].value_slots.get(slot).map(String::as_str) == Some(child) {
            return Ok(());
        }

        self.detach(child);
        let bumped = self
            .get_mut(block)?
            .value_slots
            .insert(slot.to_string(), child.to_string());
        self.get_mut(child)?.parent = Some(block.to_string());

        if let Some(bumped) = bumped {
            self.get_mut(&bumped)?.parent = None;
            self.emit(GraphEventKind::Move, &bumped);
        }

        self.emit(GraphEventKind::Move, child);
        Ok(())
    }

    /// Make `child` the head of `block`'s nested chain.
    ///
    /// An existing nested chain is re-attached at the tail of `child`'s chain.
    pub fn connect_statement(&mut self, block: &str, child: &str) -> Result<()> {
        self.check_connectable(block, child)?;
        let owner = &self.blocks[block];
        if !owner.kind.has_statement_slot() {
            return Err(GraphError::NotAContainer {
                block: block.to_string(),
                kind: owner.kind.to_string(),
            });
        }
        if owner.statement_slot.as_deref() == Some(child) {
            return Ok(());
        }

        self.detach(child);
        let displaced = self.get_mut(block)?.statement_slot.replace(child.to_string());
        self.get_mut(child)?.parent = Some(block.to_string());

        if let Some(displaced) = displaced {
            let tail = self.chain_tail(child);
            let head = self.get_mut(&displaced)?;
            head.parent = None;
            head.previous = Some(tail.clone());
            self.get_mut(&tail)?.next = Some(displaced);
        }

        self.emit(GraphEventKind::Move, child);
        Ok(())
    }

    /// Unplug a block (and everything chained after it) so it becomes a top block.
    pub fn disconnect(&mut self, id: &str) -> Result<()> {
        if self.require(id)?.is_top() {
            return Ok(());
        }
        self.detach(id);
        self.emit(GraphEventKind::Move, id);
        Ok(())
    }

    /// Delete a block together with its slot children and nested chain.
    ///
    /// The chain is healed: the deleted block's successor takes its place.
    pub fn delete_block(&mut self, id: &str) -> Result<()> {
        let block = self.require(id)?;
        let previous = block.previous.clone();
        let parent = block.parent.clone();
        let next = block.next.clone();

        if let Some(next) = &next {
            let successor = self.get_mut(next)?;
            successor.previous = previous.clone();
        }

        if let Some(previous) = &previous {
            self.get_mut(previous)?.next = next.clone();
        } else if let Some(parent) = &parent {
            let owner = self.get_mut(parent)?;
            if owner.statement_slot.as_deref() == Some(id) {
                owner.statement_slot = next.clone();
                if let Some(next) = &next {
                    self.get_mut(next)?.parent = Some(parent.clone());
                }
            } else {
                owner.value_slots.retain(|_, child| child != id);
            }
        }

        let mut doomed = vec![id.to_string()];
        self.collect_owned(id, &mut doomed);
        for doomed_id in &doomed {
            self.blocks.shift_remove(doomed_id);
        }

        self.emit(GraphEventKind::Delete, id);
        Ok(())
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        let tops: Vec<BlockId> = self.top_blocks().iter().map(|block| block.id.clone()).collect();
        self.blocks.clear();
        for id in tops {
            self.emit(GraphEventKind::Delete, &id);
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require(&self, id: &str) -> Result<&Block> {
        self.blocks
            .get(id)
            .ok_or_else(|| GraphError::BlockNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Block> {
        self.blocks
            .get_mut(id)
            .ok_or_else(|| GraphError::BlockNotFound(id.to_string()))
    }

    fn check_connectable(&self, parent: &str, child: &str) -> Result<()> {
        if parent == child {
            return Err(GraphError::SelfConnection(parent.to_string()));
        }
        self.require(parent)?;
        self.require(child)?;
        if self.subtree_contains(child, parent) {
            return Err(GraphError::Cycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        Ok(())
    }

    /// Whether `target` is reachable from `root` through next, value, or statement links.
    fn subtree_contains(&self, root: &str, target: &str) -> bool {
        let mut stack = vec![root];
        let mut seen = 0usize;
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            seen += 1;
            if seen > self.blocks.len() {
                break;
            }
            if let Some(block) = self.blocks.get(current) {
                stack.extend(block.next.as_deref());
                stack.extend(block.statement_slot.as_deref());
                stack.extend(block.value_slots.values().map(String::as_str));
            }
        }
        false
    }

    fn chain_tail(&self, head: &str) -> BlockId {
        let mut tail = head;
        for _ in 0..self.blocks.len() {
            match self.blocks.get(tail).and_then(|block| block.next.as_deref()) {
                Some(next) => tail = next,
                None => break,
            }
        }
        tail.to_string()
    }

    /// Unlink a block from its predecessor or container without healing.
    fn detach(&mut self, id: &str) {
        let Some(block) = self.blocks.get_mut(id) else {
            return;
        };
        let previous = block.previous.take();
        let parent = block.parent.take();

        if let Some(previous) = previous {
            if let Some(previous) = self.blocks.get_mut(&previous) {
                previous.next = None;
            }
        }
        if let Some(parent) = parent {
            if let Some(owner) = self.blocks.get_mut(&parent) {
                if owner.statement_slot.as_deref() == Some(id) {
                    owner.statement_slot = None;
                }
                owner.value_slots.retain(|_, child| child != id);
            }
        }
    }

    /// Slot children and nested chains owned by `id`, excluding its own successors.
    fn collect_owned(&self, id: &str, out: &mut Vec<BlockId>) {
        let Some(block) = self.blocks.get(id) else {
            return;
        };
        let mut stack: Vec<&str> = block
            .value_slots
            .values()
            .map(String::as_str)
            .chain(block.statement_slot.as_deref())
            .collect();
        while let Some(current) = stack.pop() {
            if out.iter().any(|seen| seen == current) {
                continue;
            }
            out.push(current.to_string());
            if let Some(child) = self.blocks.get(current) {
                stack.extend(child.next.as_deref());
                stack.extend(child.statement_slot.as_deref());
                stack.extend(child.value_slots.values().map(String::as_str));
            }
        }
    }
}
