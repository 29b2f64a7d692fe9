//! # Editor Session
//!
//! Host-facing boundary: owns the block graph and its change coordinator,
//! wires them together on construction, and tears everything down on
//! [`dispose`](EditorSession::dispose) or drop.

use crate::config::SessionConfig;
use crate::coordinator::{ChangeCoordinator, CoordinatorState, ListenerId};
use crate::error::{PlayError, ProgramError};
use crate::graph::{BlockGraph, ObserverId};
use crate::program::Program;
use std::time::Duration;

#[derive(Debug)]
pub struct EditorSession {
    graph: BlockGraph,
    coordinator: ChangeCoordinator,
    observer: Option<ObserverId>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut graph = BlockGraph::new();
        let coordinator = ChangeCoordinator::new(config.coordinator, config.compile);
        let observer = graph.subscribe(coordinator.inbox());
        tracing::debug!("[SYNC] Editor session initialised");
        Self {
            graph,
            coordinator,
            observer: Some(observer),
        }
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    /// Graph access for user edits; every mutation is observed.
    pub fn graph_mut(&mut self) -> &mut BlockGraph {
        &mut self.graph
    }

    pub fn coordinator(&self) -> &ChangeCoordinator {
        &self.coordinator
    }

    pub fn state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    pub fn current_program(&self) -> &Program {
        self.coordinator.current_program()
    }

    /// Register the host callback fired with each recompiled program.
    pub fn on_program_changed(&mut self, listener: impl FnMut(&Program) + 'static) -> ListenerId {
        self.coordinator.on_program_changed(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.coordinator.remove_listener(id)
    }

    /// Show `program` in the editor. The rebuild runs after the deferral delay.
    pub fn set_active_program(&mut self, program: Program) {
        self.coordinator.set_active_program(program);
    }

    /// Like [`set_active_program`](Self::set_active_program), from the host's JSON step array.
    pub fn set_active_program_json(&mut self, json: &str) -> Result<(), ProgramError> {
        let program = Program::from_json(json)?;
        self.set_active_program(program);
        Ok(())
    }

    /// Program to play, or [`PlayError::EmptyProgram`].
    pub fn request_play(&mut self) -> Result<Program, PlayError> {
        self.coordinator.request_play(&mut self.graph)
    }

    pub fn clear(&mut self) {
        self.coordinator.clear(&mut self.graph);
    }

    /// Advance the session clock, running any debounce or deferred work that falls due.
    pub fn advance(&mut self, dt: Duration) {
        self.coordinator.advance(&mut self.graph, dt);
    }

    pub fn is_disposed(&self) -> bool {
        self.coordinator.is_disposed()
    }

    /// Detach from the graph and cancel pending timers.
    pub fn dispose(&mut self) {
        if let Some(observer) = self.observer.take() {
            self.graph.unsubscribe(observer);
        }
        self.coordinator.dispose();
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BlockKind;

    #[test]
    fn test_dispose_detaches_observer() {
        let mut session = EditorSession::default();
        session.dispose();
        session.graph_mut().create_block(BlockKind::Start);
        session.advance(Duration::from_secs(1));
        assert!(session.is_disposed());
        assert!(session.current_program().is_empty());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let mut session = EditorSession::default();
        assert!(session.set_active_program_json("{").is_err());
        assert!(!session.coordinator().has_pending_decompile());
    }
}
