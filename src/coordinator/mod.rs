//! # Change Coordination
//!
//! Keeps the block graph and the compiled program in sync without feedback
//! loops. Editor notifications are debounced into a single recompilation;
//! graph rebuilds requested by the host run in the [`Suppressed`] state, in
//! which every notification is discarded.
//!
//! Time is driven by the host through [`ChangeCoordinator::advance`]. All
//! deferred work (debounce, grace window, deferred decompile) is held in
//! [`DeferredTask`]s and fires in deadline order.
//!
//! [`Suppressed`]: CoordinatorState::Suppressed

mod inbox;
mod timer;

pub use inbox::EventInbox;
pub use timer::DeferredTask;

use crate::compiler::compile_with_options;
use crate::config::{CompileOptions, CoordinatorConfig};
use crate::decompiler::decompile;
use crate::error::{GraphError, PlayError};
use crate::graph::{BlockGraph, ChangeReason, GraphEvent};
use crate::program::Program;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Notifications schedule a recompilation.
    Idle,
    /// A programmatic rebuild is running or just finished; notifications are dropped.
    Suppressed,
}

/// Callback receiving each newly compiled program.
pub type ProgramListener = Box<dyn FnMut(&Program)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Grace,
    Decompile,
    Debounce,
}

pub struct ChangeCoordinator {
    config: CoordinatorConfig,
    compile_options: CompileOptions,
    state: CoordinatorState,
    clock: Duration,
    inbox: Rc<EventInbox>,
    debounce: DeferredTask,
    grace: DeferredTask,
    deferred_decompile: DeferredTask,
    queued_program: Option<Program>,
    /// Program the graph currently represents, as last installed or published.
    last_installed: Option<Program>,
    current: Program,
    listeners: Vec<(ListenerId, ProgramListener)>,
    next_listener: u64,
    disposed: bool,
}

impl std::fmt::Debug for ChangeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeCoordinator")
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("debounce", &self.debounce)
            .field("grace", &self.grace)
            .field("deferred_decompile", &self.deferred_decompile)
            .field("current_steps", &self.current.len())
            .field("listeners", &self.listeners.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl ChangeCoordinator {
    pub fn new(config: CoordinatorConfig, compile_options: CompileOptions) -> Self {
        Self {
            config,
            compile_options,
            state: CoordinatorState::Idle,
            clock: Duration::ZERO,
            inbox: Rc::new(EventInbox::default()),
            debounce: DeferredTask::default(),
            grace: DeferredTask::default(),
            deferred_decompile: DeferredTask::default(),
            queued_program: None,
            last_installed: None,
            current: Program::new(),
            listeners: Vec::new(),
            next_listener: 0,
            disposed: false,
        }
    }

    /// Observer to register with the graph this coordinator watches.
    pub fn inbox(&self) -> Rc<EventInbox> {
        Rc::clone(&self.inbox)
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Time elapsed on the coordinator's clock.
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The most recently compiled or installed program.
    pub fn current_program(&self) -> &Program {
        &self.current
    }

    pub fn has_pending_compile(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn has_pending_decompile(&self) -> bool {
        self.deferred_decompile.is_pending()
    }

    pub fn on_program_changed(&mut self, listener: impl FnMut(&Program) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Filter one graph notification. Returns whether it (re)started the debounce timer.
    pub fn handle_event(&mut self, event: &GraphEvent) -> bool {
        if self.disposed {
            return false;
        }
        if self.state == CoordinatorState::Suppressed {
            tracing::trace!("[SYNC] Discarding {:?} on {} while suppressed", event.kind, event.block);
            return false;
        }
        if event.reason == ChangeReason::Programmatic && self.config.ignore_programmatic {
            tracing::trace!("[SYNC] Ignoring programmatic {:?} on {}", event.kind, event.block);
            return false;
        }

        tracing::trace!("[SYNC] {:?} change on {}, debounce restarted", event.class(), event.block);
        // graph has drifted from whatever was last installed or published
        self.last_installed = None;
        self.debounce.schedule(self.clock, self.config.debounce());
        true
    }

    /// Process every notification queued in the inbox.
    pub fn pump(&mut self) {
        for event in self.inbox.drain() {
            self.handle_event(&event);
        }
    }

    /// Queue `program` to be decompiled into the graph after the deferral delay.
    ///
    /// A program value-identical to the one the graph already represents is ignored.
    pub fn set_active_program(&mut self, program: Program) {
        if self.disposed {
            return;
        }
        let already_queued = self.queued_program.as_ref() == Some(&program);
        let already_installed =
            self.queued_program.is_none() && self.last_installed.as_ref() == Some(&program);
        if already_queued || already_installed {
            tracing::debug!("[SYNC] Active program unchanged, skipping rebuild");
            return;
        }

        tracing::debug!("[SYNC] Queued decompile of {} steps", program.len());
        self.queued_program = Some(program);
        self.deferred_decompile
            .schedule(self.clock, self.config.decompile_delay());
    }

    /// Move the clock forward by `dt`, firing due tasks in deadline order.
    pub fn advance(&mut self, graph: &mut BlockGraph, dt: Duration) {
        if self.disposed {
            return;
        }
        self.pump();
        let target = self.clock + dt;
        while let Some((due, task)) = self.next_due(target) {
            self.clock = due;
            self.fire(task, graph);
            self.pump();
        }
        self.clock = target;
    }

    /// Run any queued decompile now, then compile the current graph for playback.
    pub fn request_play(&mut self, graph: &mut BlockGraph) -> Result<Program, PlayError> {
        if !self.disposed {
            self.pump();
            if self.deferred_decompile.cancel() {
                if let Some(program) = self.queued_program.take() {
                    self.install(graph, program);
                }
            }
        }

        let program = compile_with_options(graph, &self.compile_options).program;
        self.current = program.clone();
        if program.is_empty() {
            tracing::info!("[SYNC] Play requested with an empty program");
            return Err(PlayError::EmptyProgram);
        }
        Ok(program)
    }

    /// Empty the graph under suppression; nothing is published.
    pub fn clear(&mut self, graph: &mut BlockGraph) {
        if self.disposed {
            graph.clear();
            return;
        }
        self.deferred_decompile.cancel();
        self.queued_program = None;
        self.run_suppressed(graph, |graph| {
            graph.clear();
            Ok(())
        });
        self.current = Program::new();
        self.last_installed = Some(Program::new());
    }

    /// Cancel all pending work and drop listeners. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        tracing::debug!("[SYNC] Disposing coordinator");
        self.debounce.cancel();
        self.grace.cancel();
        self.deferred_decompile.cancel();
        self.queued_program = None;
        self.listeners.clear();
        self.inbox.drain();
        self.disposed = true;
    }

    fn next_due(&self, until: Duration) -> Option<(Duration, Task)> {
        [
            (self.grace.due(), Task::Grace),
            (self.deferred_decompile.due(), Task::Decompile),
            (self.debounce.due(), Task::Debounce),
        ]
        .into_iter()
        .filter_map(|(due, task)| due.filter(|due| *due <= until).map(|due| (due, task)))
        .min_by_key(|(due, _)| *due)
    }

    fn fire(&mut self, task: Task, graph: &mut BlockGraph) {
        match task {
            Task::Grace => {
                self.grace.take_if_due(self.clock);
                self.state = CoordinatorState::Idle;
                tracing::debug!("[SYNC] Suppression lifted at {:?}", self.clock);
            }
            Task::Decompile => {
                self.deferred_decompile.take_if_due(self.clock);
                if self.state == CoordinatorState::Suppressed {
                    tracing::debug!("[SYNC] Decompile deferred again, rebuild still settling");
                    self.deferred_decompile
                        .schedule(self.clock, self.config.decompile_delay());
                    return;
                }
                if let Some(program) = self.queued_program.take() {
                    self.install(graph, program);
                }
            }
            Task::Debounce => {
                self.debounce.take_if_due(self.clock);
                if self.state == CoordinatorState::Suppressed {
                    return;
                }
                let program = compile_with_options(graph, &self.compile_options).program;
                self.publish(program);
            }
        }
    }

    fn install(&mut self, graph: &mut BlockGraph, program: Program) {
        tracing::debug!("[SYNC] Installing program of {} steps", program.len());
        self.run_suppressed(graph, |graph| decompile(graph, &program));
        self.current = program.clone();
        self.last_installed = Some(program);
    }

    fn run_suppressed(
        &mut self,
        graph: &mut BlockGraph,
        rebuild: impl FnOnce(&mut BlockGraph) -> Result<(), GraphError>,
    ) {
        self.state = CoordinatorState::Suppressed;
        self.debounce.cancel();
        self.grace.cancel();
        tracing::debug!("[SYNC] Suppressed at {:?}", self.clock);

        if let Err(err) = rebuild(graph) {
            tracing::error!("[SYNC] Graph rebuild failed: {}", err);
        }

        self.pump();
        self.grace.schedule(self.clock, self.config.grace_window());
    }

    fn publish(&mut self, program: Program) {
        tracing::debug!("[SYNC] Publishing program of {} steps", program.len());
        self.current = program.clone();
        self.last_installed = Some(program.clone());
        for (_, listener) in self.listeners.iter_mut() {
            listener(&program);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlockKind, GraphEventKind};
    use crate::program::AnimationStep;
    use std::cell::RefCell;

    const MS: Duration = Duration::from_millis(1);

    fn setup() -> (ChangeCoordinator, BlockGraph, Rc<RefCell<Vec<Program>>>) {
        let mut coordinator =
            ChangeCoordinator::new(CoordinatorConfig::default(), CompileOptions::default());
        let mut graph = BlockGraph::new();
        graph.subscribe(coordinator.inbox());
        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        coordinator.on_program_changed(move |program| sink.borrow_mut().push(program.clone()));
        (coordinator, graph, published)
    }

    fn event(reason: ChangeReason) -> GraphEvent {
        GraphEvent {
            kind: GraphEventKind::Create,
            block: "block_0".into(),
            reason,
        }
    }

    #[test]
    fn test_burst_compiles_once_after_quiet_period() {
        let (mut coordinator, mut graph, published) = setup();
        let start = graph.create_block(BlockKind::Start);
        coordinator.advance(&mut graph, 100 * MS);
        let pause = graph.create_block(BlockKind::Pause);
        coordinator.advance(&mut graph, 100 * MS);
        graph.connect_next(&start, &pause).unwrap();
        coordinator.advance(&mut graph, 199 * MS);
        assert!(published.borrow().is_empty());

        coordinator.advance(&mut graph, MS);
        assert_eq!(published.borrow().len(), 1);
        assert_eq!(published.borrow()[0].len(), 1);
        assert!(!coordinator.has_pending_compile());
    }

    #[test]
    fn test_install_suppresses_its_own_notifications() {
        let (mut coordinator, mut graph, published) = setup();
        coordinator.set_active_program(Program::from_steps(vec![AnimationStep::pause(1.0)]));
        coordinator.advance(&mut graph, 50 * MS);
        assert_eq!(coordinator.state(), CoordinatorState::Suppressed);
        assert_eq!(graph.top_blocks().len(), 1);

        coordinator.advance(&mut graph, Duration::from_secs(5));
        assert_eq!(coordinator.state(), CoordinatorState::Idle);
        assert!(published.borrow().is_empty());
        assert_eq!(coordinator.current_program().len(), 1);
    }

    #[test]
    fn test_identical_program_is_not_reinstalled() {
        let (mut coordinator, mut graph, _published) = setup();
        let program = Program::from_steps(vec![AnimationStep::pause(2.0)]);
        coordinator.set_active_program(program.clone());
        coordinator.advance(&mut graph, Duration::from_secs(1));

        coordinator.set_active_program(program);
        assert!(!coordinator.has_pending_decompile());
    }

    #[test]
    fn test_user_edit_invalidates_installed_snapshot() {
        let (mut coordinator, mut graph, _published) = setup();
        let program = Program::from_steps(vec![AnimationStep::pause(2.0)]);
        coordinator.set_active_program(program.clone());
        coordinator.advance(&mut graph, Duration::from_secs(1));

        graph.create_block(BlockKind::Pause);
        coordinator.pump();
        coordinator.set_active_program(program);
        assert!(coordinator.has_pending_decompile());
    }

    #[test]
    fn test_programmatic_reason_policy() {
        let mut coordinator = ChangeCoordinator::new(
            CoordinatorConfig {
                ignore_programmatic: true,
                ..CoordinatorConfig::default()
            },
            CompileOptions::default(),
        );
        assert!(!coordinator.handle_event(&event(ChangeReason::Programmatic)));
        assert!(coordinator.handle_event(&event(ChangeReason::Interactive)));

        let mut trusting =
            ChangeCoordinator::new(CoordinatorConfig::default(), CompileOptions::default());
        assert!(trusting.handle_event(&event(ChangeReason::Programmatic)));
    }

    #[test]
    fn test_dispose_cancels_pending_work() {
        let (mut coordinator, mut graph, published) = setup();
        let start = graph.create_block(BlockKind::Start);
        let pause = graph.create_block(BlockKind::Pause);
        graph.connect_next(&start, &pause).unwrap();
        coordinator.set_active_program(Program::new());
        coordinator.pump();
        assert!(coordinator.has_pending_compile());

        coordinator.dispose();
        coordinator.advance(&mut graph, Duration::from_secs(1));
        assert!(published.borrow().is_empty());
        assert!(!coordinator.has_pending_decompile());
        assert_eq!(graph.len(), 2);
    }
}
