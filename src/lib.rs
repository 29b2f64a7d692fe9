//! # Motion Block Graph Compiler (MBGC)
//!
//! Bidirectional compiler between a visual block graph describing timed
//! motion operations and the linear animation program consumed by a
//! playback engine.
//!
//! MBGC provides:
//! - An editable [`BlockGraph`] with change notifications
//! - Compilation to a [`Program`] with Repeat unrolling and total value resolution
//! - Decompilation of a [`Program`] back into a flat block chain
//! - A [`ChangeCoordinator`] that debounces edits and suppresses feedback
//!   from programmatic rebuilds
//!
//! ## Quick Start
//!
//! ```rust
//! use mbgc::{compile, BlockGraph, BlockKind, FIELD_DIRECTION, FIELD_NUM, SLOT_DISTANCE};
//!
//! let mut graph = BlockGraph::new();
//! let start = graph.create_block(BlockKind::Start);
//! let step = graph.create_block(BlockKind::Move);
//! graph.set_field(&step, FIELD_DIRECTION, "moveUp")?;
//! let distance = graph.create_block(BlockKind::NumberLiteral);
//! graph.set_field(&distance, FIELD_NUM, 2.0)?;
//! graph.connect_value(&step, SLOT_DISTANCE, &distance)?;
//! graph.connect_next(&start, &step)?;
//!
//! let program = compile(&graph);
//! assert_eq!(program.steps()[0].distance(), Some(2.0));
//! # Ok::<(), mbgc::GraphError>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Block Graph** - Blocks, links, and observer notifications
//! 2. **Value Resolution** - Numeric parameters from literal slot children
//! 3. **Step Emission** - Chain traversal and Repeat unrolling
//! 4. **Decompilation** - Program back to a flat chain
//! 5. **Coordination** - Debounced recompilation and suppressed rebuilds

pub mod compiler;
pub mod config;
pub mod coordinator;
pub mod decompiler;
pub mod emit;
pub mod error;
pub mod graph;
pub mod program;
pub mod resolver;
pub mod session;

// Re-export the main compilation API
pub use compiler::{compile, compile_with_options};
pub use decompiler::decompile;
pub use emit::Compilation;

pub use config::{CompileOptions, CoordinatorConfig, IdPolicy, SessionConfig};
pub use coordinator::{ChangeCoordinator, CoordinatorState, ListenerId};
pub use error::{CompileWarning, GraphError, MalformedReason, PlayError, ProgramError};
pub use graph::{
    Block, BlockGraph, BlockId, BlockKind, ChangeClass, ChangeReason, FieldValue, GraphEvent,
    GraphEventKind, GraphObserver, Position, FIELD_AXIS, FIELD_DIRECTION, FIELD_NUM, FIELD_TYPE,
    SLOT_ANGLE, SLOT_DISTANCE, SLOT_DURATION, SLOT_SCALE, SLOT_TIMES,
};
pub use program::{AnimationStep, Program, StepFamily, StepKind};
pub use resolver::{resolve, ValueResolver};
pub use session::EditorSession;
