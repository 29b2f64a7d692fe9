//! # Block Graph
//!
//! In-memory structure of connected blocks edited by the visual editor.
//! Holds no compiler logic: only data, connectivity queries, and change
//! notifications.

mod block;
mod events;
mod workspace;

pub use block::*;
pub use events::*;
pub use workspace::*;
