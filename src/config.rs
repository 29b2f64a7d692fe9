//! # Configuration
//!
//! Settings for compilation and editor sessions, all defaulted and loadable
//! from JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How compiled steps are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// A new uuid for every step on every compilation.
    #[default]
    Fresh,
    /// `"{index}:{kind}"`, stable across recompilations of the same shape.
    Structural,
}

/// Options for [`compile_with_options`](crate::compile_with_options).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub id_policy: IdPolicy,
    /// Upper bound on a single Repeat's iteration count.
    pub max_repeat: usize,
    /// Upper bound on the steps Repeat unrolling may produce in one program,
    /// nested Repeats included.
    pub max_steps: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            id_policy: IdPolicy::Fresh,
            max_repeat: 10_000,
            max_steps: 100_000,
        }
    }
}

/// Timing and filtering policy of the change coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period after the last notification before recompiling.
    pub debounce_ms: u64,
    /// Time the coordinator stays suppressed after a decompile, to swallow
    /// trailing notifications from the editor's render pass.
    pub grace_window_ms: u64,
    /// Delay before a host-requested decompile runs.
    pub decompile_delay_ms: u64,
    /// Drop notifications tagged as programmatic even while idle.
    pub ignore_programmatic: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            grace_window_ms: 100,
            decompile_delay_ms: 50,
            ignore_programmatic: false,
        }
    }
}

impl CoordinatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::from_millis(self.grace_window_ms)
    }

    pub fn decompile_delay(&self) -> Duration {
        Duration::from_millis(self.decompile_delay_ms)
    }
}

/// Everything an [`EditorSession`](crate::EditorSession) needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub coordinator: CoordinatorConfig,
    pub compile: CompileOptions,
}

impl SessionConfig {
    /// Parse a JSON config; omitted keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
