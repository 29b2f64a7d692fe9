//! # Deferred Tasks
//!
//! One-shot deadlines on the coordinator's host-driven clock.

use std::time::Duration;

/// A cancellable one-shot task on the coordinator's clock.
///
/// Scheduling again replaces the pending deadline, so only the most recent
/// request survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredTask {
    due: Option<Duration>,
}

impl DeferredTask {
    pub fn schedule(&mut self, now: Duration, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// Returns whether a pending deadline was dropped.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Duration> {
        self.due
    }

    /// Consume the task if its deadline has passed.
    pub fn take_if_due(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
