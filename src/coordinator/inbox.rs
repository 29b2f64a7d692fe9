//! # Event Inbox

use crate::graph::{GraphEvent, GraphObserver};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Graph observer that queues notifications for the coordinator.
///
/// The graph calls observers while it is mutably borrowed, so events are
/// parked here and processed once the mutation has returned.
#[derive(Debug, Default)]
pub struct EventInbox {
    events: RefCell<VecDeque<GraphEvent>>,
}

impl EventInbox {
    pub fn drain(&self) -> Vec<GraphEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl GraphObserver for EventInbox {
    fn notify(&self, event: &GraphEvent) {
        self.events.borrow_mut().push_back(event.clone());
    }
}
