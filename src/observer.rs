//! Hook for watching a search as it runs.
//!
//! Observers only receive copies of node positions; they cannot reach the open or closed
//! sets, and nothing they do changes which route is found. Sleeping on a wait hint is left
//! to the observer.

use std::time::Duration;

use tracing::trace;

/// What just happened to the node in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    /// The start node was seeded into the open set.
    Start,
    /// The node was popped as the cheapest open node.
    Current,
    /// The node was moved to the closed set.
    Closed,
    /// The node was admitted to the open set.
    Discovered,
}

impl NodeTag {
    /// Advisory RGBA colour for renderers.
    pub fn color(&self) -> [u8; 4] {
        match self {
            NodeTag::Start | NodeTag::Current => [0xff, 0x00, 0x00, 0xff],
            NodeTag::Closed => [0xa0, 0xb0, 0xb0, 0xff],
            NodeTag::Discovered => [0x00, 0xb0, 0xb0, 0xff],
        }
    }

    fn wait_hint(&self) -> Option<Duration> {
        match self {
            NodeTag::Start => Some(Duration::from_millis(5)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEvent {
    pub position: (usize, usize),
    pub tag: NodeTag,
    pub wait: Option<Duration>,
}

impl SearchEvent {
    pub(crate) fn new(position: (usize, usize), tag: NodeTag) -> Self {
        SearchEvent {
            position,
            tag,
            wait: tag.wait_hint(),
        }
    }
}

pub trait SearchObserver {
    fn observe(&mut self, event: &SearchEvent);
}

impl<F: FnMut(&SearchEvent)> SearchObserver for F {
    fn observe(&mut self, event: &SearchEvent) {
        self(event)
    }
}

/// Logs every event at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceObserver;

impl SearchObserver for TraceObserver {
    fn observe(&mut self, event: &SearchEvent) {
        trace!("{:?} {:?}", event.tag, event.position);
    }
}
