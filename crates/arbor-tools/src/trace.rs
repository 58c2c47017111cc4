#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use arbor_core::{BbKey, Blackboard};

/// A tree lifecycle event.
///
/// Plain data so it can be recorded during ticking and rendered later by
/// tooling. `node` is the arena slot of the node the event describes (0 when
/// the event is about the tree as a whole); `data` is a tag-specific payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub node: u64,
    pub data: u64,
}

impl TreeEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            node: 0,
            data: 0,
        }
    }

    pub fn with_node(mut self, node: u64) -> Self {
        self.node = node;
        self
    }

    pub fn with_data(mut self, data: u64) -> Self {
        self.data = data;
        self
    }
}

pub trait EventSink {
    fn emit(&mut self, event: TreeEvent);
}

#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: TreeEvent) {}
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<TreeEvent>,
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: TreeEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventLog {
    pub events: Vec<TreeEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: TreeEvent) {
        self.events.push(event);
    }

    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TreeEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }
}

/// Blackboard key for collecting events in-memory.
pub const EVENT_LOG: BbKey<EventLog> = BbKey::new(0xBEE5_EE00_0000_0001);
/// Blackboard key for streaming events into a user-provided sink.
pub const EVENT_SINK: BbKey<Box<dyn EventSink>> = BbKey::new(0xBEE5_EE00_0000_0002);

/// Fan an event out to whichever collectors the blackboard carries.
///
/// Free when neither key is set, so engine call sites do not need a guard.
pub fn emit(blackboard: &mut Blackboard, event: TreeEvent) {
    if let Some(log) = blackboard.get_mut(EVENT_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(EVENT_SINK) {
        sink.emit(event);
    }
}
