//! Deterministic event tracing for arbor behavior trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, EventLog, EventSink, MemorySink, NullSink, TreeEvent, EVENT_LOG, EVENT_SINK};
