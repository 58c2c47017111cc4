//! Engine-agnostic behavior tree primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod status;
pub mod task;
pub mod tick;

pub use blackboard::{BbKey, Blackboard};
pub use status::{Outcome, TaskStatus};
pub use task::{AbortCondition, Composition, Decorate, EventAwake, Task};
pub use tick::TickContext;
