//! Behavior tree runtime built on `arbor-core`.
//!
//! Trees are arenas of spawned tasks linked into a hierarchy rooted at a
//! built-in sequence. Each external update resumes the execution cursor
//! where the previous tick left off, combines child statuses under each
//! composite's rule, re-evaluates conditional aborts, and repeats or
//! finishes when the root reaches a terminal status.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod nodes;
pub mod tree;

pub use builder::BehaviorTreeBuilder;
pub use error::TreeError;
pub use nodes::{
    AlwaysFail, AlwaysSucceed, GenericAction, GenericCondition, Inverter, Parallel, RepeatForever,
    RepeatUntilFailure, RepeatUntilSuccess, Selector, Sequence, Wait,
};
pub use tree::{BehaviorTree, TaskId, TreeId};
