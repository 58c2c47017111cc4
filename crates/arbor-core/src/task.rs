use crate::{Blackboard, TaskStatus, TickContext};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Combination rule of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Composition {
    /// Advance on child `Success`, fail on first child `Failure`.
    Sequence,
    /// Advance on child `Failure`, succeed on first child `Success`.
    Selector,
    /// Tick all children each tick; fail fast, succeed when all succeed.
    Parallel,
}

/// One-time setup capability, fired at most once per task by the tree's
/// setup pass.
pub trait EventAwake {
    fn awake(&mut self);
}

/// Conditional-abort capability for nodes guarding a branch.
///
/// Re-evaluated once per tick while lower-priority work is running; a `true`
/// result interrupts that work and transfers control to the guarded branch.
pub trait AbortCondition {
    fn evaluate(&mut self, ctx: &TickContext, bb: &Blackboard) -> bool;
}

/// Single-child status transformer capability.
///
/// Mapping a terminal child status to `Continue` asks the engine to reset the
/// child subtree and run it again on later ticks.
pub trait Decorate {
    fn decorate(&mut self, child: TaskStatus) -> TaskStatus;
}

/// A node in the hierarchy: leaf action, composite, or decorator.
///
/// The base contract is `enabled`/`update`/`reset`; everything else is an
/// optional capability the tree probes at attach time or during ticking.
/// Implementations reporting `Continue` must tolerate being updated again on
/// the next tick without duplicating irrevocable effects.
pub trait Task: 'static {
    /// Disabled tasks are excluded from the awake pass and from tick
    /// consideration by their parent.
    fn enabled(&self) -> bool {
        true
    }

    /// Leaf behavior. For composite and decorator nodes this is only
    /// consulted when the node has no enabled children.
    fn update(&mut self, ctx: &TickContext, bb: &mut Blackboard) -> TaskStatus;

    /// Discard internal run state. Invoked by the engine when the node's
    /// branch is interrupted, recycled, or restarted.
    fn reset(&mut self) {}

    /// Combination rule, for composite nodes.
    fn composition(&self) -> Option<Composition> {
        None
    }

    fn as_awake(&mut self) -> Option<&mut dyn EventAwake> {
        None
    }

    fn as_abort(&mut self) -> Option<&mut dyn AbortCondition> {
        None
    }

    fn as_decorator(&mut self) -> Option<&mut dyn Decorate> {
        None
    }
}
