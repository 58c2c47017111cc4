use arbor_core::{Blackboard, Task, TaskStatus, TickContext};

use crate::nodes::{GenericAction, GenericCondition, Parallel, Selector, Sequence, Wait};
use crate::tree::{BehaviorTree, TaskId};

/// Fluent tree assembly over the same spawn/attach surface the host uses.
///
/// Composite methods open a scope, `end` closes it, leaf methods attach to
/// the innermost open scope. The outermost scope is the tree's root
/// sequence.
///
/// ```
/// use arbor_core::TaskStatus;
/// use arbor_tree::BehaviorTreeBuilder;
///
/// let mut tree = BehaviorTreeBuilder::new()
///     .selector()
///         .sequence()
///             .condition(|_, _| false)
///             .action(|_, _| TaskStatus::Success)
///         .end()
///         .wait_ticks(2)
///     .end()
///     .build();
/// tree.update();
/// ```
pub struct BehaviorTreeBuilder {
    tree: BehaviorTree,
    stack: Vec<TaskId>,
}

impl Default for BehaviorTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorTreeBuilder {
    pub fn new() -> Self {
        let tree = BehaviorTree::new();
        let root = tree.root();
        Self {
            tree,
            stack: vec![root],
        }
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.tree.repeat = repeat;
        self
    }

    /// Attach any task as a leaf of the innermost open scope.
    pub fn task(mut self, task: impl Task) -> Self {
        self.attach(task);
        self
    }

    pub fn action(
        self,
        update_logic: impl FnMut(&TickContext, &mut Blackboard) -> TaskStatus + 'static,
    ) -> Self {
        self.task(GenericAction::new(update_logic))
    }

    pub fn condition(
        self,
        predicate: impl FnMut(&TickContext, &Blackboard) -> bool + 'static,
    ) -> Self {
        self.task(GenericCondition::new(predicate))
    }

    pub fn wait_ticks(self, total: u32) -> Self {
        self.task(Wait::ticks(total))
    }

    pub fn sequence(mut self) -> Self {
        let id = self.attach(Sequence::new());
        self.stack.push(id);
        self
    }

    pub fn sequence_with_abort(
        mut self,
        condition: impl FnMut(&TickContext, &Blackboard) -> bool + 'static,
    ) -> Self {
        let id = self.attach(Sequence::new().with_abort_condition(condition));
        self.stack.push(id);
        self
    }

    pub fn selector(mut self) -> Self {
        let id = self.attach(Selector::new());
        self.stack.push(id);
        self
    }

    pub fn selector_with_abort(
        mut self,
        condition: impl FnMut(&TickContext, &Blackboard) -> bool + 'static,
    ) -> Self {
        let id = self.attach(Selector::new().with_abort_condition(condition));
        self.stack.push(id);
        self
    }

    pub fn parallel(mut self) -> Self {
        let id = self.attach(Parallel::new());
        self.stack.push(id);
        self
    }

    /// Open a decorator scope around the next leaf or composite.
    pub fn decorator(mut self, task: impl Task) -> Self {
        let id = self.attach(task);
        self.stack.push(id);
        self
    }

    /// Close the innermost open scope. Closing the root scope is a no-op.
    pub fn end(mut self) -> Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    pub fn build(self) -> BehaviorTree {
        self.tree
    }

    fn attach(&mut self, task: impl Task) -> TaskId {
        let parent = *self
            .stack
            .last()
            .expect("builder scope stack always holds the root");
        let child = self.tree.spawn(task);
        self.tree
            .add_node(parent, child)
            .expect("freshly spawned child attaches cleanly");
        child
    }
}
