use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};

use arbor_core::{Blackboard, Composition, Outcome, Task, TaskStatus, TickContext};
use arbor_tools::{emit, TreeEvent};

use crate::error::TreeError;
use crate::nodes::Sequence;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a tree instance, embedded in every handle it issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Stable handle to a task owned by a tree.
///
/// The owner back-reference is the handle itself: it is assigned when the
/// task moves into the tree and never reassigned, and a handle from one tree
/// never resolves against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    tree: TreeId,
    index: Index,
}

impl TaskId {
    /// The tree this task belongs to.
    pub fn owner(self) -> TreeId {
        self.tree
    }

    /// Arena slot, for logs and trace events.
    pub fn slot(self) -> u64 {
        self.index.into_raw_parts().0 as u64
    }
}

/// How the engine routes execution through a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routing {
    Leaf,
    Composite(Composition),
    Decorator,
}

struct Node {
    task: Box<dyn Task>,
    parent: Option<Index>,
    children: Vec<Index>,
    routing: Routing,
    /// Resume position for ordered composites.
    cursor: usize,
    /// Per-child outcomes for parallel nodes, by raw child position.
    slots: Vec<Option<Outcome>>,
    attached: bool,
}

/// A behavior tree: node storage, registry, awake bookkeeping, and the
/// execution cursor, ticked synchronously by the host once per frame.
///
/// Nodes are spawned into the tree and then attached under an already
/// attached parent; children keep insertion order, which is the priority
/// order composites use. The cursor tracks the running node so a tick
/// resumes where the previous one left off instead of retraversing from the
/// root.
pub struct BehaviorTree {
    id: TreeId,
    arena: Arena<Node>,
    root: Index,
    current: Index,
    /// Attached nodes, in attachment order.
    registry: Vec<Index>,
    /// Awake-capable nodes, in attachment order.
    awake: Vec<Index>,
    /// Abort-capable nodes, in attachment (priority) order.
    observers: Vec<Index>,
    awakened: bool,
    finished: bool,
    outcome: Option<Outcome>,
    tick: u64,
    /// When set, reaching a terminal status at the root restarts traversal
    /// instead of finishing the tree. Read at completion time.
    pub repeat: bool,
    pub blackboard: Blackboard,
}

impl Default for BehaviorTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorTree {
    /// Create a tree whose distinguished root node is an empty sequence; the
    /// cursor starts at the root.
    pub fn new() -> Self {
        let id = TreeId::next();
        let mut arena = Arena::new();
        let root = arena.insert(Node {
            task: Box::new(Sequence::new()),
            parent: None,
            children: Vec::new(),
            routing: Routing::Composite(Composition::Sequence),
            cursor: 0,
            slots: Vec::new(),
            attached: true,
        });
        Self {
            id,
            arena,
            root,
            current: root,
            registry: vec![root],
            awake: Vec::new(),
            observers: Vec::new(),
            awakened: false,
            finished: false,
            outcome: None,
            tick: 0,
            repeat: false,
            blackboard: Blackboard::new(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> TaskId {
        self.handle(self.root)
    }

    /// The most recently evaluated node; the resumption point while it
    /// reports `Continue`. Equals the root before the first update.
    pub fn current(&self) -> TaskId {
        self.handle(self.current)
    }

    /// Terminal result of the most recently completed run, if any.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Attached nodes, in attachment order. The root is always first.
    pub fn nodes(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.registry.iter().map(|&i| self.handle(i))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.resolve(id)
            .map(|i| self.arena[i].attached)
            .unwrap_or(false)
    }

    /// Awake-capable nodes in registration order.
    pub fn awake_nodes(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.awake.iter().map(|&i| self.handle(i))
    }

    /// Ordered children of a node; empty for unknown handles.
    pub fn children(&self, id: TaskId) -> Vec<TaskId> {
        self.resolve(id)
            .map(|i| {
                self.arena[i]
                    .children
                    .iter()
                    .map(|&c| self.handle(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn task(&self, id: TaskId) -> Option<&dyn Task> {
        let index = self.resolve(id)?;
        Some(self.arena[index].task.as_ref())
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut dyn Task> {
        let index = self.resolve(id)?;
        Some(self.arena[index].task.as_mut())
    }

    /// Move a task into the tree. The task is not part of the hierarchy (and
    /// not registered) until attached with [`add_node`](Self::add_node).
    pub fn spawn(&mut self, task: impl Task) -> TaskId {
        let mut task: Box<dyn Task> = Box::new(task);
        let routing = match task.composition() {
            Some(rule) => Routing::Composite(rule),
            None if task.as_decorator().is_some() => Routing::Decorator,
            None => Routing::Leaf,
        };
        let index = self.arena.insert(Node {
            task,
            parent: None,
            children: Vec::new(),
            routing,
            cursor: 0,
            slots: Vec::new(),
            attached: false,
        });
        self.handle(index)
    }

    /// Attach `child` at the end of `parent`'s ordered children.
    ///
    /// The parent must already be attached (trees build root-down) and the
    /// child must be a spawned, not-yet-attached node of this tree. On
    /// success the child joins the flat registry, the awake sequence (when it
    /// exposes the awake capability and is enabled), and the abort-observer
    /// sequence (when it exposes an abort condition).
    pub fn add_node(&mut self, parent: TaskId, child: TaskId) -> Result<(), TreeError> {
        let parent_index = self
            .resolve(parent)
            .filter(|&i| self.arena[i].attached)
            .ok_or(TreeError::ParentAbsent)?;
        let child_index = self.resolve(child).ok_or(TreeError::ChildAbsent)?;
        if self.arena[child_index].attached {
            return Err(TreeError::ChildAlreadyAttached);
        }

        self.arena[parent_index].children.push(child_index);
        let node = &mut self.arena[child_index];
        node.parent = Some(parent_index);
        node.attached = true;
        self.registry.push(child_index);

        let node = &mut self.arena[child_index];
        if node.task.as_awake().is_some() && node.task.enabled() {
            self.awake.push(child_index);
        }
        if self.arena[child_index].task.as_abort().is_some() {
            self.observers.push(child_index);
        }
        Ok(())
    }

    /// One-time awake pass over the awake sequence, in registration order.
    ///
    /// Idempotent: repeat calls do nothing. Tracked with a per-tree flag so
    /// that tasks whose enabled-ness changes later cannot re-arm it.
    pub fn setup(&mut self) {
        if self.awakened {
            return;
        }
        self.awakened = true;
        for pos in 0..self.awake.len() {
            let index = self.awake[pos];
            let node = &mut self.arena[index];
            if !node.task.enabled() {
                continue;
            }
            if let Some(hook) = node.task.as_awake() {
                hook.awake();
            }
        }
        emit(
            &mut self.blackboard,
            TreeEvent::new(self.tick, "bt.setup").with_data(self.awake.len() as u64),
        );
    }

    /// Tick the tree without a timestep.
    pub fn update(&mut self) {
        self.update_dt(0.0);
    }

    /// Tick the tree.
    ///
    /// A no-op once the tree has finished (terminal root status with `repeat`
    /// unset). Otherwise: conditional aborts are processed first, then the
    /// cursor's node runs (a pinned leaf directly, with no ancestor
    /// retraversal) and terminal statuses climb the parent chain under each
    /// parent's combination rule, running later siblings within the same
    /// call.
    pub fn update_dt(&mut self, dt_seconds: f32) {
        if self.finished {
            return;
        }
        let ctx = TickContext {
            tick: self.tick,
            dt_seconds,
        };
        self.process_aborts(&ctx);
        let entry = self.current;
        let status = self.tick_node(&ctx, entry);
        self.propagate(&ctx, entry, status);
        self.tick += 1;
    }

    /// Reset every task and all resume bookkeeping, retarget the cursor at
    /// the root, and clear the finished state. The awake pass is not
    /// re-armed.
    pub fn reset(&mut self) {
        self.reset_subtree(self.root);
        self.current = self.root;
        self.finished = false;
        self.outcome = None;
    }

    fn handle(&self, index: Index) -> TaskId {
        TaskId {
            tree: self.id,
            index,
        }
    }

    fn resolve(&self, id: TaskId) -> Option<Index> {
        (id.tree == self.id && self.arena.contains(id.index)).then_some(id.index)
    }

    fn tick_node(&mut self, ctx: &TickContext, index: Index) -> TaskStatus {
        match self.arena[index].routing {
            Routing::Leaf => {
                let status = self.arena[index].task.update(ctx, &mut self.blackboard);
                self.current = index;
                status
            }
            Routing::Decorator => self.tick_decorator(ctx, index),
            Routing::Composite(Composition::Parallel) => self.tick_parallel(ctx, index),
            Routing::Composite(rule) => self.tick_ordered(ctx, index, rule),
        }
    }

    /// Sequence/selector evaluation, resuming from the node's stored cursor.
    fn tick_ordered(&mut self, ctx: &TickContext, index: Index, rule: Composition) -> TaskStatus {
        if !self.has_enabled_children(index) {
            let status = self.arena[index].task.update(ctx, &mut self.blackboard);
            self.current = index;
            return status;
        }
        let mut pos = self.arena[index].cursor;
        loop {
            let Some((child_pos, child)) = self.next_enabled_child(index, pos) else {
                // Every enabled child consumed without a short-circuit.
                let status = match rule {
                    Composition::Sequence => TaskStatus::Success,
                    _ => TaskStatus::Failure,
                };
                self.composite_finished(index);
                return status;
            };
            self.arena[index].cursor = child_pos;
            let status = self.tick_node(ctx, child);
            match status {
                TaskStatus::Continue => return TaskStatus::Continue,
                TaskStatus::Success if rule == Composition::Selector => {
                    self.composite_finished(index);
                    return status;
                }
                TaskStatus::Failure if rule == Composition::Sequence => {
                    self.composite_finished(index);
                    return status;
                }
                _ => {
                    pos = child_pos + 1;
                    self.arena[index].cursor = pos;
                }
            }
        }
    }

    fn tick_decorator(&mut self, ctx: &TickContext, index: Index) -> TaskStatus {
        let Some((_, child)) = self.next_enabled_child(index, 0) else {
            let status = self.arena[index].task.update(ctx, &mut self.blackboard);
            self.current = index;
            return status;
        };
        let inner = self.tick_node(ctx, child);
        let status = match self.arena[index].task.as_decorator() {
            Some(d) => d.decorate(inner),
            None => inner,
        };
        if status == TaskStatus::Continue {
            if inner.is_terminal() {
                // Repeat-style decorator: recycle the child subtree and pin
                // the cursor here so the next tick re-runs it.
                self.reset_subtree(child);
                self.current = index;
            }
            return TaskStatus::Continue;
        }
        self.composite_finished(index);
        status
    }

    fn tick_parallel(&mut self, ctx: &TickContext, index: Index) -> TaskStatus {
        if !self.has_enabled_children(index) {
            let status = self.arena[index].task.update(ctx, &mut self.blackboard);
            self.current = index;
            return status;
        }
        let child_count = self.arena[index].children.len();
        if self.arena[index].slots.len() != child_count {
            self.arena[index].slots = vec![None; child_count];
        }
        let mut running = false;
        for pos in 0..child_count {
            let child = self.arena[index].children[pos];
            if !self.arena[child].task.enabled() {
                continue;
            }
            if self.arena[index].slots[pos].is_some() {
                continue;
            }
            match self.tick_node(ctx, child) {
                TaskStatus::Continue => running = true,
                TaskStatus::Failure => {
                    self.composite_finished(index);
                    return TaskStatus::Failure;
                }
                TaskStatus::Success => self.arena[index].slots[pos] = Some(Outcome::Success),
            }
        }
        if running {
            self.current = index;
            return TaskStatus::Continue;
        }
        self.composite_finished(index);
        TaskStatus::Success
    }

    /// Climb terminal statuses from `index` toward the root, advancing
    /// ordered composites to later siblings (which run in this same tick).
    fn propagate(&mut self, ctx: &TickContext, mut index: Index, mut status: TaskStatus) {
        loop {
            if status == TaskStatus::Continue {
                return;
            }
            let Some(parent) = self.arena[index].parent else {
                self.complete(status);
                return;
            };
            match self.arena[parent].routing {
                Routing::Leaf => {
                    // Children under a plain leaf are never routed; the
                    // status climbs straight through.
                    index = parent;
                }
                Routing::Decorator => {
                    let inner = status;
                    let decorated = match self.arena[parent].task.as_decorator() {
                        Some(d) => d.decorate(inner),
                        None => inner,
                    };
                    if decorated == TaskStatus::Continue {
                        self.reset_subtree(index);
                        self.current = parent;
                        return;
                    }
                    self.composite_finished(parent);
                    status = decorated;
                    index = parent;
                }
                Routing::Composite(Composition::Parallel) => {
                    // The cursor pins at the outermost parallel node, so a
                    // terminal status never climbs into one.
                    debug_assert!(false, "terminal status climbed into a parallel parent");
                    self.current = parent;
                    return;
                }
                Routing::Composite(rule) => {
                    let child_pos = self.arena[parent]
                        .children
                        .iter()
                        .position(|&c| c == index)
                        .expect("child is linked under its parent");
                    let advance = matches!(
                        (rule, status),
                        (Composition::Sequence, TaskStatus::Success)
                            | (Composition::Selector, TaskStatus::Failure)
                    );
                    if advance {
                        self.arena[parent].cursor = child_pos + 1;
                        status = self.tick_ordered(ctx, parent, rule);
                    } else {
                        self.composite_finished(parent);
                    }
                    index = parent;
                }
            }
        }
    }

    fn complete(&mut self, status: TaskStatus) {
        self.outcome = status.outcome();
        emit(
            &mut self.blackboard,
            TreeEvent::new(self.tick, "bt.finish").with_data(match status {
                TaskStatus::Success => 1,
                _ => 0,
            }),
        );
        if self.repeat {
            self.reset_subtree(self.root);
            self.current = self.root;
            emit(&mut self.blackboard, TreeEvent::new(self.tick, "bt.repeat"));
        } else {
            self.finished = true;
        }
    }

    /// Re-evaluate abort observers, in attachment (priority) order, before
    /// the cursor resumes. The first observer whose condition holds and that
    /// outranks the running branch interrupts it: the running branch is
    /// reset top-down and the cursor retargets the observer's branch.
    fn process_aborts(&mut self, ctx: &TickContext) {
        if self.current == self.root {
            return;
        }
        for pos in 0..self.observers.len() {
            let obs = self.observers[pos];
            if !self.arena[obs].task.enabled() {
                continue;
            }
            let Some((lca, obs_branch, cur_branch)) = self.interrupt_target(obs) else {
                continue;
            };
            let fired = match self.arena[obs].task.as_abort() {
                Some(cond) => cond.evaluate(ctx, &self.blackboard),
                None => false,
            };
            if !fired {
                continue;
            }
            self.reset_subtree(cur_branch);
            let branch_pos = self.arena[lca]
                .children
                .iter()
                .position(|&c| c == obs_branch)
                .expect("branch is linked under its ancestor");
            self.arena[lca].cursor = branch_pos;
            self.current = obs_branch;
            emit(
                &mut self.blackboard,
                TreeEvent::new(ctx.tick, "bt.abort").with_node(self.handle(obs).slot()),
            );
            return;
        }
    }

    /// Where an abort by `obs` would land: the lowest common ancestor of the
    /// observer and the cursor, the observer-side branch under it, and the
    /// running branch it would displace. `None` when the observer does not
    /// outrank the running branch (it is on the cursor path, the shared
    /// ancestor is not an ordered composite, or its branch comes later).
    fn interrupt_target(&self, obs: Index) -> Option<(Index, Index, Index)> {
        let cur_path = self.path_to_root(self.current);
        if cur_path.contains(&obs) {
            return None;
        }
        let mut branch = obs;
        let mut lca = self.arena[obs].parent?;
        loop {
            if let Some(cur_pos) = cur_path.iter().position(|&n| n == lca) {
                if cur_pos == 0 {
                    return None;
                }
                let cur_branch = cur_path[cur_pos - 1];
                if !matches!(
                    self.arena[lca].routing,
                    Routing::Composite(Composition::Sequence | Composition::Selector)
                ) {
                    return None;
                }
                let children = &self.arena[lca].children;
                let obs_rank = children.iter().position(|&c| c == branch)?;
                let cur_rank = children.iter().position(|&c| c == cur_branch)?;
                return (obs_rank < cur_rank).then_some((lca, branch, cur_branch));
            }
            branch = lca;
            lca = self.arena[lca].parent?;
        }
    }

    fn path_to_root(&self, mut index: Index) -> Vec<Index> {
        let mut path = vec![index];
        while let Some(parent) = self.arena[index].parent {
            path.push(parent);
            index = parent;
        }
        path
    }

    fn has_enabled_children(&self, index: Index) -> bool {
        self.arena[index]
            .children
            .iter()
            .any(|&c| self.arena[c].task.enabled())
    }

    fn next_enabled_child(&self, index: Index, from: usize) -> Option<(usize, Index)> {
        self.arena[index]
            .children
            .iter()
            .enumerate()
            .skip(from)
            .find(|&(_, &c)| self.arena[c].task.enabled())
            .map(|(pos, &c)| (pos, c))
    }

    /// A non-root composite that reached a terminal status starts fresh on
    /// re-entry. The root keeps its terminal state; completion handling
    /// decides whether to repeat.
    fn composite_finished(&mut self, index: Index) {
        if index != self.root {
            self.reset_subtree(index);
        }
    }

    /// Reset a branch top-down: parents before children, tasks and engine
    /// bookkeeping together.
    fn reset_subtree(&mut self, index: Index) {
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            let node = &mut self.arena[i];
            node.cursor = 0;
            node.slots.clear();
            node.task.reset();
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }
}
