use std::cell::Cell;
use std::rc::Rc;

use arbor_core::{Blackboard, EventAwake, Task, TaskStatus, TickContext};
use arbor_tree::{BehaviorTree, GenericAction, TreeError};

/// Leaf stub exposing the awake capability and a fixed enabled flag.
struct AwakeStub {
    enabled: bool,
    awakes: Rc<Cell<u32>>,
}

impl AwakeStub {
    fn new(awakes: Rc<Cell<u32>>) -> Self {
        Self {
            enabled: true,
            awakes,
        }
    }

    fn disabled(awakes: Rc<Cell<u32>>) -> Self {
        Self {
            enabled: false,
            awakes,
        }
    }
}

impl EventAwake for AwakeStub {
    fn awake(&mut self) {
        self.awakes.set(self.awakes.get() + 1);
    }
}

impl Task for AwakeStub {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> TaskStatus {
        TaskStatus::Success
    }

    fn as_awake(&mut self) -> Option<&mut dyn EventAwake> {
        Some(self)
    }
}

#[test]
fn current_is_root_before_any_update() {
    let tree = BehaviorTree::new();
    assert_eq!(tree.current(), tree.root());
}

#[test]
fn root_is_registered_at_construction() {
    let tree = BehaviorTree::new();
    assert!(tree.contains(tree.root()));
    assert_eq!(tree.nodes().next(), Some(tree.root()));
}

#[test]
fn setup_fires_awake_on_enabled_tasks() {
    let awakes = Rc::new(Cell::new(0));
    let mut tree = BehaviorTree::new();
    let node = tree.spawn(AwakeStub::new(awakes.clone()));
    tree.add_node(tree.root(), node).unwrap();

    tree.setup();

    assert_eq!(awakes.get(), 1);
}

#[test]
fn calling_setup_again_does_not_refire_awake() {
    let awakes = Rc::new(Cell::new(0));
    let mut tree = BehaviorTree::new();
    let node = tree.spawn(AwakeStub::new(awakes.clone()));
    tree.add_node(tree.root(), node).unwrap();

    tree.setup();
    tree.setup();

    assert_eq!(awakes.get(), 1);
}

#[test]
fn disabled_task_is_excluded_from_the_awake_sequence() {
    let awakes = Rc::new(Cell::new(0));
    let mut tree = BehaviorTree::new();
    let node = tree.spawn(AwakeStub::disabled(awakes.clone()));
    tree.add_node(tree.root(), node).unwrap();

    assert!(!tree.awake_nodes().any(|n| n == node));
    tree.setup();
    assert_eq!(awakes.get(), 0);
}

#[test]
fn add_node_appends_children_in_order() {
    let mut tree = BehaviorTree::new();
    let first = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    let second = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    tree.add_node(tree.root(), first).unwrap();
    tree.add_node(tree.root(), second).unwrap();

    assert_eq!(tree.children(tree.root()), vec![first, second]);
}

#[test]
fn add_node_registers_the_child() {
    let mut tree = BehaviorTree::new();
    let node = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    tree.add_node(tree.root(), node).unwrap();

    assert!(tree.contains(node));
    assert!(tree.nodes().any(|n| n == node));
}

#[test]
fn add_node_records_the_owner() {
    let mut tree = BehaviorTree::new();
    let node = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    tree.add_node(tree.root(), node).unwrap();

    assert_eq!(node.owner(), tree.id());
}

#[test]
fn awake_capable_child_joins_the_awake_sequence() {
    let mut tree = BehaviorTree::new();
    let plain = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    let awake = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success).with_awake(|| {}));
    tree.add_node(tree.root(), plain).unwrap();
    tree.add_node(tree.root(), awake).unwrap();

    let awake_nodes: Vec<_> = tree.awake_nodes().collect();
    assert_eq!(awake_nodes, vec![awake]);
}

#[test]
fn add_node_rejects_an_absent_parent() {
    let other = BehaviorTree::new();
    let foreign_parent = other.root();

    let mut tree = BehaviorTree::new();
    let child = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));

    assert_eq!(
        tree.add_node(foreign_parent, child),
        Err(TreeError::ParentAbsent)
    );
    assert!(tree.children(tree.root()).is_empty());
    assert!(!tree.contains(child));
}

#[test]
fn add_node_rejects_a_detached_parent() {
    let mut tree = BehaviorTree::new();
    let floating = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    let child = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));

    assert_eq!(tree.add_node(floating, child), Err(TreeError::ParentAbsent));
    assert!(!tree.contains(child));
}

#[test]
fn add_node_rejects_an_absent_child() {
    let mut other = BehaviorTree::new();
    let foreign_child = other.spawn(GenericAction::new(|_, _| TaskStatus::Success));

    let mut tree = BehaviorTree::new();

    assert_eq!(
        tree.add_node(tree.root(), foreign_child),
        Err(TreeError::ChildAbsent)
    );
    assert!(tree.children(tree.root()).is_empty());
}

#[test]
fn add_node_rejects_reattachment() {
    let mut tree = BehaviorTree::new();
    let a = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    let b = tree.spawn(GenericAction::new(|_, _| TaskStatus::Success));
    tree.add_node(tree.root(), a).unwrap();
    tree.add_node(tree.root(), b).unwrap();

    assert_eq!(
        tree.add_node(a, b),
        Err(TreeError::ChildAlreadyAttached)
    );
    assert_eq!(tree.children(tree.root()), vec![a, b]);
}

#[test]
fn attach_errors_name_the_absent_argument() {
    assert_eq!(
        TreeError::ParentAbsent.to_string(),
        "parent node is absent from the tree"
    );
    assert_eq!(
        TreeError::ChildAbsent.to_string(),
        "child node is absent from the tree"
    );
}
