use thiserror::Error;

/// Attachment-time violations.
///
/// All of these fail fast and leave the tree unmodified; there is no partial
/// attach. Task-level faults during awake/update are not represented here;
/// the engine lets them surface to the caller unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The parent handle does not resolve to an attached node of this tree.
    #[error("parent node is absent from the tree")]
    ParentAbsent,

    /// The child handle does not resolve to a node of this tree.
    #[error("child node is absent from the tree")]
    ChildAbsent,

    /// The child already has a parent; nodes are never shared between
    /// parents or trees.
    #[error("child node is already attached to a parent")]
    ChildAlreadyAttached,
}
