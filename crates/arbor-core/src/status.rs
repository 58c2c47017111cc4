#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-tick result of a task.
///
/// `Continue` means "still running, resume me next tick". `Success` and
/// `Failure` are terminal for the reporting node; the parent's combination
/// rule decides what they mean for the rest of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TaskStatus {
    Success,
    Failure,
    Continue,
}

/// Terminal result of a node or of a whole tree run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for TaskStatus {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Success => TaskStatus::Success,
            Outcome::Failure => TaskStatus::Failure,
        }
    }
}

impl TaskStatus {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            TaskStatus::Success => Some(Outcome::Success),
            TaskStatus::Failure => Some(Outcome::Failure),
            TaskStatus::Continue => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.outcome().is_some()
    }
}
