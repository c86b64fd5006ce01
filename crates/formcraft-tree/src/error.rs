use std::fmt;

use formcraft_core::{ModelError, NodeId};

/// Structural failures of forest operations.
///
/// A failed operation leaves the forest untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    UnknownNode {
        node_id: NodeId,
    },
    UnknownContainer {
        container: NodeId,
    },
    NotAContainer {
        node_id: NodeId,
    },
    /// Moving `node_id` under `target` would make it its own descendant.
    CycleRejected {
        node_id: NodeId,
        target: NodeId,
    },
    DuplicateId {
        node_id: NodeId,
    },
    IdOverflow(ModelError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { node_id } => write!(f, "node {node_id} not found"),
            Self::UnknownContainer { container } => {
                write!(f, "container {container} not found")
            }
            Self::NotAContainer { node_id } => {
                write!(f, "node {node_id} cannot contain children")
            }
            Self::CycleRejected { node_id, target } => write!(
                f,
                "moving node {node_id} into {target} would create a cycle"
            ),
            Self::DuplicateId { node_id } => {
                write!(f, "node id {node_id} is already present in the forest")
            }
            Self::IdOverflow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::IdOverflow(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<ModelError> for TreeError {
    fn from(err: ModelError) -> Self {
        Self::IdOverflow(err)
    }
}
