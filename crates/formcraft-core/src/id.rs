//! Node identifiers and container references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for component nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a new node ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, ModelError> {
        if raw == 0 {
            return Err(ModelError::ZeroNodeId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, ModelError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(ModelError::NodeIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for NodeId {
    type Error = ModelError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Where a node lives: at the top level of the forest, or inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerRef {
    /// The canvas root (top-level forest list).
    Root,
    /// A container node.
    Node(NodeId),
}

impl ContainerRef {
    /// The container's node id, or `None` for the root.
    #[must_use]
    pub const fn node_id(self) -> Option<NodeId> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }
}

impl From<NodeId> for ContainerRef {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Option<NodeId>> for ContainerRef {
    fn from(id: Option<NodeId>) -> Self {
        match id {
            Some(id) => Self::Node(id),
            None => Self::Root,
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Node(id) => write!(f, "node {id}"),
        }
    }
}

/// Monotonic allocator for fresh node IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdAllocator {
    next: NodeId,
}

impl NodeIdAllocator {
    /// Allocator whose first ID is `start`.
    #[must_use]
    pub const fn starting_at(start: NodeId) -> Self {
        Self { next: start }
    }

    /// Allocator that never hands out `highest` or anything below it.
    pub fn starting_after(highest: Option<NodeId>) -> Result<Self, ModelError> {
        let next = match highest {
            Some(id) => id.checked_next()?,
            None => NodeId::MIN,
        };
        Ok(Self { next })
    }

    /// Peek at the next ID without consuming it.
    #[must_use]
    pub const fn peek(&self) -> NodeId {
        self.next
    }

    /// Hand out the next ID.
    pub fn allocate(&mut self) -> Result<NodeId, ModelError> {
        let current = self.next;
        self.next = current.checked_next()?;
        Ok(current)
    }

    /// Make sure `id` will never be handed out.
    pub fn observe(&mut self, id: NodeId) -> Result<(), ModelError> {
        if id >= self.next {
            self.next = id.checked_next()?;
        }
        Ok(())
    }
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self::starting_at(NodeId::MIN)
    }
}

/// Errors raised by the data model itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    ZeroNodeId,
    NodeIdOverflow { current: NodeId },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroNodeId => write!(f, "node id must be non-zero"),
            Self::NodeIdOverflow { current } => write!(f, "node id overflow after {current}"),
        }
    }
}

impl std::error::Error for ModelError {}
