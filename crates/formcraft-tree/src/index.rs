//! Derived parent lookup.
//!
//! Nodes never store their parent. When a caller needs many parent lookups
//! against one forest revision it builds a [`ParentIndex`] once and queries
//! that instead of walking the tree per lookup.

use std::collections::HashMap;
use std::sync::Arc;

use formcraft_core::{ComponentNode, ContainerRef, NodeId};

use crate::forest::walk;

/// Id → (owner, position) map for one forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentIndex {
    entries: HashMap<NodeId, (ContainerRef, usize)>,
}

impl ParentIndex {
    #[must_use]
    pub fn build(forest: &[Arc<ComponentNode>]) -> Self {
        let mut entries = HashMap::new();
        walk(forest, &mut |node, owner, pos| {
            entries.insert(node.id(), (owner, pos));
        });
        Self { entries }
    }

    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<ContainerRef> {
        self.entries.get(&id).map(|(owner, _)| *owner)
    }

    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Option<(ContainerRef, usize)> {
        self.entries.get(&id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Container ids from the direct parent up to the outermost one.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(ContainerRef::Node(parent)) = cursor {
            out.push(parent);
            cursor = self.parent_of(parent);
        }
        out
    }

    /// Whether `candidate` lies strictly below `ancestor`.
    #[must_use]
    pub fn is_descendant(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        self.ancestors(candidate).contains(&ancestor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
