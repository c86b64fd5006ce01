//! Observable holder of the current forest.
//!
//! [`TreeStore`] wraps the pure operations in [`crate::forest`]. Each
//! successful mutation replaces the held forest in one assignment, bumps the
//! revision, and synchronously notifies every registered listener with a
//! [`TreeChange`]. Removing or updating a node that is already gone is a
//! no-op reported through the return value, never an error.

use std::fmt;
use std::sync::Arc;

use formcraft_core::{
    ComponentNode, ContainerRef, ElementType, NodeId, NodeIdAllocator, PatchReport, PropertyPatch,
};

use crate::error::TreeError;
use crate::forest::{self, Forest};
use crate::snapshot::{ForestSnapshot, SnapshotError};

/// Handle returned by [`TreeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// What produced a [`TreeChange`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeCause {
    Inserted {
        node_id: NodeId,
        parent: ContainerRef,
        index: usize,
    },
    Removed {
        node_id: NodeId,
    },
    Moved {
        node_id: NodeId,
        parent: ContainerRef,
        index: usize,
    },
    Updated {
        node_id: NodeId,
        report: PatchReport,
    },
    Relabeled {
        node_id: NodeId,
    },
    Replaced,
}

impl ChangeCause {
    /// Short operation name for logs.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Inserted { .. } => "insert",
            Self::Removed { .. } => "remove",
            Self::Moved { .. } => "move",
            Self::Updated { .. } => "update",
            Self::Relabeled { .. } => "relabel",
            Self::Replaced => "replace",
        }
    }

    /// The node the change is about, if any.
    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Inserted { node_id, .. }
            | Self::Removed { node_id }
            | Self::Moved { node_id, .. }
            | Self::Updated { node_id, .. }
            | Self::Relabeled { node_id } => Some(*node_id),
            Self::Replaced => None,
        }
    }
}

/// Notification delivered to listeners after every committed mutation.
#[derive(Debug, Clone)]
pub struct TreeChange {
    pub revision: u64,
    pub forest: Arc<Forest>,
    pub cause: ChangeCause,
}

type Listener = Box<dyn FnMut(&TreeChange)>;

/// The current forest plus its listeners.
pub struct TreeStore {
    forest: Arc<Forest>,
    revision: u64,
    ids: NodeIdAllocator,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeStore")
            .field("revision", &self.revision)
            .field("nodes", &forest::node_count(&self.forest))
            .field("next_id", &self.ids.peek())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    /// An empty store at revision 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            forest: Arc::new(Vec::new()),
            revision: 0,
            ids: NodeIdAllocator::default(),
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    /// A store holding `forest`, validated and with id allocation seeded
    /// past its highest id.
    pub fn with_forest(forest: Forest) -> Result<Self, TreeError> {
        forest::validate(&forest)?;
        let ids = NodeIdAllocator::starting_after(forest::max_id(&forest))?;
        Ok(Self {
            forest: Arc::new(forest),
            ids,
            ..Self::new()
        })
    }

    /// The current forest. Cheap to clone and never mutated in place.
    #[must_use]
    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Arc<ComponentNode>> {
        forest::find_by_id(&self.forest, id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Register a listener, called synchronously after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&TreeChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Reserve a fresh node id.
    pub fn allocate_id(&mut self) -> Result<NodeId, TreeError> {
        Ok(self.ids.allocate()?)
    }

    /// Insert a prebuilt node (and subtree).
    pub fn insert(
        &mut self,
        node: impl Into<Arc<ComponentNode>>,
        parent: ContainerRef,
        index: usize,
    ) -> Result<NodeId, TreeError> {
        let node = node.into();
        let node_id = node.id();
        let next = forest::insert(&self.forest, Arc::clone(&node), parent, index)
            .inspect_err(|err| {
                formcraft_core::warn!(op = "insert", node = node_id.get(), error = %err, "insert rejected");
                let _ = err;
            })?;
        let mut incoming = Vec::new();
        node.collect_ids(&mut incoming);
        for id in incoming {
            self.ids.observe(id)?;
        }
        let index = forest::position_of(&next, node_id).map_or(index, |(_, pos)| pos);
        self.commit(
            next,
            ChangeCause::Inserted {
                node_id,
                parent,
                index,
            },
        );
        Ok(node_id)
    }

    /// Create a node of type `ty` with default properties and insert it.
    pub fn insert_new(
        &mut self,
        ty: ElementType,
        parent: ContainerRef,
        index: usize,
    ) -> Result<NodeId, TreeError> {
        forest::children_of(&self.forest, parent)?;
        let id = self.allocate_id()?;
        self.insert(ComponentNode::new(id, ty), parent, index)
    }

    /// Remove node `id` and its subtree. `None` when it was already gone.
    pub fn remove(&mut self, id: NodeId) -> Option<Arc<ComponentNode>> {
        let (next, removed) = forest::remove(&self.forest, id);
        match removed {
            Some(removed) => {
                self.commit(next, ChangeCause::Removed { node_id: id });
                Some(removed)
            }
            None => {
                formcraft_core::debug!(op = "remove", node = id.get(), "node already gone");
                None
            }
        }
    }

    /// Move node `id` under `parent` at `index` (post-removal coordinates).
    pub fn move_node(
        &mut self,
        id: NodeId,
        parent: ContainerRef,
        index: usize,
    ) -> Result<(), TreeError> {
        let next = forest::move_node(&self.forest, id, parent, index)
            .inspect_err(|err| {
                formcraft_core::warn!(op = "move", node = id.get(), error = %err, "move rejected");
                let _ = err;
            })?;
        let index = forest::position_of(&next, id).map_or(index, |(_, pos)| pos);
        self.commit(
            next,
            ChangeCause::Moved {
                node_id: id,
                parent,
                index,
            },
        );
        Ok(())
    }

    /// Merge `patch` into node `id`. `None` when the node is gone.
    pub fn update_properties(&mut self, id: NodeId, patch: &PropertyPatch) -> Option<PatchReport> {
        match forest::update_properties(&self.forest, id, patch) {
            Ok((next, report)) => {
                if !report.is_clean() {
                    formcraft_core::warn!(
                        op = "update",
                        node = id.get(),
                        rejected = ?report.rejected,
                        "property values with the wrong shape were ignored"
                    );
                }
                self.commit(
                    next,
                    ChangeCause::Updated {
                        node_id: id,
                        report: report.clone(),
                    },
                );
                Some(report)
            }
            Err(_) => {
                formcraft_core::debug!(op = "update", node = id.get(), "node already gone");
                None
            }
        }
    }

    /// Change a node's editor label. Returns `false` when the node is gone.
    pub fn relabel(&mut self, id: NodeId, label: &str) -> bool {
        match forest::relabel(&self.forest, id, label) {
            Ok(next) => {
                self.commit(next, ChangeCause::Relabeled { node_id: id });
                true
            }
            Err(_) => false,
        }
    }

    /// Replace the whole forest, e.g. after loading a document.
    pub fn replace(&mut self, forest: Forest) -> Result<(), TreeError> {
        forest::validate(&forest)?;
        if let Some(max) = forest::max_id(&forest) {
            self.ids.observe(max)?;
        }
        self.commit(forest, ChangeCause::Replaced);
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> ForestSnapshot {
        ForestSnapshot::capture(&self.forest)
    }

    /// Replace the forest with the one `snapshot` describes.
    pub fn restore(&mut self, snapshot: &ForestSnapshot) -> Result<(), SnapshotError> {
        let forest = snapshot.restore()?;
        self.replace(forest)?;
        Ok(())
    }

    fn commit(&mut self, next: Forest, cause: ChangeCause) {
        self.forest = Arc::new(next);
        self.revision += 1;
        formcraft_core::debug!(
            op = cause.op(),
            node = cause.node_id().map(NodeId::get),
            revision = self.revision,
            "tree committed"
        );
        if self.listeners.is_empty() {
            return;
        }
        let change = TreeChange {
            revision: self.revision,
            forest: Arc::clone(&self.forest),
            cause,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}
