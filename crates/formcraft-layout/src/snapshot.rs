//! Geometry snapshots supplied by the host.
//!
//! The resolver never measures anything itself. The host registers one
//! [`BoxEntry`] per rendered box (the canvas root, every container and every
//! leaf) in document order, parents before their children, and hands the
//! resulting [`LayoutSnapshot`] over through a [`GeometryProvider`].

use formcraft_core::{ContainerRef, LayoutAxis, NodeId, Rect, Sides};
use serde::{Deserialize, Serialize};

/// One measured box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxEntry {
    /// The canvas root or the node this box renders.
    pub target: ContainerRef,
    pub rect: Rect,
    /// Present on droppable boxes (the root and containers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<LayoutAxis>,
    #[serde(default)]
    pub padding: Sides,
    /// Owning container; `None` only for the canvas root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ContainerRef>,
}

impl BoxEntry {
    #[must_use]
    pub const fn is_droppable(&self) -> bool {
        self.axis.is_some()
    }

    /// The rect inset by padding.
    #[must_use]
    pub fn content(&self) -> Rect {
        self.rect.inner(self.padding)
    }

    #[must_use]
    pub const fn node_id(&self) -> Option<NodeId> {
        self.target.node_id()
    }
}

/// All boxes measured for one frame, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    entries: Vec<BoxEntry>,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the canvas root.
    #[must_use]
    pub fn with_root(mut self, rect: Rect, axis: LayoutAxis, padding: Sides) -> Self {
        self.entries.push(BoxEntry {
            target: ContainerRef::Root,
            rect,
            axis: Some(axis),
            padding,
            parent: None,
        });
        self
    }

    /// Register a container box.
    #[must_use]
    pub fn with_container(
        mut self,
        id: NodeId,
        parent: ContainerRef,
        rect: Rect,
        axis: LayoutAxis,
        padding: Sides,
    ) -> Self {
        self.entries.push(BoxEntry {
            target: ContainerRef::Node(id),
            rect,
            axis: Some(axis),
            padding,
            parent: Some(parent),
        });
        self
    }

    /// Register a leaf box.
    #[must_use]
    pub fn with_leaf(mut self, id: NodeId, parent: ContainerRef, rect: Rect) -> Self {
        self.entries.push(BoxEntry {
            target: ContainerRef::Node(id),
            rect,
            axis: None,
            padding: Sides::default(),
            parent: Some(parent),
        });
        self
    }

    pub fn push(&mut self, entry: BoxEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[BoxEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, target: ContainerRef) -> Option<&BoxEntry> {
        self.entries.iter().find(|entry| entry.target == target)
    }

    /// Boxes directly inside `parent`, in registration order.
    pub fn children_of(&self, parent: ContainerRef) -> impl Iterator<Item = &BoxEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.parent == Some(parent))
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

/// Source of geometry for drop resolution.
pub trait GeometryProvider {
    /// Measure the current layout.
    fn snapshot(&self) -> LayoutSnapshot;
}

impl GeometryProvider for LayoutSnapshot {
    fn snapshot(&self) -> LayoutSnapshot {
        self.clone()
    }
}
