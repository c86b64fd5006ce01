//! Signals exchanged over the editor's [`EventChannel`](formcraft_core::EventChannel).
//!
//! Requests flow in from the host (palette, property panel, keyboard);
//! notifications flow out of the [`crate::Editor`].

use std::sync::Arc;

use formcraft_core::{ContainerRef, NodeId, PropertyPatch};
use formcraft_tree::ChangeCause;

use crate::session::{DragPayload, RejectReason};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Palette click-to-add. `element_type` is the wire name and may be
    /// unknown.
    NewElementRequested {
        element_type: String,
        parent: ContainerRef,
        index: usize,
    },
    PropertyChanged {
        node_id: NodeId,
        patch: PropertyPatch,
    },
    DeleteRequested {
        node_id: NodeId,
    },
    /// A tree mutation was committed.
    TreeChanged {
        revision: u64,
        cause: ChangeCause,
    },
    MarkupRegenerated {
        revision: u64,
        markup: Arc<str>,
    },
    DropRejected {
        payload: DragPayload,
        reason: RejectReason,
    },
    SelectionChanged {
        selected: Option<NodeId>,
    },
}

impl EditorEvent {
    /// Whether this is a request the editor acts on, as opposed to a
    /// notification it publishes.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(
            self,
            Self::NewElementRequested { .. }
                | Self::PropertyChanged { .. }
                | Self::DeleteRequested { .. }
        )
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewElementRequested { .. } => "new_element_requested",
            Self::PropertyChanged { .. } => "property_changed",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::TreeChanged { .. } => "tree_changed",
            Self::MarkupRegenerated { .. } => "markup_regenerated",
            Self::DropRejected { .. } => "drop_rejected",
            Self::SelectionChanged { .. } => "selection_changed",
        }
    }
}
