//! Replay scripts.
//!
//! A script is a JSON document describing the canvas geometry and a list of
//! editor steps:
//!
//! ```json
//! {
//!   "viewport": {"x": 0, "y": 0, "width": 400, "height": 600},
//!   "geometry": {"entries": [{"target": "root", "rect": {"x": 0, "y": 0, "width": 400, "height": 600}, "axis": "column"}]},
//!   "steps": [
//!     {"op": "start_new", "element_type": "text-input", "at": {"x": 10, "y": 10}},
//!     {"op": "move", "to": {"x": 200, "y": 300}},
//!     {"op": "drop"}
//!   ]
//! }
//! ```

use std::path::Path;

use formcraft_core::{ContainerRef, NodeId, Point, PropertyPatch, Rect};
use formcraft_layout::LayoutSnapshot;
use serde::{Deserialize, Serialize};

use crate::HarnessError;

const fn default_viewport() -> Rect {
    Rect::new(0.0, 0.0, 1024.0, 768.0)
}

const fn root_container() -> ContainerRef {
    ContainerRef::Root
}

const fn append_index() -> usize {
    usize::MAX
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Scroll viewport for auto-scroll evaluation.
    #[serde(default = "default_viewport")]
    pub viewport: Rect,
    /// Geometry reported for pointer moves until a `geometry` step replaces it.
    #[serde(default)]
    pub geometry: LayoutSnapshot,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = crate::read_file(path)?;
        Self::from_json(&text)
    }
}

/// One scripted editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Start dragging a new palette element.
    StartNew {
        element_type: String,
        #[serde(default)]
        at: Point,
    },
    /// Start dragging a node already on the canvas.
    StartExisting {
        node_id: NodeId,
        #[serde(default)]
        at: Point,
    },
    Move {
        to: Point,
    },
    Drop,
    Cancel,
    SetProperty {
        node_id: NodeId,
        properties: PropertyPatch,
    },
    Delete {
        node_id: NodeId,
    },
    Select {
        node_id: NodeId,
    },
    /// Palette click-to-add; appends unless `index` is given.
    Add {
        element_type: String,
        #[serde(default = "root_container")]
        parent: ContainerRef,
        #[serde(default = "append_index")]
        index: usize,
    },
    /// Replace the geometry used by later moves.
    Geometry {
        snapshot: LayoutSnapshot,
    },
}

impl Step {
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::StartNew { .. } => "start_new",
            Self::StartExisting { .. } => "start_existing",
            Self::Move { .. } => "move",
            Self::Drop => "drop",
            Self::Cancel => "cancel",
            Self::SetProperty { .. } => "set_property",
            Self::Delete { .. } => "delete",
            Self::Select { .. } => "select",
            Self::Add { .. } => "add",
            Self::Geometry { .. } => "geometry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_step_kind() {
        let script = Script::from_json(
            r#"{
                "steps": [
                    {"op": "start_new", "element_type": "select"},
                    {"op": "start_existing", "node_id": 3, "at": {"x": 1, "y": 2}},
                    {"op": "move", "to": {"x": 5, "y": 6}},
                    {"op": "drop"},
                    {"op": "cancel"},
                    {"op": "set_property", "node_id": 3, "properties": {"label": "Age", "min": 18}},
                    {"op": "delete", "node_id": 3},
                    {"op": "select", "node_id": 4},
                    {"op": "add", "element_type": "button"},
                    {"op": "add", "element_type": "button", "parent": {"node": 4}, "index": 0},
                    {"op": "geometry", "snapshot": {"entries": []}}
                ]
            }"#,
        )
        .expect("valid script");

        let ops: Vec<&str> = script.steps.iter().map(Step::op).collect();
        assert_eq!(
            ops,
            [
                "start_new",
                "start_existing",
                "move",
                "drop",
                "cancel",
                "set_property",
                "delete",
                "select",
                "add",
                "add",
                "geometry"
            ]
        );
        assert_eq!(script.viewport, default_viewport());
        assert_eq!(
            script.steps[8],
            Step::Add {
                element_type: "button".into(),
                parent: ContainerRef::Root,
                index: usize::MAX,
            }
        );
    }

    #[test]
    fn zero_node_id_is_rejected() {
        assert!(Script::from_json(r#"{"steps": [{"op": "delete", "node_id": 0}]}"#).is_err());
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = Script::from_json(r#"{"steps": [{"op": "teleport"}]}"#).expect_err("bad op");
        assert!(matches!(err, HarnessError::Json(_)));
    }
}
