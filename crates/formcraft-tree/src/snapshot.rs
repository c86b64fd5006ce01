//! JSON snapshots of a forest.
//!
//! A snapshot stores each node as a [`NodeRecord`] carrying its type string
//! and a flat property map, so a snapshot written by a newer build with
//! extra element types still loads: unrecognised types come back as
//! [`ComponentKind::Unknown`] nodes and keep their properties verbatim.

use std::fmt;
use std::sync::Arc;

use formcraft_core::{ComponentKind, ComponentNode, ElementType, NodeId, PropertyPatch};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::forest::{Forest, validate};

/// Current snapshot schema version.
pub const FOREST_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    FOREST_SCHEMA_VERSION
}

/// One serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "PropertyPatch::is_empty")]
    pub properties: PropertyPatch,
    /// Present for containers (possibly empty), absent for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeRecord>>,
}

impl NodeRecord {
    #[must_use]
    pub fn capture(node: &ComponentNode) -> Self {
        Self {
            id: node.id(),
            element_type: node.type_name().to_string(),
            label: Some(node.label().to_string()),
            properties: node.properties(),
            children: node
                .children()
                .map(|children| children.iter().map(|c| Self::capture(c)).collect()),
        }
    }

    /// Rebuild the node this record describes.
    pub fn restore(&self) -> Result<ComponentNode, SnapshotError> {
        let Ok(ty) = self.element_type.parse::<ElementType>() else {
            if self.children.is_some() {
                return Err(self.children_on_leaf());
            }
            formcraft_core::warn!(
                node = self.id.get(),
                element_type = %self.element_type,
                "unknown element type kept as placeholder"
            );
            let label = self.label.clone().unwrap_or_else(|| self.element_type.clone());
            return Ok(ComponentNode::from_kind(
                self.id,
                label,
                ComponentKind::Unknown {
                    type_name: self.element_type.clone(),
                    properties: self.properties.clone().into_map(),
                },
            ));
        };

        let mut node = ComponentNode::new(self.id, ty);
        if let Some(label) = &self.label {
            node.set_label(label.as_str());
        }
        let report = node.apply_patch(&self.properties);
        if !report.is_clean() {
            formcraft_core::warn!(
                node = self.id.get(),
                rejected = ?report.rejected,
                "snapshot properties with the wrong shape were ignored"
            );
        }

        match &self.children {
            None => Ok(node),
            Some(records) => {
                let children = records
                    .iter()
                    .map(|record| record.restore().map(Arc::new))
                    .collect::<Result<Vec<_>, _>>()?;
                node.with_children(children)
                    .ok_or_else(|| self.children_on_leaf())
            }
        }
    }

    fn children_on_leaf(&self) -> SnapshotError {
        SnapshotError::ChildrenOnLeaf {
            node_id: self.id,
            element_type: self.element_type.clone(),
        }
    }
}

/// Serializable form of a whole forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub nodes: Vec<NodeRecord>,
}

impl Default for ForestSnapshot {
    fn default() -> Self {
        Self {
            schema_version: FOREST_SCHEMA_VERSION,
            nodes: Vec::new(),
        }
    }
}

impl ForestSnapshot {
    #[must_use]
    pub fn capture(forest: &[Arc<ComponentNode>]) -> Self {
        Self {
            schema_version: FOREST_SCHEMA_VERSION,
            nodes: forest.iter().map(|node| NodeRecord::capture(node)).collect(),
        }
    }

    /// Rebuild the forest, rejecting unsupported versions and duplicate ids.
    pub fn restore(&self) -> Result<Forest, SnapshotError> {
        if self.schema_version != FOREST_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedSchemaVersion {
                version: self.schema_version,
                expected: FOREST_SCHEMA_VERSION,
            });
        }
        let forest = self
            .nodes
            .iter()
            .map(|record| record.restore().map(Arc::new))
            .collect::<Result<Forest, _>>()?;
        validate(&forest)?;
        Ok(forest)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Failures while loading or saving a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedSchemaVersion { version: u16, expected: u16 },
    ChildrenOnLeaf { node_id: NodeId, element_type: String },
    Tree(TreeError),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid snapshot json: {err}"),
            Self::UnsupportedSchemaVersion { version, expected } => write!(
                f,
                "unsupported snapshot schema version {version} (expected {expected})"
            ),
            Self::ChildrenOnLeaf {
                node_id,
                element_type,
            } => write!(
                f,
                "node {node_id} of type {element_type:?} cannot have children"
            ),
            Self::Tree(err) => write!(f, "invalid forest: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Tree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<TreeError> for SnapshotError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}
