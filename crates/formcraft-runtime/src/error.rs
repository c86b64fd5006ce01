use std::fmt;

use formcraft_core::ElementTypeParseError;
use formcraft_tree::{SnapshotError, TreeError};

use crate::config::ConfigError;

/// Failures surfaced by [`crate::Editor`] operations.
#[derive(Debug)]
pub enum EditorError {
    /// A palette request named a type the editor does not know.
    UnknownElementType(ElementTypeParseError),
    Tree(TreeError),
    Snapshot(SnapshotError),
    Config(ConfigError),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElementType(err) => write!(f, "cannot add element: {err}"),
            Self::Tree(err) => write!(f, "tree operation failed: {err}"),
            Self::Snapshot(err) => write!(f, "cannot load document: {err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownElementType(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ElementTypeParseError> for EditorError {
    fn from(err: ElementTypeParseError) -> Self {
        Self::UnknownElementType(err)
    }
}

impl From<TreeError> for EditorError {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<SnapshotError> for EditorError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

impl From<ConfigError> for EditorError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
