#![forbid(unsafe_code)]

//! Scripted replay of editor sessions and golden-output checks.

pub mod cli;
pub mod golden;
pub mod replay;
pub mod script;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use formcraft_runtime::{ConfigError, EditorError};
use formcraft_tree::SnapshotError;

pub use golden::{
    GoldenOutcome, GoldenResult, check_golden, golden_path, is_bless_mode, load_golden,
    save_golden, text_checksum,
};
pub use replay::{ReplayOptions, ReplayReport, replay};
pub use script::{Script, Step};

#[derive(Debug)]
pub enum HarnessError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    Snapshot(SnapshotError),
    Config(ConfigError),
    Editor(EditorError),
    /// Step `index` of the script failed.
    Step { index: usize, source: EditorError },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(err) => write!(f, "invalid script: {err}"),
            Self::Snapshot(err) => write!(f, "invalid document: {err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Editor(err) => write!(f, "{err}"),
            Self::Step { index, source } => write!(f, "step {index}: {source}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Editor(err) => Some(err),
            Self::Step { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<SnapshotError> for HarnessError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

impl From<ConfigError> for HarnessError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<EditorError> for HarnessError {
    fn from(err: EditorError) -> Self {
        Self::Editor(err)
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, HarnessError> {
    fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a saved document from `path`.
pub fn load_document(path: &Path) -> Result<formcraft_tree::ForestSnapshot, HarnessError> {
    let text = read_file(path)?;
    Ok(formcraft_tree::ForestSnapshot::from_json(&text)?)
}
