#![forbid(unsafe_code)]

//! Runtime: drag sessions, debounced markup regeneration, configuration, and
//! the [`Editor`] that ties the tree store, resolver and renderer together.

pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod scheduler;
pub mod session;

pub use config::{
    ConfigError, DEFAULT_CLASS_PREFIX, DEFAULT_DEBOUNCE, DEFAULT_MAX_WAIT, EditorConfig,
};
pub use editor::Editor;
pub use error::EditorError;
pub use event::EditorEvent;
pub use scheduler::RegenScheduler;
pub use session::{
    CancelReason, DragEffect, DragFeedback, DragPayload, DragSession, DragSessionState,
    DragTransition, NoopReason, RejectReason,
};
