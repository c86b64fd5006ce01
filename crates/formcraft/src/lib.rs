#![forbid(unsafe_code)]

//! Formcraft public facade crate.
//!
//! Re-exports the model, tree store, geometry resolver and markup generator,
//! plus the editor runtime when the `runtime` feature is on (the default).

// --- Model re-exports ------------------------------------------------------

pub use formcraft_core::{
    ComponentKind, ComponentNode, ContainerLayout, ContainerProps, ContainerRef, ElementType,
    EventChannel, LayoutAxis, NodeId, Point, PropertyPatch, PropertyValue, Rect, Sides,
};

// --- Tree re-exports -------------------------------------------------------

pub use formcraft_tree::{Forest, ForestSnapshot, TreeChange, TreeError, TreeStore};

// --- Layout re-exports -----------------------------------------------------

pub use formcraft_layout::{
    AutoScroll, DropTarget, GeometryProvider, LayoutSnapshot, Resolver, ScrollNudge,
};

// --- Markup re-exports -----------------------------------------------------

pub use formcraft_markup::MarkupRenderer;

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use formcraft_runtime::{
    DragEffect, DragPayload, DragSession, DragTransition, Editor, EditorConfig, EditorError,
    EditorEvent,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ComponentNode, ContainerRef, ElementType, LayoutSnapshot, MarkupRenderer, NodeId, Point,
        PropertyPatch, Rect, TreeStore,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{DragPayload, Editor, EditorConfig, EditorEvent};

    pub use crate::{core, layout, markup, tree};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use formcraft_core as core;
pub use formcraft_layout as layout;
pub use formcraft_markup as markup;
#[cfg(feature = "runtime")]
pub use formcraft_runtime as runtime;
pub use formcraft_tree as tree;
