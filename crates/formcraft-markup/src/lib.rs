#![forbid(unsafe_code)]

//! Markup generation: a deterministic, escaped HTML rendering of the
//! component forest.

pub mod escape;
pub mod renderer;

pub use escape::{escape, escape_into};
pub use renderer::{MarkupRenderer, container_style, render};
