#![forbid(unsafe_code)]

//! Layout-facing side of drag and drop: host geometry snapshots, drop-target
//! resolution, and auto-scroll near viewport edges.

pub mod autoscroll;
pub mod resolver;
pub mod snapshot;

pub use autoscroll::{AutoScroll, DEFAULT_EDGE_BAND, DEFAULT_SCROLL_STEP, ScrollNudge};
pub use resolver::{DEFAULT_INDICATOR_THICKNESS, DropTarget, Resolver, ResolverConfig, resolve};
pub use snapshot::{BoxEntry, GeometryProvider, LayoutSnapshot};
