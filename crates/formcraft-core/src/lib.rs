#![forbid(unsafe_code)]

//! Core: geometry primitives, the component data model, and the event channel.

pub mod channel;
pub mod component;
pub mod element;
pub mod geometry;
pub mod id;
pub mod logging;
pub mod property;

pub use channel::{EventChannel, SubscriptionId};
pub use component::{
    ButtonProps, ButtonType, CheckboxProps, ChoiceProps, ComponentKind, ComponentNode,
    ContainerLayout, ContainerProps, HeadingProps, InputProps, NumberProps, ParagraphProps,
    TextareaProps,
};
pub use element::{ElementType, ElementTypeParseError};
pub use geometry::{LayoutAxis, Point, Rect, Sides};
pub use id::{ContainerRef, ModelError, NodeId, NodeIdAllocator};
pub use property::{PatchReport, PropertyPatch, PropertyValue};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
