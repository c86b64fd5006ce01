//! Component nodes and their typed property sets.
//!
//! Every element type is a distinct [`ComponentKind`] variant carrying only the
//! properties valid for that type. Containers own their children inside the
//! variant, so a leaf node has no children field at all.
//!
//! # Invariants
//!
//! 1. Only [`ComponentKind::Container`] owns children.
//! 2. Children are shared (`Arc`) so tree edits can rebuild just the path to
//!    the touched node.
//! 3. Nodes carry no parent pointer; ownership is defined by nesting alone.
//!
//! # Property patches
//!
//! [`ComponentNode::apply_patch`] shallow-merges a [`PropertyPatch`]. Keys that
//! name a typed property are assigned when the value has the right shape and
//! rejected otherwise. Keys the type does not know are kept in the node's
//! extension bag, so the schema stays open.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::element::ElementType;
use crate::geometry::LayoutAxis;
use crate::id::NodeId;
use crate::property::{PatchReport, PropertyPatch, PropertyValue};

/// Default number of visible rows for a textarea.
pub const DEFAULT_TEXTAREA_ROWS: u32 = 3;
const MAX_TEXTAREA_ROWS: u32 = 200;
const MAX_GRID_COLUMNS: u32 = 12;

enum Assign {
    Applied,
    Rejected,
    Unknown,
}

fn assign_text(slot: &mut String, value: &PropertyValue) -> Assign {
    match value.as_str() {
        Some(text) => {
            *slot = text.to_string();
            Assign::Applied
        }
        None => Assign::Rejected,
    }
}

fn assign_bool(slot: &mut bool, value: &PropertyValue) -> Assign {
    match value.as_bool() {
        Some(flag) => {
            *slot = flag;
            Assign::Applied
        }
        None => Assign::Rejected,
    }
}

/// Empty text clears an optional string.
fn assign_opt_text(slot: &mut Option<String>, value: &PropertyValue) -> Assign {
    match value.as_str() {
        Some("") => {
            *slot = None;
            Assign::Applied
        }
        Some(text) => {
            *slot = Some(text.to_string());
            Assign::Applied
        }
        None => Assign::Rejected,
    }
}

/// Empty text clears an optional number.
fn assign_opt_number(slot: &mut Option<f64>, value: &PropertyValue) -> Assign {
    match value {
        PropertyValue::Text(text) if text.is_empty() => {
            *slot = None;
            Assign::Applied
        }
        _ => match value.as_f64() {
            Some(n) => {
                *slot = Some(n);
                Assign::Applied
            }
            None => Assign::Rejected,
        },
    }
}

/// Whole counts: rounded, must be at least `min`, capped at `max`.
fn assign_count(slot: &mut u32, value: &PropertyValue, min: u32, max: u32) -> Assign {
    match value.as_f64() {
        Some(n) if n.round() >= f64::from(min) => {
            *slot = n.round().min(f64::from(max)) as u32;
            Assign::Applied
        }
        _ => Assign::Rejected,
    }
}

fn assign_list(slot: &mut Vec<String>, value: &PropertyValue) -> Assign {
    match value.as_list() {
        Some(items) => {
            *slot = items.to_vec();
            Assign::Applied
        }
        None => Assign::Rejected,
    }
}

fn put_opt_text(out: &mut PropertyPatch, key: &str, value: &Option<String>) {
    out.insert(key, value.clone().unwrap_or_default());
}

fn put_opt_number(out: &mut PropertyPatch, key: &str, value: Option<f64>) {
    match value {
        Some(n) => out.insert(key, n),
        None => out.insert(key, ""),
    }
}

// ---------------------------------------------------------------------------
// Typed property sets
// ---------------------------------------------------------------------------

/// Properties shared by single-line inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct InputProps {
    /// Visible field label.
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    /// Form field name; derived from the node id when absent.
    pub name: Option<String>,
}

impl InputProps {
    #[must_use]
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            placeholder: String::new(),
            required: false,
            name: None,
        }
    }

    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "label" => assign_text(&mut self.label, value),
            "placeholder" => assign_text(&mut self.placeholder, value),
            "required" => assign_bool(&mut self.required, value),
            "name" => assign_opt_text(&mut self.name, value),
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("label", self.label.as_str());
        out.insert("placeholder", self.placeholder.as_str());
        out.insert("required", self.required);
        put_opt_text(out, "name", &self.name);
    }
}

/// Numeric input: input properties plus optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberProps {
    pub input: InputProps,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

impl NumberProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "min" => assign_opt_number(&mut self.min, value),
            "max" => assign_opt_number(&mut self.max, value),
            "step" => assign_opt_number(&mut self.step, value),
            _ => self.input.assign(key, value),
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        self.input.write_properties(out);
        put_opt_number(out, "min", self.min);
        put_opt_number(out, "max", self.max);
        put_opt_number(out, "step", self.step);
    }
}

/// Multi-line text input.
#[derive(Debug, Clone, PartialEq)]
pub struct TextareaProps {
    pub input: InputProps,
    pub rows: u32,
}

impl TextareaProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "rows" => assign_count(&mut self.rows, value, 1, MAX_TEXTAREA_ROWS),
            _ => self.input.assign(key, value),
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        self.input.write_properties(out);
        out.insert("rows", self.rows);
    }
}

/// Select boxes and radio groups.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceProps {
    pub label: String,
    pub required: bool,
    pub name: Option<String>,
    pub options: Vec<String>,
}

impl ChoiceProps {
    #[must_use]
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            required: false,
            name: None,
            options: vec!["Option 1".to_string(), "Option 2".to_string()],
        }
    }

    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "label" => assign_text(&mut self.label, value),
            "required" => assign_bool(&mut self.required, value),
            "name" => assign_opt_text(&mut self.name, value),
            "options" => assign_list(&mut self.options, value),
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("label", self.label.as_str());
        out.insert("required", self.required);
        put_opt_text(out, "name", &self.name);
        out.insert("options", self.options.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckboxProps {
    pub label: String,
    pub checked: bool,
    pub required: bool,
    pub name: Option<String>,
}

impl CheckboxProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "label" => assign_text(&mut self.label, value),
            "checked" => assign_bool(&mut self.checked, value),
            "required" => assign_bool(&mut self.required, value),
            "name" => assign_opt_text(&mut self.name, value),
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("label", self.label.as_str());
        out.insert("checked", self.checked);
        out.insert("required", self.required);
        put_opt_text(out, "name", &self.name);
    }
}

/// The `type` attribute of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonType {
    #[default]
    Submit,
    Button,
    Reset,
}

impl ButtonType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Button => "button",
            Self::Reset => "reset",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "submit" => Some(Self::Submit),
            "button" => Some(Self::Button),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonProps {
    pub text: String,
    pub button_type: ButtonType,
}

impl ButtonProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "text" => assign_text(&mut self.text, value),
            "button_type" => match value.as_str().and_then(ButtonType::parse) {
                Some(ty) => {
                    self.button_type = ty;
                    Assign::Applied
                }
                None => Assign::Rejected,
            },
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("text", self.text.as_str());
        out.insert("button_type", self.button_type.as_str());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingProps {
    pub text: String,
    /// Heading level, always within `1..=6`.
    pub level: u8,
}

impl HeadingProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "text" => assign_text(&mut self.text, value),
            "level" => {
                let mut level = u32::from(self.level);
                let outcome = assign_count(&mut level, value, 1, 6);
                self.level = level as u8;
                outcome
            }
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("text", self.text.as_str());
        out.insert("level", u32::from(self.level));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphProps {
    pub text: String,
}

impl ParagraphProps {
    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "text" => assign_text(&mut self.text, value),
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("text", self.text.as_str());
    }
}

/// How a container lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerLayout {
    #[default]
    Flex,
    Grid,
}

impl ContainerLayout {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flex => "flex",
            Self::Grid => "grid",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerProps {
    pub layout: ContainerLayout,
    /// Flow direction for flex layouts; grids fill rows first.
    pub direction: LayoutAxis,
    /// Column count for grid layouts, within `1..=12`.
    pub columns: u32,
    /// Gap between children, never negative.
    pub gap: f64,
}

impl Default for ContainerProps {
    fn default() -> Self {
        Self {
            layout: ContainerLayout::Flex,
            direction: LayoutAxis::Column,
            columns: 2,
            gap: 8.0,
        }
    }
}

impl ContainerProps {
    /// Axis along which children are laid out, as seen by drop resolution.
    #[must_use]
    pub const fn layout_axis(&self) -> LayoutAxis {
        match self.layout {
            ContainerLayout::Flex => self.direction,
            ContainerLayout::Grid => LayoutAxis::Row,
        }
    }

    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match key {
            "layout" => match value.as_str() {
                Some("flex") => {
                    self.layout = ContainerLayout::Flex;
                    Assign::Applied
                }
                Some("grid") => {
                    self.layout = ContainerLayout::Grid;
                    Assign::Applied
                }
                _ => Assign::Rejected,
            },
            "direction" => match value.as_str() {
                Some("row") => {
                    self.direction = LayoutAxis::Row;
                    Assign::Applied
                }
                Some("column") => {
                    self.direction = LayoutAxis::Column;
                    Assign::Applied
                }
                _ => Assign::Rejected,
            },
            "columns" => assign_count(&mut self.columns, value, 1, MAX_GRID_COLUMNS),
            "gap" => match value.as_f64() {
                Some(gap) if gap >= 0.0 => {
                    self.gap = gap;
                    Assign::Applied
                }
                _ => Assign::Rejected,
            },
            _ => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        out.insert("layout", self.layout.as_str());
        out.insert("direction", self.direction.as_str());
        out.insert("columns", self.columns);
        out.insert("gap", self.gap);
    }
}

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// A component's type together with its typed properties.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    TextInput(InputProps),
    EmailInput(InputProps),
    PasswordInput(InputProps),
    NumberInput(NumberProps),
    DateInput(InputProps),
    Textarea(TextareaProps),
    Select(ChoiceProps),
    RadioGroup(ChoiceProps),
    Checkbox(CheckboxProps),
    Button(ButtonProps),
    Heading(HeadingProps),
    Paragraph(ParagraphProps),
    Container {
        props: ContainerProps,
        children: Vec<Arc<ComponentNode>>,
    },
    /// A type this build does not recognise, kept verbatim from a snapshot.
    Unknown {
        type_name: String,
        properties: BTreeMap<String, PropertyValue>,
    },
}

impl ComponentKind {
    /// The default properties for `ty`. Containers start empty.
    #[must_use]
    pub fn defaults(ty: ElementType) -> Self {
        match ty {
            ElementType::TextInput => Self::TextInput(InputProps::labelled("Text input")),
            ElementType::EmailInput => Self::EmailInput(InputProps::labelled("Email")),
            ElementType::PasswordInput => Self::PasswordInput(InputProps::labelled("Password")),
            ElementType::NumberInput => Self::NumberInput(NumberProps {
                input: InputProps::labelled("Number"),
                min: None,
                max: None,
                step: None,
            }),
            ElementType::DateInput => Self::DateInput(InputProps::labelled("Date")),
            ElementType::Textarea => Self::Textarea(TextareaProps {
                input: InputProps::labelled("Message"),
                rows: DEFAULT_TEXTAREA_ROWS,
            }),
            ElementType::Select => Self::Select(ChoiceProps::labelled("Select")),
            ElementType::RadioGroup => Self::RadioGroup(ChoiceProps::labelled("Choose one")),
            ElementType::Checkbox => Self::Checkbox(CheckboxProps {
                label: "Checkbox".to_string(),
                checked: false,
                required: false,
                name: None,
            }),
            ElementType::Button => Self::Button(ButtonProps {
                text: "Submit".to_string(),
                button_type: ButtonType::Submit,
            }),
            ElementType::Heading => Self::Heading(HeadingProps {
                text: "Heading".to_string(),
                level: 2,
            }),
            ElementType::Paragraph => Self::Paragraph(ParagraphProps {
                text: "Paragraph text".to_string(),
            }),
            ElementType::Container => Self::Container {
                props: ContainerProps::default(),
                children: Vec::new(),
            },
        }
    }

    /// The element type, or `None` for [`ComponentKind::Unknown`].
    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        Some(match self {
            Self::TextInput(_) => ElementType::TextInput,
            Self::EmailInput(_) => ElementType::EmailInput,
            Self::PasswordInput(_) => ElementType::PasswordInput,
            Self::NumberInput(_) => ElementType::NumberInput,
            Self::DateInput(_) => ElementType::DateInput,
            Self::Textarea(_) => ElementType::Textarea,
            Self::Select(_) => ElementType::Select,
            Self::RadioGroup(_) => ElementType::RadioGroup,
            Self::Checkbox(_) => ElementType::Checkbox,
            Self::Button(_) => ElementType::Button,
            Self::Heading(_) => ElementType::Heading,
            Self::Paragraph(_) => ElementType::Paragraph,
            Self::Container { .. } => ElementType::Container,
            Self::Unknown { .. } => return None,
        })
    }

    /// Type string, including the raw name of unknown types.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Unknown { type_name, .. } => type_name,
            _ => self.element_type().map_or("", ElementType::as_str),
        }
    }

    fn assign(&mut self, key: &str, value: &PropertyValue) -> Assign {
        match self {
            Self::TextInput(p) | Self::EmailInput(p) | Self::PasswordInput(p) | Self::DateInput(p) => {
                p.assign(key, value)
            }
            Self::NumberInput(p) => p.assign(key, value),
            Self::Textarea(p) => p.assign(key, value),
            Self::Select(p) | Self::RadioGroup(p) => p.assign(key, value),
            Self::Checkbox(p) => p.assign(key, value),
            Self::Button(p) => p.assign(key, value),
            Self::Heading(p) => p.assign(key, value),
            Self::Paragraph(p) => p.assign(key, value),
            Self::Container { props, .. } => props.assign(key, value),
            Self::Unknown { .. } => Assign::Unknown,
        }
    }

    fn write_properties(&self, out: &mut PropertyPatch) {
        match self {
            Self::TextInput(p) | Self::EmailInput(p) | Self::PasswordInput(p) | Self::DateInput(p) => {
                p.write_properties(out);
            }
            Self::NumberInput(p) => p.write_properties(out),
            Self::Textarea(p) => p.write_properties(out),
            Self::Select(p) | Self::RadioGroup(p) => p.write_properties(out),
            Self::Checkbox(p) => p.write_properties(out),
            Self::Button(p) => p.write_properties(out),
            Self::Heading(p) => p.write_properties(out),
            Self::Paragraph(p) => p.write_properties(out),
            Self::Container { props, .. } => props.write_properties(out),
            Self::Unknown { properties, .. } => {
                for (key, value) in properties {
                    out.insert(key.as_str(), value.clone());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentNode
// ---------------------------------------------------------------------------

/// A node in the component forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    id: NodeId,
    label: String,
    kind: ComponentKind,
    extensions: BTreeMap<String, PropertyValue>,
}

impl ComponentNode {
    /// A node of type `ty` with that type's default properties.
    #[must_use]
    pub fn new(id: NodeId, ty: ElementType) -> Self {
        Self {
            id,
            label: ty.display_name().to_string(),
            kind: ComponentKind::defaults(ty),
            extensions: BTreeMap::new(),
        }
    }

    /// A node from explicit parts.
    #[must_use]
    pub fn from_kind(id: NodeId, label: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            extensions: BTreeMap::new(),
        }
    }

    /// A container holding `children`, in order.
    #[must_use]
    pub fn container(
        id: NodeId,
        props: ContainerProps,
        children: impl IntoIterator<Item = ComponentNode>,
    ) -> Self {
        Self::from_kind(
            id,
            ElementType::Container.display_name(),
            ComponentKind::Container {
                props,
                children: children.into_iter().map(Arc::new).collect(),
            },
        )
    }

    /// Set the editor label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Editor display name, independent of rendered content.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    #[must_use]
    pub const fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Properties not understood by this node's type.
    #[must_use]
    pub const fn extensions(&self) -> &BTreeMap<String, PropertyValue> {
        &self.extensions
    }

    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        self.kind.element_type()
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, ComponentKind::Container { .. })
    }

    /// Ordered children, or `None` when this type cannot contain any.
    #[must_use]
    pub fn children(&self) -> Option<&[Arc<ComponentNode>]> {
        match &self.kind {
            ComponentKind::Container { children, .. } => Some(children),
            _ => None,
        }
    }

    /// A copy of this container with its children replaced.
    ///
    /// Returns `None` for nodes that cannot contain children.
    #[must_use]
    pub fn with_children(&self, children: Vec<Arc<ComponentNode>>) -> Option<ComponentNode> {
        match &self.kind {
            ComponentKind::Container { props, .. } => Some(Self {
                id: self.id,
                label: self.label.clone(),
                kind: ComponentKind::Container {
                    props: props.clone(),
                    children,
                },
                extensions: self.extensions.clone(),
            }),
            _ => None,
        }
    }

    /// Shallow-merge `patch` into this node's properties.
    pub fn apply_patch(&mut self, patch: &PropertyPatch) -> PatchReport {
        let mut report = PatchReport::default();
        for (key, value) in patch {
            if let ComponentKind::Unknown { properties, .. } = &mut self.kind {
                properties.insert(key.clone(), value.clone());
                report.preserved.push(key.clone());
                continue;
            }
            match self.kind.assign(key, value) {
                Assign::Applied => report.applied.push(key.clone()),
                Assign::Rejected => report.rejected.push(key.clone()),
                // Types without a field label take `label` as their editor name.
                Assign::Unknown if key == "label" => match assign_text(&mut self.label, value) {
                    Assign::Applied => report.applied.push(key.clone()),
                    _ => report.rejected.push(key.clone()),
                },
                Assign::Unknown => {
                    self.extensions.insert(key.clone(), value.clone());
                    report.preserved.push(key.clone());
                }
            }
        }
        report
    }

    /// Current properties, typed ones and extensions alike.
    #[must_use]
    pub fn properties(&self) -> PropertyPatch {
        let mut out = PropertyPatch::new();
        for (key, value) in &self.extensions {
            out.insert(key.as_str(), value.clone());
        }
        self.kind.write_properties(&mut out);
        out
    }

    /// Whether `id` names a strict descendant of this node.
    #[must_use]
    pub fn has_descendant(&self, id: NodeId) -> bool {
        self.children().is_some_and(|children| {
            children
                .iter()
                .any(|child| child.id == id || child.has_descendant(id))
        })
    }

    /// Append the ids of this node and all descendants, pre-order.
    pub fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id);
        if let Some(children) = self.children() {
            for child in children {
                child.collect_ids(out);
            }
        }
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |children| children.iter().map(|c| c.subtree_len()).sum())
    }
}
