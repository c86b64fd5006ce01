//! Forest → HTML.
//!
//! Rendering is a pure function of the forest and the renderer options:
//! the same input always produces byte-identical output. Every label,
//! property value and the class prefix pass through [`escape_into`] before
//! reaching the output.
//!
//! Each node's outermost element carries a `data-node-id` attribute so hosts
//! can map rendered boxes back to nodes when building geometry snapshots.

use std::fmt::Write;
use std::sync::Arc;

use formcraft_core::{
    ButtonProps, CheckboxProps, ChoiceProps, ComponentKind, ComponentNode, ContainerLayout,
    ContainerProps, HeadingProps, InputProps, LayoutAxis, NodeId, NumberProps, TextareaProps,
};

use crate::escape::escape_into;

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRenderer {
    /// Prefix for every generated class name.
    pub class_prefix: String,
    /// Per-level indentation; `None` renders everything on one line.
    pub indent: Option<String>,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self {
            class_prefix: "fc".into(),
            indent: Some("  ".into()),
        }
    }
}

impl MarkupRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Option<String>) -> Self {
        self.indent = indent;
        self
    }

    /// Single-line output.
    #[must_use]
    pub fn compact(self) -> Self {
        self.with_indent(None)
    }

    /// Render `forest` as a complete `<form>` document fragment.
    #[must_use]
    pub fn render(&self, forest: &[Arc<ComponentNode>]) -> String {
        let mut out = String::with_capacity(256 + forest.len() * 160);
        self.render_into(&mut out, forest);
        out
    }

    /// Append the rendering of `forest` to `out`.
    pub fn render_into(&self, out: &mut String, forest: &[Arc<ComponentNode>]) {
        let mut emitter = Emitter {
            out,
            prefix: &self.class_prefix,
            indent: self.indent.as_deref(),
            started: false,
        };
        emitter.line(0);
        emitter.out.push_str("<form");
        emitter.class_attr("form");
        emitter.out.push('>');
        for node in forest {
            emitter.node(node, 1);
        }
        if !forest.is_empty() {
            emitter.line(0);
        }
        emitter.out.push_str("</form>");
        formcraft_core::trace!(nodes = forest.len(), bytes = emitter.out.len(), "markup rendered");
    }
}

/// Render with the default options.
#[must_use]
pub fn render(forest: &[Arc<ComponentNode>]) -> String {
    MarkupRenderer::default().render(forest)
}

struct Emitter<'a> {
    out: &'a mut String,
    prefix: &'a str,
    indent: Option<&'a str>,
    started: bool,
}

impl Emitter<'_> {
    /// Start a new output line at `depth` (no-op in compact mode).
    fn line(&mut self, depth: usize) {
        let Some(indent) = self.indent else {
            return;
        };
        if self.started {
            self.out.push('\n');
        }
        self.started = true;
        for _ in 0..depth {
            self.out.push_str(indent);
        }
    }

    fn text(&mut self, s: &str) {
        escape_into(self.out, s);
    }

    fn attr(&mut self, name: &str, value: &str) {
        let _ = write!(self.out, " {name}=\"");
        escape_into(self.out, value);
        self.out.push('"');
    }

    fn flag(&mut self, name: &str, on: bool) {
        if on {
            let _ = write!(self.out, " {name}");
        }
    }

    /// ` class="{prefix}-{a} {prefix}-{b}"`.
    fn class_attr(&mut self, names: &str) {
        self.out.push_str(" class=\"");
        for (i, name) in names.split(' ').enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            escape_into(self.out, self.prefix);
            self.out.push('-');
            self.out.push_str(name);
        }
        self.out.push('"');
    }

    fn node_attr(&mut self, id: NodeId) {
        let _ = write!(self.out, " data-node-id=\"{id}\"");
    }

    fn field_id(&self, id: NodeId) -> String {
        format!("{}-field-{id}", self.prefix)
    }

    fn node(&mut self, node: &ComponentNode, depth: usize) {
        let id = node.id();
        match node.kind() {
            ComponentKind::TextInput(p) => self.input(id, "text", p, &[], depth),
            ComponentKind::EmailInput(p) => self.input(id, "email", p, &[], depth),
            ComponentKind::PasswordInput(p) => self.input(id, "password", p, &[], depth),
            ComponentKind::DateInput(p) => self.input(id, "date", p, &[], depth),
            ComponentKind::NumberInput(p) => self.number(id, p, depth),
            ComponentKind::Textarea(p) => self.textarea(id, p, depth),
            ComponentKind::Select(p) => self.select(id, p, depth),
            ComponentKind::RadioGroup(p) => self.radio_group(id, p, depth),
            ComponentKind::Checkbox(p) => self.checkbox(id, p, depth),
            ComponentKind::Button(p) => self.button(id, p, depth),
            ComponentKind::Heading(p) => self.heading(id, p, depth),
            ComponentKind::Paragraph(p) => {
                self.line(depth);
                self.out.push_str("<p");
                self.class_attr("paragraph");
                self.node_attr(id);
                self.out.push('>');
                self.text(&p.text);
                self.out.push_str("</p>");
            }
            ComponentKind::Container { props, children } => {
                self.container(id, props, children, depth);
            }
            ComponentKind::Unknown { type_name, .. } => {
                self.line(depth);
                self.out.push_str("<div");
                self.class_attr("unknown");
                self.node_attr(id);
                self.attr("data-type", type_name);
                self.out.push_str(">Unsupported component: ");
                self.text(type_name);
                self.out.push_str("</div>");
            }
        }
    }

    /// `<div class="fc-field">` with a `<label>` pointing at the control.
    fn field_open(&mut self, id: NodeId, label: &str, extra_class: Option<&str>, depth: usize) {
        self.line(depth);
        self.out.push_str("<div");
        match extra_class {
            Some(extra) => self.class_attr(&format!("field {extra}")),
            None => self.class_attr("field"),
        }
        self.node_attr(id);
        self.out.push('>');
        self.line(depth + 1);
        self.out.push_str("<label");
        let field_id = self.field_id(id);
        self.attr("for", &field_id);
        self.out.push('>');
        self.text(label);
        self.out.push_str("</label>");
    }

    fn field_close(&mut self, depth: usize) {
        self.line(depth);
        self.out.push_str("</div>");
    }

    /// `id` and `name` for a form control.
    fn control_attrs(&mut self, id: NodeId, name: Option<&str>) {
        let field_id = self.field_id(id);
        self.attr("id", &field_id);
        match name {
            Some(name) => self.attr("name", name),
            None => self.attr("name", &format!("field_{id}")),
        }
    }

    fn input(
        &mut self,
        id: NodeId,
        input_type: &str,
        props: &InputProps,
        extra: &[(&str, Option<f64>)],
        depth: usize,
    ) {
        self.field_open(id, &props.label, None, depth);
        self.line(depth + 1);
        self.out.push_str("<input");
        self.attr("type", input_type);
        self.control_attrs(id, props.name.as_deref());
        if !props.placeholder.is_empty() {
            self.attr("placeholder", &props.placeholder);
        }
        for (name, value) in extra {
            if let Some(value) = value {
                self.attr(name, &format_number(*value));
            }
        }
        self.flag("required", props.required);
        self.out.push('>');
        self.field_close(depth);
    }

    fn number(&mut self, id: NodeId, props: &NumberProps, depth: usize) {
        let bounds = [("min", props.min), ("max", props.max), ("step", props.step)];
        self.input(id, "number", &props.input, &bounds, depth);
    }

    fn textarea(&mut self, id: NodeId, props: &TextareaProps, depth: usize) {
        let input = &props.input;
        self.field_open(id, &input.label, None, depth);
        self.line(depth + 1);
        self.out.push_str("<textarea");
        self.control_attrs(id, input.name.as_deref());
        self.attr("rows", &props.rows.to_string());
        if !input.placeholder.is_empty() {
            self.attr("placeholder", &input.placeholder);
        }
        self.flag("required", input.required);
        self.out.push_str("></textarea>");
        self.field_close(depth);
    }

    fn select(&mut self, id: NodeId, props: &ChoiceProps, depth: usize) {
        self.field_open(id, &props.label, None, depth);
        self.line(depth + 1);
        self.out.push_str("<select");
        self.control_attrs(id, props.name.as_deref());
        self.flag("required", props.required);
        self.out.push('>');
        for option in &props.options {
            self.line(depth + 2);
            self.out.push_str("<option");
            self.attr("value", option);
            self.out.push('>');
            self.text(option);
            self.out.push_str("</option>");
        }
        self.line(depth + 1);
        self.out.push_str("</select>");
        self.field_close(depth);
    }

    fn radio_group(&mut self, id: NodeId, props: &ChoiceProps, depth: usize) {
        self.line(depth);
        self.out.push_str("<fieldset");
        self.class_attr("field radio-group");
        self.node_attr(id);
        self.out.push('>');
        self.line(depth + 1);
        self.out.push_str("<legend>");
        self.text(&props.label);
        self.out.push_str("</legend>");
        let name = props.name.clone().unwrap_or_else(|| format!("field_{id}"));
        for option in &props.options {
            self.line(depth + 1);
            self.out.push_str("<label><input type=\"radio\"");
            self.attr("name", &name);
            self.attr("value", option);
            self.flag("required", props.required);
            self.out.push_str("> ");
            self.text(option);
            self.out.push_str("</label>");
        }
        self.line(depth);
        self.out.push_str("</fieldset>");
    }

    fn checkbox(&mut self, id: NodeId, props: &CheckboxProps, depth: usize) {
        self.line(depth);
        self.out.push_str("<div");
        self.class_attr("field checkbox");
        self.node_attr(id);
        self.out.push('>');
        self.line(depth + 1);
        self.out.push_str("<label><input type=\"checkbox\"");
        self.control_attrs(id, props.name.as_deref());
        self.flag("checked", props.checked);
        self.flag("required", props.required);
        self.out.push_str("> ");
        self.text(&props.label);
        self.out.push_str("</label>");
        self.field_close(depth);
    }

    fn button(&mut self, id: NodeId, props: &ButtonProps, depth: usize) {
        self.line(depth);
        self.out.push_str("<button");
        self.attr("type", props.button_type.as_str());
        self.class_attr("button");
        self.node_attr(id);
        self.out.push('>');
        self.text(&props.text);
        self.out.push_str("</button>");
    }

    fn heading(&mut self, id: NodeId, props: &HeadingProps, depth: usize) {
        let level = props.level.clamp(1, 6);
        self.line(depth);
        let _ = write!(self.out, "<h{level}");
        self.class_attr("heading");
        self.node_attr(id);
        self.out.push('>');
        self.text(&props.text);
        let _ = write!(self.out, "</h{level}>");
    }

    fn container(
        &mut self,
        id: NodeId,
        props: &ContainerProps,
        children: &[Arc<ComponentNode>],
        depth: usize,
    ) {
        self.line(depth);
        self.out.push_str("<div");
        self.class_attr("container");
        self.node_attr(id);
        self.attr("style", &container_style(props));
        self.out.push('>');
        for child in children {
            self.node(child, depth + 1);
        }
        if !children.is_empty() {
            self.line(depth);
        }
        self.out.push_str("</div>");
    }
}

/// Inline CSS for a container's layout.
#[must_use]
pub fn container_style(props: &ContainerProps) -> String {
    let gap = format_number(props.gap.max(0.0));
    match props.layout {
        ContainerLayout::Flex => {
            let direction = match props.direction {
                LayoutAxis::Row => "row",
                LayoutAxis::Column => "column",
            };
            format!("display:flex;flex-direction:{direction};gap:{gap}px;")
        }
        ContainerLayout::Grid => format!(
            "display:grid;grid-template-columns:repeat({}, minmax(0,1fr));gap:{gap}px;",
            props.columns.max(1)
        ),
    }
}

/// Integers print without a fractional part.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}
