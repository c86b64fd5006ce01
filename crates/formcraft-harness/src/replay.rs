//! Run a [`Script`] against an [`Editor`].

use formcraft_core::{ElementType, EventChannel, NodeId};
use formcraft_runtime::{DragEffect, DragPayload, DragTransition, Editor, EditorConfig, EditorError};
use formcraft_tree::ForestSnapshot;
use tracing::{debug, info_span, warn};

use crate::HarnessError;
use crate::script::{Script, Step};

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub config: EditorConfig,
    /// Document loaded before the first step.
    pub initial: Option<ForestSnapshot>,
    /// Render markup on a single line.
    pub compact: bool,
}

/// Final state after a replay.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub markup: String,
    pub snapshot: ForestSnapshot,
    pub transitions: Vec<DragTransition>,
    pub selected: Option<NodeId>,
    pub revision: u64,
}

impl ReplayReport {
    /// Drops the tree refused.
    #[must_use]
    pub fn rejected_drops(&self) -> usize {
        self.transitions
            .iter()
            .filter(|t| matches!(t.effect, DragEffect::Rejected { .. }))
            .count()
    }

    /// Nodes placed by committed drops, in order.
    #[must_use]
    pub fn committed_nodes(&self) -> Vec<NodeId> {
        self.transitions
            .iter()
            .filter_map(DragTransition::committed_node)
            .collect()
    }
}

/// Replay `script` and report the resulting document.
///
/// Steps that refer to missing nodes are no-ops, matching the editor. A step
/// naming an unknown element type fails the replay.
pub fn replay(script: &Script, options: &ReplayOptions) -> Result<ReplayReport, HarnessError> {
    let events = EventChannel::new();
    let mut editor = match &options.initial {
        Some(snapshot) => Editor::from_snapshot(options.config.clone(), events, snapshot)?,
        None => Editor::new(options.config.clone(), events)?,
    };

    let mut geometry = script.geometry.clone();
    let mut transitions = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        let _span = info_span!("step", index, op = step.op()).entered();
        let step_error = |source: EditorError| HarnessError::Step { index, source };
        match step {
            Step::StartNew { element_type, at } => {
                let ty: ElementType = element_type
                    .parse()
                    .map_err(|err| step_error(EditorError::UnknownElementType(err)))?;
                transitions.extend(editor.begin_drag(DragPayload::New(ty), *at));
            }
            Step::StartExisting { node_id, at } => {
                transitions.extend(editor.begin_drag(DragPayload::Existing(*node_id), *at));
            }
            Step::Move { to } => {
                transitions.extend(editor.drag_to(*to, &geometry, script.viewport));
            }
            Step::Drop => transitions.push(editor.drop_drag()),
            Step::Cancel => transitions.extend(editor.cancel_drag()),
            Step::SetProperty {
                node_id,
                properties,
            } => {
                if editor.apply_property_change(*node_id, properties).is_none() {
                    warn!(node = node_id.get(), "set_property on a missing node");
                }
            }
            Step::Delete { node_id } => {
                editor.request_delete(*node_id);
            }
            Step::Select { node_id } => {
                if !editor.select(*node_id) {
                    warn!(node = node_id.get(), "select on a missing node");
                }
            }
            Step::Add {
                element_type,
                parent,
                index: at,
            } => {
                editor
                    .request_new_element(element_type, *parent, *at)
                    .map_err(step_error)?;
            }
            Step::Geometry { snapshot } => geometry = snapshot.clone(),
        }
        debug!(revision = editor.revision(), "step applied");
    }

    let mut renderer = options.config.renderer();
    if options.compact {
        renderer = renderer.compact();
    }
    Ok(ReplayReport {
        markup: renderer.render(editor.forest()),
        snapshot: editor.snapshot(),
        transitions,
        selected: editor.selected(),
        revision: editor.revision(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw).expect("test ID must be non-zero")
    }

    const ROOT_ONLY: &str = r#"{
        "viewport": {"x": 0, "y": 0, "width": 400, "height": 600},
        "geometry": {"entries": [
            {"target": "root", "rect": {"x": 0, "y": 0, "width": 400, "height": 600}, "axis": "column"}
        ]},
        "steps": []
    }"#;

    fn script(steps: &str) -> Script {
        let mut script = Script::from_json(ROOT_ONLY).expect("base");
        script.steps = serde_json::from_str(steps).expect("steps");
        script
    }

    fn compact() -> ReplayOptions {
        ReplayOptions {
            compact: true,
            ..ReplayOptions::default()
        }
    }

    #[test]
    fn empty_script_renders_empty_form() {
        let report = replay(&script("[]"), &compact()).expect("replay");
        assert_eq!(report.markup, "<form class=\"fc-form\"></form>");
        assert_eq!(report.revision, 0);
        assert!(report.snapshot.nodes.is_empty());
    }

    #[test]
    fn drag_then_drop_places_element() {
        let report = replay(
            &script(
                r#"[
                    {"op": "start_new", "element_type": "paragraph", "at": {"x": 5, "y": 5}},
                    {"op": "move", "to": {"x": 200, "y": 300}},
                    {"op": "drop"}
                ]"#,
            ),
            &compact(),
        )
        .expect("replay");
        assert_eq!(report.committed_nodes(), vec![id(1)]);
        assert_eq!(report.selected, Some(id(1)));
        assert_eq!(
            report.markup,
            "<form class=\"fc-form\"><p class=\"fc-paragraph\" data-node-id=\"1\">\
             Paragraph text</p></form>"
        );
    }

    #[test]
    fn unknown_type_fails_with_step_index() {
        let err = replay(
            &script(
                r#"[
                    {"op": "add", "element_type": "heading"},
                    {"op": "add", "element_type": "slider"}
                ]"#,
            ),
            &compact(),
        )
        .expect_err("unknown type");
        assert!(matches!(err, HarnessError::Step { index: 1, .. }));
    }

    #[test]
    fn missing_nodes_are_skipped() {
        let report = replay(
            &script(
                r#"[
                    {"op": "delete", "node_id": 9},
                    {"op": "select", "node_id": 9},
                    {"op": "set_property", "node_id": 9, "properties": {"text": "x"}},
                    {"op": "start_existing", "node_id": 9},
                    {"op": "drop"}
                ]"#,
            ),
            &compact(),
        )
        .expect("replay");
        assert_eq!(report.revision, 0);
        assert!(report.committed_nodes().is_empty());
    }

    #[test]
    fn initial_document_is_loaded() {
        let initial = ForestSnapshot::from_json(
            r#"{"nodes": [{"id": 4, "type": "button", "properties": {"text": "Go"}}]}"#,
        )
        .expect("snapshot");
        let options = ReplayOptions {
            initial: Some(initial),
            ..compact()
        };
        let report = replay(
            &script(r#"[{"op": "add", "element_type": "checkbox", "parent": "root", "index": 0}]"#),
            &options,
        )
        .expect("replay");
        let ids: Vec<NodeId> = report.snapshot.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![id(5), id(4)]);
        assert!(report.markup.contains(">Go</button>"));
        assert_eq!(report.selected, Some(id(5)));
    }
}
