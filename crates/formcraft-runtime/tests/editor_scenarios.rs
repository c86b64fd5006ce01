//! End-to-end editor scenarios: pointer samples in, tree and markup out.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use formcraft_core::{
    ComponentNode, ContainerProps, ContainerRef, ElementType, EventChannel, LayoutAxis, NodeId,
    Point, Rect, Sides,
};
use formcraft_layout::LayoutSnapshot;
use formcraft_runtime::{DragEffect, DragPayload, Editor, EditorConfig, EditorEvent, RejectReason};
use formcraft_tree::{TreeError, node_count};

// ── Helpers ─────────────────────────────────────────────────────────────

fn id(raw: u64) -> NodeId {
    NodeId::new(raw).expect("test ID must be non-zero")
}

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 400.0, 600.0);

fn root_column() -> LayoutSnapshot {
    LayoutSnapshot::new().with_root(VIEWPORT, LayoutAxis::Column, Sides::all(8.0))
}

fn top_level_ids(editor: &Editor) -> Vec<NodeId> {
    editor.forest().iter().map(|node| node.id()).collect()
}

fn rejections(events: &EventChannel<EditorEvent>) -> Rc<RefCell<Vec<RejectReason>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    events.subscribe(move |event: &EditorEvent| {
        if let EditorEvent::DropRejected { reason, .. } = event {
            sink.borrow_mut().push(*reason);
        }
    });
    seen
}

// ═════════════════════════════════════════════════════════════════════════
// New element on an empty canvas
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn new_text_input_on_empty_canvas() {
    let mut editor =
        Editor::new(EditorConfig::default(), EventChannel::new()).expect("valid config");
    let geometry = root_column();

    editor.begin_drag(DragPayload::New(ElementType::TextInput), Point::new(20.0, 20.0));
    editor.drag_to(Point::new(200.0, 300.0), &geometry, VIEWPORT);
    let target = editor.session().current_target().expect("canvas accepts drops");
    assert_eq!(target.container, ContainerRef::Root);
    assert_eq!(target.index, 0);
    // Empty container: the indicator covers the content box.
    assert_eq!(target.insertion_rect, Rect::new(8.0, 8.0, 384.0, 584.0));

    let done = editor.drop_drag();
    let node = done.committed_node().expect("committed");
    assert_eq!(top_level_ids(&editor), vec![node]);
    assert_eq!(editor.selected(), Some(node));
    assert!(!editor.session().is_dragging());

    let markup = editor.markup();
    assert!(markup.starts_with("<form class=\"fc-form\">"));
    assert!(markup.contains("type=\"text\""));
}

// ═════════════════════════════════════════════════════════════════════════
// Reorder
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn reorder_two_siblings() {
    let forest = vec![
        Arc::new(ComponentNode::new(id(1), ElementType::TextInput).with_label("X")),
        Arc::new(ComponentNode::new(id(2), ElementType::TextInput).with_label("Y")),
    ];
    let mut editor =
        Editor::with_forest(EditorConfig::default(), EventChannel::new(), forest).expect("valid");
    let geometry = LayoutSnapshot::new()
        .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
        .with_leaf(id(1), ContainerRef::Root, Rect::new(0.0, 100.0, 400.0, 50.0))
        .with_leaf(id(2), ContainerRef::Root, Rect::new(0.0, 150.0, 400.0, 50.0));

    editor.begin_drag(DragPayload::Existing(id(2)), Point::new(200.0, 175.0));
    assert_eq!(editor.session().suppressed(), Some(id(2)));
    // Above X's midpoint (y = 125).
    editor.drag_to(Point::new(200.0, 110.0), &geometry, VIEWPORT);
    assert_eq!(editor.session().current_target().map(|t| t.index), Some(0));

    let done = editor.drop_drag();
    assert_eq!(done.committed_node(), Some(id(2)));
    assert_eq!(top_level_ids(&editor), vec![id(2), id(1)]);
}

#[test]
fn dropping_in_place_keeps_order() {
    let forest = vec![
        Arc::new(ComponentNode::new(id(1), ElementType::Checkbox)),
        Arc::new(ComponentNode::new(id(2), ElementType::Checkbox)),
    ];
    let mut editor =
        Editor::with_forest(EditorConfig::default(), EventChannel::new(), forest).expect("valid");
    let geometry = LayoutSnapshot::new()
        .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
        .with_leaf(id(1), ContainerRef::Root, Rect::new(0.0, 0.0, 400.0, 50.0))
        .with_leaf(id(2), ContainerRef::Root, Rect::new(0.0, 50.0, 400.0, 50.0));

    editor.begin_drag(DragPayload::Existing(id(2)), Point::new(200.0, 75.0));
    // Below the only visible sibling: index 1 after detaching the source.
    editor.drag_to(Point::new(200.0, 80.0), &geometry, VIEWPORT);
    editor.drop_drag();
    assert_eq!(top_level_ids(&editor), vec![id(1), id(2)]);
}

// ═════════════════════════════════════════════════════════════════════════
// Cycle rejection
// ═════════════════════════════════════════════════════════════════════════

/// B (container) holds A (container).
fn nested_pair() -> Vec<Arc<ComponentNode>> {
    let a =
        ComponentNode::container(id(2), ContainerProps::default(), Vec::new()).with_label("A");
    vec![Arc::new(
        ComponentNode::container(id(1), ContainerProps::default(), [a]).with_label("B"),
    )]
}

#[test]
fn moving_into_own_descendant_is_rejected() {
    let events = EventChannel::new();
    let rejected = rejections(&events);
    let mut editor =
        Editor::with_forest(EditorConfig::default(), events, nested_pair()).expect("valid");
    let before = Arc::clone(editor.forest());
    let revision = editor.revision();

    // Geometry that fails to register A under B, so the resolver offers A.
    let stale = LayoutSnapshot::new()
        .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
        .with_container(
            id(2),
            ContainerRef::Root,
            Rect::new(0.0, 0.0, 200.0, 200.0),
            LayoutAxis::Column,
            Sides::default(),
        );

    editor.begin_drag(DragPayload::Existing(id(1)), Point::new(300.0, 300.0));
    editor.drag_to(Point::new(50.0, 50.0), &stale, VIEWPORT);
    assert_eq!(
        editor.session().current_target().map(|t| t.container),
        Some(ContainerRef::Node(id(2)))
    );

    let done = editor.drop_drag();
    let expected = RejectReason::CycleRejected {
        node_id: id(1),
        target: id(2),
    };
    assert!(matches!(done.effect, DragEffect::Rejected { reason, .. } if reason == expected));
    assert!(!editor.session().is_dragging());
    assert!(Arc::ptr_eq(&before, editor.forest()));
    assert_eq!(editor.revision(), revision);
    assert_eq!(*rejected.borrow(), vec![expected]);
}

#[test]
fn resolver_never_offers_the_dragged_subtree() {
    let mut editor =
        Editor::with_forest(EditorConfig::default(), EventChannel::new(), nested_pair())
            .expect("valid");
    let geometry = LayoutSnapshot::new()
        .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
        .with_container(
            id(1),
            ContainerRef::Root,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            LayoutAxis::Column,
            Sides::default(),
        )
        .with_container(
            id(2),
            id(1).into(),
            Rect::new(10.0, 10.0, 200.0, 200.0),
            LayoutAxis::Column,
            Sides::default(),
        );

    editor.begin_drag(DragPayload::Existing(id(1)), Point::new(300.0, 250.0));
    editor.drag_to(Point::new(50.0, 50.0), &geometry, VIEWPORT);
    let target = editor.session().current_target().expect("root");
    assert_eq!(target.container, ContainerRef::Root);
    assert_eq!(target.index, 0);
}

#[test]
fn store_rejects_cycle_directly() {
    let mut store = formcraft_tree::TreeStore::with_forest(nested_pair()).expect("valid");
    assert_eq!(
        store.move_node(id(1), id(2).into(), 0),
        Err(TreeError::CycleRejected {
            node_id: id(1),
            target: id(2)
        })
    );
    assert_eq!(store.revision(), 0);
}

// ═════════════════════════════════════════════════════════════════════════
// Target container deleted mid-drag
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn container_deleted_mid_drag_is_rejected() {
    let events = EventChannel::new();
    let rejected = rejections(&events);
    let forest = vec![
        Arc::new(ComponentNode::container(id(1), ContainerProps::default(), Vec::new())),
        Arc::new(ComponentNode::new(id(2), ElementType::Checkbox)),
    ];
    let mut editor = Editor::with_forest(EditorConfig::default(), events, forest).expect("valid");
    let geometry = LayoutSnapshot::new()
        .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
        .with_container(
            id(1),
            ContainerRef::Root,
            Rect::new(0.0, 0.0, 400.0, 200.0),
            LayoutAxis::Column,
            Sides::default(),
        )
        .with_leaf(id(2), ContainerRef::Root, Rect::new(0.0, 200.0, 400.0, 50.0));

    editor.begin_drag(DragPayload::Existing(id(2)), Point::new(200.0, 225.0));
    editor.drag_to(Point::new(200.0, 100.0), &geometry, VIEWPORT);
    assert_eq!(
        editor.session().current_target().map(|t| t.container),
        Some(ContainerRef::Node(id(1)))
    );

    assert!(editor.request_delete(id(1)));
    let before = Arc::clone(editor.forest());
    let revision = editor.revision();

    let done = editor.drop_drag();
    let expected = RejectReason::UnknownContainer { container: id(1) };
    assert!(matches!(done.effect, DragEffect::Rejected { reason, .. } if reason == expected));
    assert!(!editor.session().is_dragging());
    assert!(Arc::ptr_eq(&before, editor.forest()));
    assert_eq!(editor.revision(), revision);
    assert_eq!(top_level_ids(&editor), vec![id(2)]);
    assert_eq!(*rejected.borrow(), vec![expected]);
}

// ═════════════════════════════════════════════════════════════════════════
// Cascading delete
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn deleting_a_mid_tree_node_removes_its_subtree() {
    // outer(1) -> middle(2) -> [leaf(3), leaf(4)], plus sibling leaf(5) in outer.
    let middle = ComponentNode::container(
        id(2),
        ContainerProps::default(),
        [
            ComponentNode::new(id(3), ElementType::TextInput),
            ComponentNode::new(id(4), ElementType::Button),
        ],
    );
    let outer = ComponentNode::container(
        id(1),
        ContainerProps::default(),
        [middle, ComponentNode::new(id(5), ElementType::Paragraph)],
    );
    let mut editor = Editor::with_forest(
        EditorConfig::default(),
        EventChannel::new(),
        vec![Arc::new(outer)],
    )
    .expect("valid");
    assert!(editor.select(id(4)));

    assert!(editor.request_delete(id(2)));
    assert_eq!(node_count(editor.forest()), 2);
    for gone in [2, 3, 4] {
        assert!(editor.store().find(id(gone)).is_none());
    }
    let outer = editor.store().find(id(1)).expect("outer survives");
    let children: Vec<NodeId> = outer
        .children()
        .expect("container")
        .iter()
        .map(|child| child.id())
        .collect();
    assert_eq!(children, vec![id(5)]);
    assert_eq!(editor.selected(), None);

    let markup = editor.markup();
    assert!(!markup.contains("data-node-id=\"3\""));
    assert!(markup.contains("data-node-id=\"5\""));
}
