//! Property-based invariant tests for the component model.
//!
//! 1. Applying a patch never changes a node's id or element type.
//! 2. Every patch key lands in exactly one report bucket.
//! 3. Applied and preserved keys read back through `properties()`.
//! 4. Heading levels stay within 1..=6 whatever is assigned.
//! 5. `Rect::contains` agrees with the half-open edge comparisons.
//! 6. `Rect::inner` never yields negative extents.

use formcraft_core::{
    ComponentKind, ComponentNode, ElementType, NodeId, Point, PropertyPatch, PropertyValue, Rect,
    Sides,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn element_type_strategy() -> impl Strategy<Value = ElementType> {
    (0..ElementType::ALL.len()).prop_map(|i| ElementType::ALL[i])
}

fn value_strategy() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        any::<bool>().prop_map(PropertyValue::Bool),
        (-50.0f64..50.0).prop_map(PropertyValue::Number),
        "[a-z <>&]{0,8}".prop_map(PropertyValue::Text),
        prop::collection::vec("[a-z]{1,4}", 0..3).prop_map(PropertyValue::List),
    ]
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("label".to_string()),
        Just("placeholder".to_string()),
        Just("required".to_string()),
        Just("rows".to_string()),
        Just("level".to_string()),
        Just("options".to_string()),
        Just("gap".to_string()),
        Just("columns".to_string()),
        "x_[a-z]{1,6}",
    ]
}

fn patch_strategy() -> impl Strategy<Value = PropertyPatch> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..6).prop_map(PropertyPatch::from)
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-200.0f64..200.0, -200.0f64..200.0, 0.0f64..300.0, 0.0f64..300.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Patch application
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn patch_keeps_identity(ty in element_type_strategy(), patch in patch_strategy()) {
        let id = NodeId::new(9).expect("non-zero");
        let mut node = ComponentNode::new(id, ty);
        node.apply_patch(&patch);
        prop_assert_eq!(node.id(), id);
        prop_assert_eq!(node.element_type(), Some(ty));
    }

    #[test]
    fn every_key_reported_once(ty in element_type_strategy(), patch in patch_strategy()) {
        let mut node = ComponentNode::new(NodeId::MIN, ty);
        let report = node.apply_patch(&patch);
        let total = report.applied.len() + report.preserved.len() + report.rejected.len();
        prop_assert_eq!(total, patch.len());
        for (key, _) in &patch {
            let hits = [&report.applied, &report.preserved, &report.rejected]
                .iter()
                .filter(|bucket| bucket.contains(key))
                .count();
            prop_assert_eq!(hits, 1, "key {} reported {} times", key, hits);
        }
    }

    #[test]
    fn preserved_keys_read_back(ty in element_type_strategy(), patch in patch_strategy()) {
        let mut node = ComponentNode::new(NodeId::MIN, ty);
        let report = node.apply_patch(&patch);
        let props = node.properties();
        for key in &report.preserved {
            prop_assert_eq!(props.get(key), patch.get(key));
        }
        // `label` may land on the editor name instead of a property.
        for key in report.applied.iter().filter(|key| *key != "label") {
            prop_assert!(props.get(key).is_some(), "missing {}", key);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Heading level clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn heading_level_in_range(level in -20.0f64..40.0) {
        let mut node = ComponentNode::new(NodeId::MIN, ElementType::Heading);
        node.apply_patch(&PropertyPatch::new().set("level", level));
        match node.kind() {
            ComponentKind::Heading(props) => prop_assert!((1..=6).contains(&props.level)),
            other => prop_assert!(false, "unexpected kind {:?}", other),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Geometry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn contains_matches_edges(r in rect_strategy(), x in -250.0f64..550.0, y in -250.0f64..550.0) {
        let p = Point::new(x, y);
        let expected = x >= r.left() && x < r.right() && y >= r.top() && y < r.bottom();
        prop_assert_eq!(r.contains(p), expected);
    }

    #[test]
    fn inner_never_negative(r in rect_strategy(), pad in 0.0f64..200.0) {
        let inner = r.inner(Sides::all(pad));
        prop_assert!(inner.width >= 0.0);
        prop_assert!(inner.height >= 0.0);
    }
}
