//! Drop-target resolution.
//!
//! Given a pointer position and a [`LayoutSnapshot`], decide which container
//! a dragged element would land in, at which child index, and where to draw
//! the insertion indicator.
//!
//! # Algorithm
//!
//! 1. Among droppable boxes containing the pointer (half-open bounds), pick
//!    the one with the smallest area. Ties keep the earliest registered box.
//! 2. An empty container yields index 0 and an indicator covering its
//!    content box.
//! 3. Otherwise the child whose centre is closest to the pointer along the
//!    container's axis wins (ties keep the earlier child). A pointer strictly
//!    past that centre inserts after the child, anything else before it.
//!
//! Distances are measured along the layout axis only, so wrapping rows are
//! not modelled.
//!
//! # Suppressed sources
//!
//! [`Resolver::resolve_excluding`] ignores the dragged node and everything
//! registered under it, as if the host had hidden them. Indices are then
//! counted without the dragged node, which is the coordinate system a move
//! uses after detaching its source.

use std::collections::HashSet;

use formcraft_core::{ContainerRef, LayoutAxis, NodeId, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::snapshot::{BoxEntry, LayoutSnapshot};

/// Default insertion indicator thickness.
pub const DEFAULT_INDICATOR_THICKNESS: f64 = 2.0;

/// Where a drop would land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropTarget {
    pub container: ContainerRef,
    pub axis: LayoutAxis,
    /// Insertion index, `0..=len` of the container's children.
    pub index: usize,
    /// Indicator geometry for visual feedback.
    pub insertion_rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    pub indicator_thickness: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            indicator_thickness: DEFAULT_INDICATOR_THICKNESS,
        }
    }
}

/// Stateless drop-target resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `point` against every box in `snapshot`.
    #[must_use]
    pub fn resolve(&self, point: Point, snapshot: &LayoutSnapshot) -> Option<DropTarget> {
        self.resolve_excluding(point, snapshot, None)
    }

    /// Resolve `point`, ignoring `excluded` and its registered descendants.
    #[must_use]
    pub fn resolve_excluding(
        &self,
        point: Point,
        snapshot: &LayoutSnapshot,
        excluded: Option<NodeId>,
    ) -> Option<DropTarget> {
        let hidden = hidden_set(snapshot, excluded);
        let visible = |entry: &&BoxEntry| !hidden.contains(&entry.target);

        let mut best: Option<&BoxEntry> = None;
        for entry in snapshot.entries().iter().filter(visible) {
            if !entry.is_droppable() || !entry.rect.contains(point) {
                continue;
            }
            if best.is_none_or(|b| entry.rect.area() < b.rect.area()) {
                best = Some(entry);
            }
        }
        let Some(container) = best else {
            formcraft_core::trace!(x = point.x, y = point.y, "pointer outside every drop zone");
            return None;
        };
        let axis = container.axis.unwrap_or_default();
        let content = container.content();

        let mut nearest: Option<(usize, &BoxEntry, f64)> = None;
        for (i, child) in snapshot
            .children_of(container.target)
            .filter(visible)
            .enumerate()
        {
            let distance = (axis.coord(point) - child.rect.mid(axis)).abs();
            if nearest.is_none_or(|(_, _, d)| distance < d) {
                nearest = Some((i, child, distance));
            }
        }

        let target = match nearest {
            None => DropTarget {
                container: container.target,
                axis,
                index: 0,
                insertion_rect: content,
            },
            Some((i, child, _)) => {
                let after = axis.coord(point) > child.rect.mid(axis);
                let (index, edge) = if after {
                    (i + 1, child.rect.end(axis))
                } else {
                    (i, child.rect.start(axis))
                };
                DropTarget {
                    container: container.target,
                    axis,
                    index,
                    insertion_rect: self.indicator(axis, content, edge),
                }
            }
        };
        formcraft_core::trace!(
            container = %target.container,
            index = target.index,
            "drop target resolved"
        );
        Some(target)
    }

    /// A bar of the configured thickness centred on `edge`, spanning the
    /// content box across the axis.
    fn indicator(&self, axis: LayoutAxis, content: Rect, edge: f64) -> Rect {
        let t = self.config.indicator_thickness;
        match axis {
            LayoutAxis::Column => Rect::new(content.x, edge - t / 2.0, content.width, t),
            LayoutAxis::Row => Rect::new(edge - t / 2.0, content.y, t, content.height),
        }
    }
}

/// Resolve with the default configuration.
#[must_use]
pub fn resolve(point: Point, snapshot: &LayoutSnapshot) -> Option<DropTarget> {
    Resolver::default().resolve(point, snapshot)
}

/// `excluded` plus every box registered under it.
fn hidden_set(snapshot: &LayoutSnapshot, excluded: Option<NodeId>) -> HashSet<ContainerRef> {
    let mut hidden = HashSet::new();
    let Some(excluded) = excluded else {
        return hidden;
    };
    hidden.insert(ContainerRef::Node(excluded));
    // Repeat until stable: hosts may register a child before its parent.
    loop {
        let before = hidden.len();
        for entry in snapshot.entries() {
            if entry.parent.is_some_and(|parent| hidden.contains(&parent)) {
                hidden.insert(entry.target);
            }
        }
        if hidden.len() == before {
            return hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_core::Sides;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw).expect("test ID must be non-zero")
    }

    /// Root column 0..400 with two 40-tall leaves at y=0 and y=50.
    fn column_root() -> LayoutSnapshot {
        LayoutSnapshot::new()
            .with_root(Rect::new(0.0, 0.0, 400.0, 400.0), LayoutAxis::Column, Sides::default())
            .with_leaf(id(1), ContainerRef::Root, Rect::new(0.0, 0.0, 400.0, 40.0))
            .with_leaf(id(2), ContainerRef::Root, Rect::new(0.0, 50.0, 400.0, 40.0))
    }

    #[test]
    fn outside_everything_is_none() {
        assert_eq!(resolve(Point::new(500.0, 10.0), &column_root()), None);
        assert_eq!(resolve(Point::new(400.0, 10.0), &column_root()), None);
        assert_eq!(resolve(Point::new(10.0, 10.0), &LayoutSnapshot::new()), None);
    }

    #[test]
    fn empty_container_gets_index_zero_and_content_box() {
        let snap = LayoutSnapshot::new().with_root(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            LayoutAxis::Column,
            Sides::all(10.0),
        );
        let target = resolve(Point::new(50.0, 50.0), &snap).expect("inside root");
        assert_eq!(target.container, ContainerRef::Root);
        assert_eq!(target.index, 0);
        assert_eq!(target.insertion_rect, Rect::new(10.0, 10.0, 180.0, 80.0));
    }

    #[test]
    fn before_and_after_midpoint() {
        let snap = column_root();
        let above = resolve(Point::new(10.0, 10.0), &snap).expect("target");
        assert_eq!(above.index, 0);
        assert_eq!(above.insertion_rect, Rect::new(0.0, -1.0, 400.0, 2.0));

        let below = resolve(Point::new(10.0, 30.0), &snap).expect("target");
        assert_eq!(below.index, 1);
        assert_eq!(below.insertion_rect, Rect::new(0.0, 39.0, 400.0, 2.0));

        let tail = resolve(Point::new(10.0, 300.0), &snap).expect("target");
        assert_eq!(tail.index, 2);
        assert_eq!(tail.insertion_rect, Rect::new(0.0, 89.0, 400.0, 2.0));
    }

    #[test]
    fn exact_midpoint_inserts_before() {
        let target = resolve(Point::new(10.0, 20.0), &column_root()).expect("target");
        assert_eq!(target.index, 0);
    }

    #[test]
    fn equidistant_children_keep_first() {
        // Pointer at y=45: both centres (20 and 70) are 25 away.
        let target = resolve(Point::new(10.0, 45.0), &column_root()).expect("target");
        assert_eq!(target.index, 1);
    }

    #[test]
    fn row_axis_indicator_is_vertical() {
        let snap = LayoutSnapshot::new()
            .with_root(Rect::new(0.0, 0.0, 300.0, 60.0), LayoutAxis::Row, Sides::all(5.0))
            .with_leaf(id(1), ContainerRef::Root, Rect::new(5.0, 5.0, 100.0, 50.0));
        let target = resolve(Point::new(80.0, 20.0), &snap).expect("target");
        assert_eq!(target.axis, LayoutAxis::Row);
        assert_eq!(target.index, 1);
        assert_eq!(target.insertion_rect, Rect::new(104.0, 5.0, 2.0, 50.0));
    }

    #[test]
    fn innermost_container_wins() {
        let snap = LayoutSnapshot::new()
            .with_root(Rect::new(0.0, 0.0, 400.0, 400.0), LayoutAxis::Column, Sides::default())
            .with_container(
                id(1),
                ContainerRef::Root,
                Rect::new(0.0, 0.0, 400.0, 200.0),
                LayoutAxis::Row,
                Sides::default(),
            )
            .with_leaf(id(2), id(1).into(), Rect::new(0.0, 0.0, 100.0, 200.0));
        let target = resolve(Point::new(150.0, 100.0), &snap).expect("target");
        assert_eq!(target.container, ContainerRef::Node(id(1)));
        assert_eq!(target.index, 1);

        let outer = resolve(Point::new(150.0, 300.0), &snap).expect("target");
        assert_eq!(outer.container, ContainerRef::Root);
        assert_eq!(outer.index, 1);
    }

    #[test]
    fn equal_area_keeps_first_registered() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let snap = LayoutSnapshot::new()
            .with_root(Rect::new(0.0, 0.0, 500.0, 500.0), LayoutAxis::Column, Sides::default())
            .with_container(id(1), ContainerRef::Root, rect, LayoutAxis::Column, Sides::default())
            .with_container(id(2), ContainerRef::Root, rect, LayoutAxis::Column, Sides::default());
        let target = resolve(Point::new(50.0, 50.0), &snap).expect("target");
        assert_eq!(target.container, ContainerRef::Node(id(1)));
    }

    #[test]
    fn excluded_subtree_is_invisible() {
        let snap = LayoutSnapshot::new()
            .with_root(Rect::new(0.0, 0.0, 400.0, 400.0), LayoutAxis::Column, Sides::default())
            .with_container(
                id(1),
                ContainerRef::Root,
                Rect::new(0.0, 0.0, 400.0, 100.0),
                LayoutAxis::Column,
                Sides::default(),
            )
            .with_leaf(id(3), id(1).into(), Rect::new(0.0, 0.0, 400.0, 50.0))
            .with_leaf(id(2), ContainerRef::Root, Rect::new(0.0, 100.0, 400.0, 40.0));

        let resolver = Resolver::default();
        let normal = resolver
            .resolve(Point::new(10.0, 40.0), &snap)
            .expect("target");
        assert_eq!(normal.container, ContainerRef::Node(id(1)));

        let hidden = resolver
            .resolve_excluding(Point::new(10.0, 40.0), &snap, Some(id(1)))
            .expect("target");
        assert_eq!(hidden.container, ContainerRef::Root);
        assert_eq!(hidden.index, 0);
    }

    #[test]
    fn excluded_subtree_registered_out_of_order() {
        // Grandchild 3 is registered before its parent 2.
        let container = |snap: LayoutSnapshot, node, parent, rect| {
            snap.with_container(node, parent, rect, LayoutAxis::Column, Sides::default())
        };
        let mut snap = LayoutSnapshot::new().with_root(
            Rect::new(0.0, 0.0, 400.0, 400.0),
            LayoutAxis::Column,
            Sides::default(),
        );
        snap = container(snap, id(1), ContainerRef::Root, Rect::new(0.0, 0.0, 400.0, 300.0));
        snap = container(snap, id(3), id(2).into(), Rect::new(20.0, 20.0, 100.0, 100.0));
        snap = container(snap, id(2), id(1).into(), Rect::new(10.0, 10.0, 200.0, 200.0));

        let target = Resolver::default()
            .resolve_excluding(Point::new(50.0, 50.0), &snap, Some(id(1)))
            .expect("target");
        assert_eq!(target.container, ContainerRef::Root);
        assert_eq!(target.index, 0);
    }

    #[test]
    fn custom_indicator_thickness() {
        let resolver = Resolver::new(ResolverConfig {
            indicator_thickness: 6.0,
        });
        let target = resolver
            .resolve(Point::new(10.0, 10.0), &column_root())
            .expect("target");
        assert_eq!(target.insertion_rect, Rect::new(0.0, -3.0, 400.0, 6.0));
    }
}
