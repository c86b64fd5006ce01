//! Drag session lifecycle.
//!
//! ```text
//! Idle -> Dragging -> Idle      (commit: Committed | Rejected)
//!             \-----> Idle      (cancel, or commit without a target)
//! ```
//!
//! Every call returns [`DragTransition`] records with a monotonically
//! increasing `transition_id`, so a host can log or replay the exact sequence
//! of effects. Calls that do not apply to the current state produce a
//! [`DragEffect::Noop`] instead of an error.
//!
//! # Invariants
//!
//! 1. While dragging an existing node, that node is the suppressed source:
//!    it and its subtree are excluded from drop-target resolution.
//! 2. A commit mutates the tree at most once, and only through
//!    [`TreeStore::insert_new`] or [`TreeStore::move_node`].
//! 3. Cancelling never touches the tree.
//! 4. Every commit or cancel leaves the session `Idle` with no target and no
//!    feedback.

use formcraft_core::{ContainerRef, ElementType, NodeId, Point, Rect};
use formcraft_layout::{AutoScroll, DropTarget, LayoutSnapshot, Resolver, ScrollNudge};
use formcraft_tree::{TreeError, TreeStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum DragPayload {
    /// A fresh element from the palette.
    New(ElementType),
    /// A node already on the canvas.
    Existing(NodeId),
}

impl DragPayload {
    /// The node to suppress while dragging.
    #[must_use]
    pub const fn source(self) -> Option<NodeId> {
        match self {
            Self::New(_) => None,
            Self::Existing(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragSessionState {
    Idle,
    Dragging {
        payload: DragPayload,
        origin: Point,
        current: Point,
        target: Option<DropTarget>,
    },
}

impl DragSessionState {
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}

/// Explicit diagnostics for calls that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    IdleWithoutActiveDrag,
    /// The node named by a [`DragPayload::Existing`] is not in the tree.
    UnknownSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The host asked for it (escape key, pointer left the window).
    Requested,
    /// Dropped while no valid target was under the pointer.
    NoTarget,
    /// A new drag started before this one ended.
    Restarted,
}

/// Why the tree refused a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    UnknownNode { node_id: NodeId },
    UnknownContainer { container: NodeId },
    NotAContainer { node_id: NodeId },
    CycleRejected { node_id: NodeId, target: NodeId },
    DuplicateId { node_id: NodeId },
    IdsExhausted,
}

impl From<&TreeError> for RejectReason {
    fn from(err: &TreeError) -> Self {
        match *err {
            TreeError::UnknownNode { node_id } => Self::UnknownNode { node_id },
            TreeError::UnknownContainer { container } => Self::UnknownContainer { container },
            TreeError::NotAContainer { node_id } => Self::NotAContainer { node_id },
            TreeError::CycleRejected { node_id, target } => {
                Self::CycleRejected { node_id, target }
            }
            TreeError::DuplicateId { node_id } => Self::DuplicateId { node_id },
            TreeError::IdOverflow(_) => Self::IdsExhausted,
        }
    }
}

/// Effect emitted by one lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Started {
        payload: DragPayload,
        origin: Point,
    },
    /// The pointer moved but the resolved target stayed the same.
    Moved {
        previous: Point,
        current: Point,
    },
    TargetChanged {
        previous: Option<DropTarget>,
        current: Option<DropTarget>,
    },
    AutoScroll {
        nudge: ScrollNudge,
    },
    Committed {
        payload: DragPayload,
        node_id: NodeId,
        container: ContainerRef,
        index: usize,
    },
    Rejected {
        payload: DragPayload,
        target: DropTarget,
        reason: RejectReason,
    },
    Cancelled {
        payload: DragPayload,
        reason: CancelReason,
    },
    Noop {
        reason: NoopReason,
    },
}

/// One state-machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragSessionState,
    pub to: DragSessionState,
    pub effect: DragEffect,
}

impl DragTransition {
    /// The inserted or moved node, when this transition committed a drop.
    #[must_use]
    pub const fn committed_node(&self) -> Option<NodeId> {
        match self.effect {
            DragEffect::Committed { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// The scroll nudge the host should apply, if any.
    #[must_use]
    pub const fn scroll_nudge(&self) -> Option<ScrollNudge> {
        match self.effect {
            DragEffect::AutoScroll { nudge } => Some(nudge),
            _ => None,
        }
    }
}

/// What the host draws while a drag is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragFeedback {
    pub ghost_label: String,
    pub ghost_position: Point,
    /// Insertion indicator for the current target.
    pub indicator: Option<Rect>,
}

/// Drag-and-drop lifecycle machine.
#[derive(Debug, Clone)]
pub struct DragSession {
    state: DragSessionState,
    feedback: Option<DragFeedback>,
    resolver: Resolver,
    auto_scroll: AutoScroll,
    transition_counter: u64,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(Resolver::default(), AutoScroll::default())
    }
}

impl DragSession {
    #[must_use]
    pub const fn new(resolver: Resolver, auto_scroll: AutoScroll) -> Self {
        Self {
            state: DragSessionState::Idle,
            feedback: None,
            resolver,
            auto_scroll,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            Resolver::new(config.resolver_config()),
            config.auto_scroll(),
        )
    }

    #[must_use]
    pub const fn state(&self) -> DragSessionState {
        self.state
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    #[must_use]
    pub const fn payload(&self) -> Option<DragPayload> {
        match self.state {
            DragSessionState::Dragging { payload, .. } => Some(payload),
            DragSessionState::Idle => None,
        }
    }

    /// The existing node being dragged, which the host should render hidden
    /// or dimmed.
    #[must_use]
    pub const fn suppressed(&self) -> Option<NodeId> {
        match self.payload() {
            Some(payload) => payload.source(),
            None => None,
        }
    }

    /// The target a drop would commit to right now.
    #[must_use]
    pub const fn current_target(&self) -> Option<DropTarget> {
        match self.state {
            DragSessionState::Dragging { target, .. } => target,
            DragSessionState::Idle => None,
        }
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&DragFeedback> {
        self.feedback.as_ref()
    }

    /// Begin dragging `payload` from `origin`.
    ///
    /// Starting while a drag is in flight cancels that drag first; both
    /// transitions are returned. Dragging a node that is not in `store` is a
    /// no-op.
    pub fn start(
        &mut self,
        payload: DragPayload,
        origin: Point,
        store: &TreeStore,
    ) -> Vec<DragTransition> {
        let ghost_label = match payload {
            DragPayload::New(ty) => ty.display_name().to_string(),
            DragPayload::Existing(id) => match store.find(id) {
                Some(node) => node.label().to_string(),
                None => {
                    return vec![self.noop(NoopReason::UnknownSource)];
                }
            },
        };

        let mut transitions = Vec::with_capacity(2);
        if self.is_dragging() {
            transitions.extend(self.cancel(CancelReason::Restarted));
        }

        let from = self.state;
        self.state = DragSessionState::Dragging {
            payload,
            origin,
            current: origin,
            target: None,
        };
        self.feedback = Some(DragFeedback {
            ghost_label,
            ghost_position: origin,
            indicator: None,
        });
        transitions.push(self.record(from, DragEffect::Started { payload, origin }));
        transitions
    }

    /// Track the pointer: re-resolve the drop target against `snapshot`,
    /// update the feedback, and evaluate auto-scroll against `viewport`.
    ///
    /// Yields a `Moved` or `TargetChanged` transition, followed by an
    /// `AutoScroll` transition when the pointer sits in an edge band.
    pub fn pointer_move(
        &mut self,
        point: Point,
        snapshot: &LayoutSnapshot,
        viewport: Rect,
    ) -> Vec<DragTransition> {
        let DragSessionState::Dragging {
            payload,
            origin,
            current,
            target,
        } = self.state
        else {
            return vec![self.noop(NoopReason::IdleWithoutActiveDrag)];
        };

        let resolved = self
            .resolver
            .resolve_excluding(point, snapshot, payload.source());
        let from = self.state;
        self.state = DragSessionState::Dragging {
            payload,
            origin,
            current: point,
            target: resolved,
        };
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.ghost_position = point;
            feedback.indicator = resolved.map(|t| t.insertion_rect);
        }

        let effect = if resolved == target {
            DragEffect::Moved {
                previous: current,
                current: point,
            }
        } else {
            DragEffect::TargetChanged {
                previous: target,
                current: resolved,
            }
        };
        let mut transitions = vec![self.record(from, effect)];
        if let Some(nudge) = self.auto_scroll.evaluate(point, viewport) {
            let from = self.state;
            transitions.push(self.record(from, DragEffect::AutoScroll { nudge }));
        }
        transitions
    }

    /// Drop at the current target.
    ///
    /// No target cancels. A new element is created with its type's defaults;
    /// an existing node is moved. Structural rejections from the store end
    /// the session with [`DragEffect::Rejected`] and leave the tree as it was.
    pub fn commit(&mut self, store: &mut TreeStore) -> DragTransition {
        let DragSessionState::Dragging {
            payload, target, ..
        } = self.state
        else {
            return self.noop(NoopReason::IdleWithoutActiveDrag);
        };
        let Some(target) = target else {
            return self.finish(DragEffect::Cancelled {
                payload,
                reason: CancelReason::NoTarget,
            });
        };

        let outcome = match payload {
            DragPayload::New(ty) => store.insert_new(ty, target.container, target.index),
            DragPayload::Existing(id) => store
                .move_node(id, target.container, target.index)
                .map(|()| id),
        };
        let effect = match outcome {
            Ok(node_id) => DragEffect::Committed {
                payload,
                node_id,
                container: target.container,
                index: target.index,
            },
            Err(err) => DragEffect::Rejected {
                payload,
                target,
                reason: RejectReason::from(&err),
            },
        };
        self.finish(effect)
    }

    /// Abandon the drag without touching the tree.
    pub fn cancel(&mut self, reason: CancelReason) -> Option<DragTransition> {
        let payload = self.payload()?;
        Some(self.finish(DragEffect::Cancelled { payload, reason }))
    }

    fn finish(&mut self, effect: DragEffect) -> DragTransition {
        let from = self.state;
        self.state = DragSessionState::Idle;
        self.feedback = None;
        self.record(from, effect)
    }

    fn noop(&mut self, reason: NoopReason) -> DragTransition {
        let from = self.state;
        self.record(from, DragEffect::Noop { reason })
    }

    fn record(&mut self, from: DragSessionState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        };
        match effect {
            DragEffect::Moved { .. } | DragEffect::AutoScroll { .. } => {
                tracing::trace!(id = transition.transition_id, effect = ?effect, "drag transition");
            }
            DragEffect::Rejected { reason, .. } => {
                tracing::warn!(id = transition.transition_id, reason = ?reason, "drop rejected");
            }
            _ => {
                debug!(id = transition.transition_id, effect = ?effect, "drag transition");
            }
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcraft_core::{LayoutAxis, Sides};

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw).expect("test ID must be non-zero")
    }

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 400.0, 600.0);

    fn empty_canvas() -> LayoutSnapshot {
        LayoutSnapshot::new().with_root(VIEWPORT, LayoutAxis::Column, Sides::all(8.0))
    }

    #[test]
    fn idle_calls_are_noops() {
        let mut session = DragSession::default();
        let mut store = TreeStore::new();
        let moved = session.pointer_move(Point::new(10.0, 10.0), &empty_canvas(), VIEWPORT);
        assert_eq!(moved.len(), 1);
        assert_eq!(
            moved[0].effect,
            DragEffect::Noop {
                reason: NoopReason::IdleWithoutActiveDrag
            }
        );
        assert_eq!(
            session.commit(&mut store).effect,
            DragEffect::Noop {
                reason: NoopReason::IdleWithoutActiveDrag
            }
        );
        assert!(session.cancel(CancelReason::Requested).is_none());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn new_element_drop_on_empty_canvas() {
        let mut session = DragSession::default();
        let mut store = TreeStore::new();
        let started = session.start(
            DragPayload::New(ElementType::TextInput),
            Point::new(200.0, 300.0),
            &store,
        );
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].transition_id, 1);
        assert_eq!(session.suppressed(), None);
        assert_eq!(
            session.feedback().map(|f| f.ghost_label.as_str()),
            Some("Text Input")
        );

        let moved = session.pointer_move(Point::new(200.0, 300.0), &empty_canvas(), VIEWPORT);
        let target = session.current_target().expect("root is droppable");
        assert_eq!(target.container, ContainerRef::Root);
        assert_eq!(target.index, 0);
        assert!(matches!(
            moved[0].effect,
            DragEffect::TargetChanged { previous: None, .. }
        ));
        assert_eq!(
            session.feedback().and_then(|f| f.indicator),
            Some(target.insertion_rect)
        );

        let done = session.commit(&mut store);
        assert_eq!(done.committed_node(), Some(id(1)));
        assert_eq!(done.to, DragSessionState::Idle);
        assert!(session.feedback().is_none());
        assert_eq!(store.forest().len(), 1);
        assert_eq!(store.forest()[0].element_type(), Some(ElementType::TextInput));
    }

    #[test]
    fn commit_without_target_cancels() {
        let mut session = DragSession::default();
        let mut store = TreeStore::new();
        session.start(
            DragPayload::New(ElementType::Button),
            Point::new(0.0, 0.0),
            &store,
        );
        // Off the canvas: nothing resolves.
        session.pointer_move(Point::new(900.0, 900.0), &empty_canvas(), VIEWPORT);
        assert_eq!(session.current_target(), None);
        let done = session.commit(&mut store);
        assert_eq!(
            done.effect,
            DragEffect::Cancelled {
                payload: DragPayload::New(ElementType::Button),
                reason: CancelReason::NoTarget,
            }
        );
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn restarting_cancels_the_previous_drag() {
        let mut session = DragSession::default();
        let store = TreeStore::new();
        session.start(
            DragPayload::New(ElementType::Heading),
            Point::new(1.0, 1.0),
            &store,
        );
        let restarted = session.start(
            DragPayload::New(ElementType::Paragraph),
            Point::new(2.0, 2.0),
            &store,
        );
        assert_eq!(restarted.len(), 2);
        assert!(matches!(
            restarted[0].effect,
            DragEffect::Cancelled {
                reason: CancelReason::Restarted,
                ..
            }
        ));
        assert!(matches!(restarted[1].effect, DragEffect::Started { .. }));
        assert!(restarted[0].transition_id < restarted[1].transition_id);
        assert_eq!(
            session.payload(),
            Some(DragPayload::New(ElementType::Paragraph))
        );
    }

    #[test]
    fn unknown_existing_source_is_ignored() {
        let mut session = DragSession::default();
        let store = TreeStore::new();
        let out = session.start(DragPayload::Existing(id(7)), Point::default(), &store);
        assert_eq!(
            out[0].effect,
            DragEffect::Noop {
                reason: NoopReason::UnknownSource
            }
        );
        assert!(!session.is_dragging());
    }

    #[test]
    fn existing_source_is_suppressed_and_excluded() {
        let mut store = TreeStore::new();
        let outer = store
            .insert_new(ElementType::Container, ContainerRef::Root, 0)
            .expect("outer");
        let snapshot = LayoutSnapshot::new()
            .with_root(VIEWPORT, LayoutAxis::Column, Sides::default())
            .with_container(
                outer,
                ContainerRef::Root,
                Rect::new(0.0, 0.0, 400.0, 200.0),
                LayoutAxis::Row,
                Sides::default(),
            );

        let mut session = DragSession::default();
        session.start(DragPayload::Existing(outer), Point::new(50.0, 50.0), &store);
        assert_eq!(session.suppressed(), Some(outer));
        session.pointer_move(Point::new(100.0, 100.0), &snapshot, VIEWPORT);
        let target = session.current_target().expect("root");
        assert_eq!(target.container, ContainerRef::Root);
    }

    #[test]
    fn pointer_in_edge_band_scrolls() {
        let mut session = DragSession::default();
        let store = TreeStore::new();
        session.start(
            DragPayload::New(ElementType::Checkbox),
            Point::default(),
            &store,
        );
        let out = session.pointer_move(Point::new(200.0, 590.0), &empty_canvas(), VIEWPORT);
        assert_eq!(out.len(), 2);
        assert_eq!(
            out[1].scroll_nudge(),
            Some(ScrollNudge { dx: 0.0, dy: 12.0 })
        );

        let out = session.pointer_move(Point::new(200.0, 300.0), &empty_canvas(), VIEWPORT);
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].effect, DragEffect::Moved { .. }));
    }

    #[test]
    fn cancel_leaves_tree_alone() {
        let mut session = DragSession::default();
        let store = TreeStore::new();
        session.start(
            DragPayload::New(ElementType::Select),
            Point::default(),
            &store,
        );
        session.pointer_move(Point::new(100.0, 100.0), &empty_canvas(), VIEWPORT);
        let cancelled = session.cancel(CancelReason::Requested).expect("dragging");
        assert_eq!(cancelled.to, DragSessionState::Idle);
        assert_eq!(session.current_target(), None);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn reject_reason_maps_tree_errors() {
        let err = TreeError::CycleRejected {
            node_id: id(1),
            target: id(2),
        };
        assert_eq!(
            RejectReason::from(&err),
            RejectReason::CycleRejected {
                node_id: id(1),
                target: id(2)
            }
        );
    }
}
