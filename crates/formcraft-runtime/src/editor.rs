//! The editor: one tree store, one drag session, the selection, and the
//! debounced markup pipeline, wired to a shared [`EventChannel`].
//!
//! # Signal flow
//!
//! - Every committed tree mutation is published as
//!   [`EditorEvent::TreeChanged`] and marks the markup dirty.
//! - Requests emitted on the channel by the host (`NewElementRequested`,
//!   `PropertyChanged`, `DeleteRequested`) are queued and applied on the next
//!   [`Editor::process_requests`]. The direct methods do the same work
//!   immediately.
//! - [`Editor::flush_markup`] renders once the scheduler reports due and
//!   publishes [`EditorEvent::MarkupRegenerated`].
//!
//! The selection never points at a node that is no longer in the tree.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use formcraft_core::{
    ComponentNode, ContainerRef, ElementType, EventChannel, NodeId, PatchReport, Point,
    PropertyPatch, Rect, SubscriptionId,
};
use formcraft_layout::GeometryProvider;
use formcraft_markup::MarkupRenderer;
use formcraft_tree::{Forest, ForestSnapshot, TreeStore};
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::event::EditorEvent;
use crate::scheduler::RegenScheduler;
use crate::session::{CancelReason, DragEffect, DragPayload, DragSession, DragTransition};

pub struct Editor {
    config: EditorConfig,
    store: TreeStore,
    session: DragSession,
    selection: Option<NodeId>,
    scheduler: RegenScheduler,
    renderer: MarkupRenderer,
    events: EventChannel<EditorEvent>,
    inbox: Rc<RefCell<VecDeque<EditorEvent>>>,
    inbox_subscription: SubscriptionId,
    /// Last rendered markup, keyed by store revision.
    markup_cache: RefCell<Option<(u64, Arc<str>)>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("session", &self.session.state())
            .field("selection", &self.selection)
            .field("markup_pending", &self.scheduler.is_pending())
            .finish()
    }
}

impl Editor {
    /// An editor over an empty canvas. Fails when `config` does not
    /// validate.
    pub fn new(
        config: EditorConfig,
        events: EventChannel<EditorEvent>,
    ) -> Result<Self, EditorError> {
        Self::with_store(config, events, TreeStore::new())
    }

    /// An editor over an existing forest.
    pub fn with_forest(
        config: EditorConfig,
        events: EventChannel<EditorEvent>,
        forest: Forest,
    ) -> Result<Self, EditorError> {
        let store = TreeStore::with_forest(forest)?;
        Self::with_store(config, events, store)
    }

    /// An editor over a saved document.
    pub fn from_snapshot(
        config: EditorConfig,
        events: EventChannel<EditorEvent>,
        snapshot: &ForestSnapshot,
    ) -> Result<Self, EditorError> {
        Self::with_forest(config, events, snapshot.restore()?)
    }

    fn with_store(
        config: EditorConfig,
        events: EventChannel<EditorEvent>,
        mut store: TreeStore,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let publisher = events.clone();
        store.subscribe(move |change| {
            publisher.emit(EditorEvent::TreeChanged {
                revision: change.revision,
                cause: change.cause.clone(),
            });
        });

        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&inbox);
        let inbox_subscription = events.subscribe(move |event: &EditorEvent| {
            if event.is_request() {
                sink.borrow_mut().push_back(event.clone());
            }
        });

        Ok(Self {
            session: DragSession::from_config(&config),
            scheduler: RegenScheduler::new(config.debounce, config.max_wait),
            renderer: config.renderer(),
            config,
            store,
            selection: None,
            events,
            inbox,
            inbox_subscription,
            markup_cache: RefCell::new(None),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn events(&self) -> &EventChannel<EditorEvent> {
        &self.events
    }

    #[must_use]
    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    #[must_use]
    pub fn forest(&self) -> &Arc<Forest> {
        self.store.forest()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    #[must_use]
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> ForestSnapshot {
        self.store.snapshot()
    }

    /// Replace the document. Clears the selection and cancels any drag.
    pub fn load(&mut self, snapshot: &ForestSnapshot) -> Result<(), EditorError> {
        self.session.cancel(CancelReason::Requested);
        self.mutate(|store| store.restore(snapshot))?;
        self.set_selection(None);
        Ok(())
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Select `id`. Returns `false`, leaving the selection unchanged, when
    /// the node is not in the tree.
    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.set_selection(Some(id));
        true
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        self.selection
    }

    #[must_use]
    pub fn selected_node(&self) -> Option<&Arc<ComponentNode>> {
        self.selection.and_then(|id| self.store.find(id))
    }

    fn set_selection(&mut self, selected: Option<NodeId>) {
        if self.selection == selected {
            return;
        }
        self.selection = selected;
        self.events.emit(EditorEvent::SelectionChanged { selected });
    }

    // ── Property bridge ───────────────────────────────────────────────

    /// Merge `patch` into node `id`. `None` when the node is gone.
    pub fn apply_property_change(
        &mut self,
        id: NodeId,
        patch: &PropertyPatch,
    ) -> Option<PatchReport> {
        self.mutate(|store| store.update_properties(id, patch))
    }

    /// Rename a node in the editor's outline.
    pub fn relabel(&mut self, id: NodeId, label: &str) -> bool {
        self.mutate(|store| store.relabel(id, label))
    }

    /// Delete node `id` and its subtree. Returns `false` when it was already
    /// gone.
    pub fn request_delete(&mut self, id: NodeId) -> bool {
        let removed = self.mutate(|store| store.remove(id)).is_some();
        if let Some(selected) = self.selection
            && !self.store.contains(selected)
        {
            self.set_selection(None);
        }
        removed
    }

    /// Palette click-to-add: create an element of `element_type` (wire name)
    /// under `parent` at `index` and select it.
    pub fn request_new_element(
        &mut self,
        element_type: &str,
        parent: ContainerRef,
        index: usize,
    ) -> Result<NodeId, EditorError> {
        let ty: ElementType = element_type.parse()?;
        let id = self.mutate(|store| store.insert_new(ty, parent, index))?;
        self.set_selection(Some(id));
        Ok(id)
    }

    /// Apply every request queued on the channel since the last call.
    /// Returns how many were handled.
    pub fn process_requests(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(request) = next else {
                break;
            };
            handled += 1;
            debug!(request = request.name(), "processing editor request");
            match request {
                EditorEvent::NewElementRequested {
                    element_type,
                    parent,
                    index,
                } => {
                    if let Err(err) = self.request_new_element(&element_type, parent, index) {
                        warn!(element_type = %element_type, error = %err, "new element request failed");
                    }
                }
                EditorEvent::PropertyChanged { node_id, patch } => {
                    self.apply_property_change(node_id, &patch);
                }
                EditorEvent::DeleteRequested { node_id } => {
                    self.request_delete(node_id);
                }
                _ => {}
            }
        }
        handled
    }

    // ── Drag and drop ─────────────────────────────────────────────────

    pub fn begin_drag(&mut self, payload: DragPayload, origin: Point) -> Vec<DragTransition> {
        self.session.start(payload, origin, &self.store)
    }

    /// Track the pointer against the host's current geometry.
    pub fn drag_to(
        &mut self,
        point: Point,
        geometry: &impl GeometryProvider,
        viewport: Rect,
    ) -> Vec<DragTransition> {
        let snapshot = geometry.snapshot();
        self.session.pointer_move(point, &snapshot, viewport)
    }

    /// Drop at the current target. A committed drop selects the placed node;
    /// a rejected one is published as [`EditorEvent::DropRejected`].
    pub fn drop_drag(&mut self) -> DragTransition {
        let before = self.store.revision();
        let transition = self.session.commit(&mut self.store);
        self.note_mutation(before);
        match &transition.effect {
            DragEffect::Committed { node_id, .. } => self.set_selection(Some(*node_id)),
            DragEffect::Rejected {
                payload, reason, ..
            } => self.events.emit(EditorEvent::DropRejected {
                payload: *payload,
                reason: *reason,
            }),
            _ => {}
        }
        transition
    }

    pub fn cancel_drag(&mut self) -> Option<DragTransition> {
        self.session.cancel(CancelReason::Requested)
    }

    // ── Markup ────────────────────────────────────────────────────────

    /// Markup for the current forest, rendered at most once per revision.
    #[must_use]
    pub fn markup(&self) -> Arc<str> {
        let revision = self.store.revision();
        if let Some((cached, markup)) = self.markup_cache.borrow().as_ref()
            && *cached == revision
        {
            return Arc::clone(markup);
        }
        let markup: Arc<str> = self.renderer.render(self.store.forest()).into();
        *self.markup_cache.borrow_mut() = Some((revision, Arc::clone(&markup)));
        markup
    }

    /// Render and publish the markup if a regeneration is due at `now`.
    pub fn flush_markup(&mut self, now: Instant) -> Option<Arc<str>> {
        if !self.scheduler.poll(now) {
            return None;
        }
        let markup = self.markup();
        self.events.emit(EditorEvent::MarkupRegenerated {
            revision: self.store.revision(),
            markup: Arc::clone(&markup),
        });
        Some(markup)
    }

    #[must_use]
    pub fn markup_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Run a store operation, marking the markup dirty if it committed.
    fn mutate<T>(&mut self, op: impl FnOnce(&mut TreeStore) -> T) -> T {
        let before = self.store.revision();
        let out = op(&mut self.store);
        self.note_mutation(before);
        out
    }

    fn note_mutation(&mut self, before: u64) {
        if self.store.revision() != before {
            self.scheduler.mark_dirty(Instant::now());
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.events.unsubscribe(self.inbox_subscription);
    }
}
