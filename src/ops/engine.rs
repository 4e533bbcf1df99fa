use std::collections::HashMap;

use indexmap::IndexMap;

use crate::adapter::ContainerAdapter;
use crate::model::{EngineConfig, Entity, ItemRef};
use crate::ops::drag::{DragEnd, DragSession, DragState, DragTracker, DropTarget, Point};
use crate::ops::invariants;
use crate::ops::move_ops::{self, ChangeSink, ContainerChange};
use crate::ops::order_map::OrderMap;
use crate::ops::reconcile::{self, Membership};
use crate::ops::{NoopReason, Outcome};

/// Display-order state for one view instance.
///
/// Owns the `OrderMap`, the drag gesture and the set of container changes
/// that were requested but not yet reflected by a snapshot. Callers feed it
/// every new snapshot explicitly through [`OrderEngine::observe_snapshot`].
///
/// Cross-container moves are optimistic: the order changes on drop and a
/// [`ContainerChange`] goes out. Until the collaborator acknowledges it, or a
/// snapshot shows the latest requested container, the item stays where it
/// was dropped, however many unrelated snapshots arrive. A second move of the
/// same item supersedes the first. A snapshot that puts the item somewhere no
/// outstanding request points is another client's move, and wins.
pub struct OrderEngine<A: ContainerAdapter> {
    adapter: A,
    strict_invariants: bool,
    order: OrderMap<A::Key>,
    /// `(entity id, container)` from the latest snapshot, in snapshot order
    placements: Vec<(String, Option<A::Key>)>,
    drag: DragTracker<A::Key>,
    editing: Option<ItemRef>,
    /// Outstanding requests per entity id, oldest first. The last one is
    /// where the item is shown.
    pending: IndexMap<String, Vec<ContainerChange<A::Key>>>,
    revision: u64,
}

impl<A: ContainerAdapter> OrderEngine<A> {
    /// Seed the order from an initial snapshot.
    pub fn new(adapter: A, config: &EngineConfig, snapshot: &[A::Entity]) -> Self {
        let mut engine = OrderEngine {
            adapter,
            strict_invariants: config.reconcile.strict_invariants,
            order: OrderMap::new(),
            placements: Vec::new(),
            drag: DragTracker::new(config.drag.activation_distance),
            editing: None,
            pending: IndexMap::new(),
            revision: 0,
        };
        engine.observe_snapshot(snapshot);
        engine
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn order_map(&self) -> &OrderMap<A::Key> {
        &self.order
    }

    /// Items of a container in display order
    pub fn ordered_items(&self, key: &A::Key) -> &[ItemRef] {
        self.order.items(key)
    }

    /// Containers to render: declared ones in surface order, then any other
    /// container currently holding items.
    pub fn containers(&self) -> Vec<A::Key> {
        let mut keys = self.adapter.declared_containers();
        for key in self.order.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// The active drag session, if any
    pub fn is_dragging(&self) -> Option<&DragSession<A::Key>> {
        self.drag.session()
    }

    pub fn drag_state(&self) -> &DragState<A::Key> {
        self.drag.state()
    }

    pub fn editing(&self) -> Option<&ItemRef> {
        self.editing.as_ref()
    }

    /// The latest unsettled container change of each item
    pub fn pending_changes(&self) -> impl Iterator<Item = &ContainerChange<A::Key>> {
        self.pending.values().filter_map(|moves| moves.last())
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Reconcile against a fresh authoritative snapshot.
    /// Returns whether the order changed.
    pub fn observe_snapshot(&mut self, snapshot: &[A::Entity]) -> bool {
        let next = snapshot
            .iter()
            .map(|entity| (entity.id().to_string(), self.adapter.container_of(entity)))
            .collect();
        let previous = std::mem::replace(&mut self.placements, next);
        self.settle_pending(&previous);
        self.refresh()
    }

    fn refresh(&mut self) -> bool {
        let pending = &self.pending;
        let membership = Membership::from_placements(self.placements.iter().map(|(id, key)| {
            let key = match pending.get(id).and_then(|moves| moves.last()) {
                Some(change) => Some(change.container.clone()),
                None => key.clone(),
            };
            (id.clone(), key)
        }));

        let changed = match reconcile::reconcile_membership(&self.order, &membership) {
            Some(next) => {
                self.order = next;
                true
            }
            None => false,
        };
        self.check_invariants(Some(&membership));
        self.forget_vanished();
        changed
    }

    /// Settle outstanding requests against a new snapshot.
    ///
    /// An item whose placement changed since `previous` either landed one of
    /// its own requests (that request and every older one are done) or was
    /// moved by someone else (all of them are dropped). With a single request
    /// left, a snapshot showing its container confirms it.
    fn settle_pending(&mut self, previous: &[(String, Option<A::Key>)]) {
        let before: HashMap<&str, Option<&A::Key>> = previous
            .iter()
            .map(|(id, key)| (id.as_str(), key.as_ref()))
            .collect();
        let now: HashMap<&str, Option<&A::Key>> = self
            .placements
            .iter()
            .map(|(id, key)| (id.as_str(), key.as_ref()))
            .collect();
        self.pending.retain(|id, moves| {
            let Some(&placed) = now.get(id.as_str()) else {
                tracing::debug!(item = %id, "entity removed, dropping pending move");
                return false;
            };
            if before.get(id.as_str()) != Some(&placed) {
                match moves.iter().position(|m| placed == Some(&m.container)) {
                    Some(landed) => {
                        moves.drain(..=landed);
                    }
                    None => {
                        tracing::info!(item = %id, "moved elsewhere by another client, dropping pending move");
                        return false;
                    }
                }
            }
            match moves.as_slice() {
                [] => {
                    tracing::debug!(item = %id, "move confirmed");
                    false
                }
                [only] if placed == Some(&only.container) => {
                    tracing::debug!(item = %id, to = %only.container, revision = only.revision, "move confirmed");
                    false
                }
                _ => true,
            }
        });
    }

    fn check_invariants(&mut self, membership: Option<&Membership<A::Key>>) {
        let violations = invariants::verify(&self.order, membership);
        if violations.is_empty() {
            return;
        }
        if self.strict_invariants {
            panic!("order invariants violated: {:?}", violations);
        }
        match membership {
            Some(membership) => invariants::heal(&mut self.order, membership, &violations),
            None => {
                for violation in &violations {
                    tracing::warn!(%violation, "order invariant violated, dropping repeats");
                }
                invariants::dedupe(&mut self.order);
            }
        }
    }

    /// A gesture or edit whose item disappeared cannot continue.
    fn forget_vanished(&mut self) {
        let dragged = match self.drag.state() {
            DragState::Idle => None,
            DragState::Pressed(press) => Some(&press.item),
            DragState::Active(session) => Some(&session.item),
        };
        if let Some(item) = dragged
            && !self.order.contains(item)
        {
            tracing::debug!(item = %item, "dragged item vanished, cancelling drag");
            self.drag.cancel();
        }
        if let Some(item) = &self.editing
            && !self.order.contains(item)
        {
            self.editing = None;
        }
    }

    // -----------------------------------------------------------------------
    // Drag commands
    // -----------------------------------------------------------------------

    /// Pointer down on an item. The drag starts once [`OrderEngine::motion`]
    /// reports enough travel; releasing earlier is a click.
    pub fn press(&mut self, item: &ItemRef, at: Point) -> Outcome {
        match self.locate_draggable(item) {
            Ok((key, index)) => self.drag.press(item.clone(), key, index, at),
            Err(reason) => noop(reason),
        }
    }

    pub fn motion(&mut self, at: Point) -> Outcome {
        self.drag.motion(at)
    }

    /// Start dragging `item` immediately.
    pub fn begin_drag(&mut self, item: &ItemRef) -> Outcome {
        match self.locate_draggable(item) {
            Ok((key, index)) => self.drag.begin(item.clone(), key, index),
            Err(reason) => noop(reason),
        }
    }

    fn locate_draggable(&self, item: &ItemRef) -> Result<(A::Key, usize), NoopReason> {
        if !self.drag.is_idle() {
            return Err(NoopReason::SessionAlreadyActive);
        }
        if self.editing.as_ref() == Some(item) {
            return Err(NoopReason::ItemInEditMode);
        }
        let (key, index) = self.order.locate(item).ok_or(NoopReason::ItemNotFound)?;
        Ok((key.clone(), index))
    }

    /// Report what is under the pointer. An item wins over the container
    /// zone around it; neither clears the target. Never changes the order.
    pub fn update_hover(&mut self, container: Option<A::Key>, anchor: Option<&ItemRef>) -> Outcome {
        if self.drag.session().is_none() {
            return noop(NoopReason::NoActiveSession);
        }
        match self.resolve_target(container, anchor) {
            Ok(target) => self.drag.hover(target),
            Err(reason) => {
                self.drag.hover(None);
                noop(reason)
            }
        }
    }

    fn resolve_target(
        &self,
        container: Option<A::Key>,
        anchor: Option<&ItemRef>,
    ) -> Result<Option<DropTarget<A::Key>>, NoopReason> {
        if let Some(anchor) = anchor {
            match self.order.locate(anchor) {
                Some((key, _)) if self.adapter.accepts(key) => {
                    return Ok(Some(DropTarget {
                        container: key.clone(),
                        anchor: Some(anchor.clone()),
                    }));
                }
                Some(_) => return Err(NoopReason::ContainerRejected),
                None => {
                    tracing::debug!(anchor = %anchor, "hover anchor not found, using container");
                }
            }
        }
        match container {
            Some(key) if self.adapter.accepts(&key) => Ok(Some(DropTarget {
                container: key,
                anchor: None,
            })),
            Some(_) => Err(NoopReason::ContainerRejected),
            None => Ok(None),
        }
    }

    /// Pointer up. Commits when hovering a target, cancels otherwise.
    pub fn release(&mut self, sink: &mut impl ChangeSink<A::Key>) -> Outcome {
        match self.drag.release() {
            None => noop(NoopReason::NoActiveSession),
            Some(DragEnd::Click(_)) => noop(NoopReason::ThresholdNotReached),
            Some(DragEnd::Cancelled(_)) => noop(NoopReason::NoTarget),
            Some(DragEnd::Committed(session)) => self.apply_commit(&session, sink),
        }
    }

    /// Drop the active session at its current target.
    pub fn commit_drag(&mut self, sink: &mut impl ChangeSink<A::Key>) -> Outcome {
        if self.drag.session().is_none() {
            return noop(NoopReason::NoActiveSession);
        }
        self.release(sink)
    }

    /// Abandon the gesture. Nothing about the order changes.
    pub fn cancel_drag(&mut self) -> Outcome {
        match self.drag.cancel() {
            Some(_) => Outcome::Applied,
            None => noop(NoopReason::NoActiveSession),
        }
    }

    fn apply_commit(
        &mut self,
        session: &DragSession<A::Key>,
        sink: &mut impl ChangeSink<A::Key>,
    ) -> Outcome {
        match move_ops::commit(session, &mut self.order) {
            Ok(committed) => {
                if let Some((id, key)) = committed.field_change() {
                    let (id, key) = (id.to_string(), key.clone());
                    self.request_change(id, key, sink);
                }
                self.check_invariants(None);
                Outcome::Applied
            }
            Err(reason) => noop(reason),
        }
    }

    fn request_change(
        &mut self,
        item_id: String,
        container: A::Key,
        sink: &mut impl ChangeSink<A::Key>,
    ) {
        self.revision += 1;
        let change = ContainerChange {
            item_id: item_id.clone(),
            container,
            revision: self.revision,
        };
        let moves = self.pending.entry(item_id).or_default();
        if let Some(previous) = moves.last() {
            tracing::info!(
                item = %change.item_id,
                superseded = previous.revision,
                revision = change.revision,
                "move supersedes in-flight move"
            );
        }
        moves.push(change.clone());
        tracing::debug!(item = %change.item_id, to = %change.container, revision = change.revision, "requesting container change");
        sink.request_container_change(change);
    }

    /// The collaborator applied the request `revision` for `item_id`, and
    /// every older one. Once nothing newer is outstanding, snapshots place the
    /// item again. The order itself only changes on the next snapshot.
    pub fn acknowledge_change(&mut self, item_id: &str, revision: u64) -> Outcome {
        let Some(moves) = self.pending.get_mut(item_id) else {
            return noop(NoopReason::NothingPending);
        };
        let before = moves.len();
        moves.retain(|m| m.revision > revision);
        if moves.len() == before {
            return noop(NoopReason::NothingPending);
        }
        tracing::debug!(item = %item_id, revision, outstanding = moves.len(), "container change acknowledged");
        if moves.is_empty() {
            self.pending.shift_remove(item_id);
        }
        Outcome::Applied
    }

    /// The collaborator could not apply a requested change. The item goes
    /// back to wherever the latest snapshot puts it.
    pub fn reject_change(&mut self, item_id: &str) -> Outcome {
        if self.pending.shift_remove(item_id).is_none() {
            return noop(NoopReason::NothingPending);
        }
        tracing::info!(item = %item_id, "container change rejected");
        self.refresh();
        Outcome::Applied
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Inline title editing. The item cannot be dragged until
    /// [`OrderEngine::end_edit`].
    pub fn begin_edit(&mut self, item: &ItemRef) -> Outcome {
        if !self.order.contains(item) {
            return noop(NoopReason::ItemNotFound);
        }
        if let DragState::Pressed(press) = self.drag.state()
            && &press.item == item
        {
            self.drag.cancel();
        }
        self.editing = Some(item.clone());
        Outcome::Applied
    }

    pub fn end_edit(&mut self) -> Outcome {
        match self.editing.take() {
            Some(_) => Outcome::Applied,
            None => noop(NoopReason::ItemNotFound),
        }
    }

    // -----------------------------------------------------------------------
    // Direct order commands
    // -----------------------------------------------------------------------

    /// Create a synthetic item right after `after`, or at the end of the
    /// container. Returns the new item.
    pub fn create_synthetic_item(
        &mut self,
        key: A::Key,
        after: Option<&ItemRef>,
    ) -> Result<ItemRef, NoopReason> {
        if !self.adapter.accepts(&key) {
            tracing::debug!(container = %key, "synthetic item refused by surface");
            return Err(NoopReason::ContainerRejected);
        }
        let item = ItemRef::Synthetic(ulid::Ulid::new().to_string().to_lowercase());
        let index = self.order.insert_after(key.clone(), item.clone(), after);
        tracing::debug!(item = %item, container = %key, index, "synthetic item created");
        Ok(item)
    }

    /// Like [`OrderEngine::create_synthetic_item`] with a caller-chosen id.
    pub fn insert_synthetic_item(
        &mut self,
        key: A::Key,
        id: impl Into<String>,
        after: Option<&ItemRef>,
    ) -> Outcome {
        let id = id.into();
        if !self.adapter.accepts(&key) {
            return noop(NoopReason::ContainerRejected);
        }
        if self.order.resolve(&id).is_some() || self.placements.iter().any(|(p, _)| *p == id) {
            return noop(NoopReason::DuplicateId);
        }
        let item = ItemRef::Synthetic(id);
        let index = self.order.insert_after(key.clone(), item.clone(), after);
        tracing::debug!(item = %item, container = %key, index, "synthetic item created");
        Outcome::Applied
    }

    pub fn delete_synthetic_item(&mut self, id: &str) -> Outcome {
        let item = ItemRef::Synthetic(id.to_string());
        if self.order.remove(&item).is_some() {
            tracing::debug!(item = %item, "synthetic item deleted");
            self.forget_vanished();
            return Outcome::Applied;
        }
        if self.order.contains(&ItemRef::Entity(id.to_string())) {
            noop(NoopReason::NotSynthetic)
        } else {
            noop(NoopReason::ItemNotFound)
        }
    }

    /// Move `item` before `before` inside `key`, or to its end.
    pub fn reorder_within_container(
        &mut self,
        key: &A::Key,
        item: &ItemRef,
        before: Option<&ItemRef>,
    ) -> Outcome {
        move_ops::reorder_within(&mut self.order, key, item, before)
            .map(|_| ())
            .into()
    }
}

fn noop(reason: NoopReason) -> Outcome {
    tracing::debug!(%reason, "command ignored");
    Outcome::Noop(reason)
}
