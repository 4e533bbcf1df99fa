//! Pointer-drag lifecycle.
//!
//! ```text
//! Idle -> Pressed -> Active -> Hovering -> Committed -> Idle
//!            \          \---------\-----> Cancelled -> Idle
//!             \-> Idle (released below the threshold: a click)
//! ```
//!
//! The tracker never touches an `OrderMap`. Hover updates only change what
//! the UI highlights, so a cancelled drag leaves every order untouched.

use serde::{Deserialize, Serialize};

use crate::model::{ContainerKey, ItemRef};
use crate::ops::{NoopReason, Outcome};

/// Pointer position in view coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Where the dragged item would land if released now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget<K> {
    pub container: K,
    /// Insert before this item; `None` appends
    pub anchor: Option<ItemRef>,
}

/// One in-progress drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession<K> {
    pub item: ItemRef,
    pub source: K,
    pub source_index: usize,
    pub over: Option<DropTarget<K>>,
}

impl<K> DragSession<K> {
    pub fn is_hovering(&self) -> bool {
        self.over.is_some()
    }
}

/// A press that has not yet travelled far enough to count as a drag
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPress<K> {
    pub item: ItemRef,
    pub source: K,
    pub source_index: usize,
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState<K> {
    Idle,
    Pressed(PendingPress<K>),
    Active(DragSession<K>),
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEnd<K> {
    /// Released over a valid target; the session must be committed
    Committed(DragSession<K>),
    /// Released with no target, or cancelled explicitly
    Cancelled(DragSession<K>),
    /// Released before the drag threshold; the press was a click
    Click(ItemRef),
}

/// Drag lifecycle for a single surface. At most one gesture at a time.
#[derive(Debug, Clone)]
pub struct DragTracker<K> {
    state: DragState<K>,
    activation_distance: f32,
}

impl<K: ContainerKey> DragTracker<K> {
    pub fn new(activation_distance: f32) -> Self {
        DragTracker {
            state: DragState::Idle,
            activation_distance: activation_distance.max(0.0),
        }
    }

    pub fn state(&self) -> &DragState<K> {
        &self.state
    }

    pub fn activation_distance(&self) -> f32 {
        self.activation_distance
    }

    /// The active session, if a drag is past its threshold
    pub fn session(&self) -> Option<&DragSession<K>> {
        match &self.state {
            DragState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// Pointer down on an item. Ignored while another gesture is in progress.
    pub fn press(&mut self, item: ItemRef, source: K, source_index: usize, origin: Point) -> Outcome {
        if !self.is_idle() {
            return Outcome::Noop(NoopReason::SessionAlreadyActive);
        }
        tracing::trace!(item = %item, from = %source, "drag: pressed");
        self.state = DragState::Pressed(PendingPress {
            item,
            source,
            source_index,
            origin,
        });
        Outcome::Applied
    }

    /// Pointer moved. A pressed item becomes an active drag once it has
    /// travelled more than the activation distance.
    pub fn motion(&mut self, at: Point) -> Outcome {
        match &self.state {
            DragState::Idle => Outcome::Noop(NoopReason::NoActiveSession),
            DragState::Active(_) => Outcome::Applied,
            DragState::Pressed(press) => {
                if press.origin.distance_to(at) <= self.activation_distance {
                    return Outcome::Noop(NoopReason::ThresholdNotReached);
                }
                let session = DragSession {
                    item: press.item.clone(),
                    source: press.source.clone(),
                    source_index: press.source_index,
                    over: None,
                };
                tracing::debug!(item = %session.item, from = %session.source, "drag: started");
                self.state = DragState::Active(session);
                Outcome::Applied
            }
        }
    }

    /// Start a drag directly, skipping the press threshold (keyboard drags,
    /// or callers that run their own activation logic).
    pub fn begin(&mut self, item: ItemRef, source: K, source_index: usize) -> Outcome {
        if !self.is_idle() {
            return Outcome::Noop(NoopReason::SessionAlreadyActive);
        }
        tracing::debug!(item = %item, from = %source, "drag: started");
        self.state = DragState::Active(DragSession {
            item,
            source,
            source_index,
            over: None,
        });
        Outcome::Applied
    }

    /// Replace the current drop target. `None` clears it, meaning a release
    /// now would cancel.
    pub fn hover(&mut self, target: Option<DropTarget<K>>) -> Outcome {
        match &mut self.state {
            DragState::Active(session) => {
                if session.over != target {
                    tracing::trace!(
                        item = %session.item,
                        over = ?target.as_ref().map(|t| t.container.to_string()),
                        "drag: hover"
                    );
                    session.over = target;
                }
                Outcome::Applied
            }
            _ => Outcome::Noop(NoopReason::NoActiveSession),
        }
    }

    /// Pointer released. Always returns the tracker to idle.
    pub fn release(&mut self) -> Option<DragEnd<K>> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Pressed(press) => Some(DragEnd::Click(press.item)),
            DragState::Active(session) if session.is_hovering() => Some(DragEnd::Committed(session)),
            DragState::Active(session) => {
                tracing::debug!(item = %session.item, "drag: released without target");
                Some(DragEnd::Cancelled(session))
            }
        }
    }

    /// Escape, focus loss, or the dragged item vanished.
    pub fn cancel(&mut self) -> Option<DragEnd<K>> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => None,
            DragState::Pressed(press) => Some(DragEnd::Click(press.item)),
            DragState::Active(session) => {
                tracing::debug!(item = %session.item, "drag: cancelled");
                Some(DragEnd::Cancelled(session))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> DragTracker<String> {
        DragTracker::new(5.0)
    }

    fn target(container: &str, anchor: Option<&str>) -> Option<DropTarget<String>> {
        Some(DropTarget {
            container: container.to_string(),
            anchor: anchor.map(ItemRef::entity),
        })
    }

    #[test]
    fn distance() {
        assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn press_then_small_motion_stays_pressed() {
        let mut t = tracker();
        t.press(ItemRef::entity("a"), "mon".into(), 0, Point::new(10.0, 10.0));
        assert_eq!(
            t.motion(Point::new(13.0, 14.0)),
            Outcome::Noop(NoopReason::ThresholdNotReached)
        );
        assert!(t.session().is_none());
        assert_eq!(t.release(), Some(DragEnd::Click(ItemRef::entity("a"))));
        assert!(t.is_idle());
    }

    #[test]
    fn motion_past_threshold_activates() {
        let mut t = tracker();
        t.press(ItemRef::entity("a"), "mon".into(), 2, Point::new(0.0, 0.0));
        assert_eq!(t.motion(Point::new(0.0, 5.5)), Outcome::Applied);
        let session = t.session().unwrap();
        assert_eq!(session.item, ItemRef::entity("a"));
        assert_eq!(session.source, "mon");
        assert_eq!(session.source_index, 2);
        assert!(!session.is_hovering());
    }

    #[test]
    fn second_press_is_ignored() {
        let mut t = tracker();
        t.begin(ItemRef::entity("a"), "mon".into(), 0);
        assert_eq!(
            t.press(ItemRef::entity("b"), "mon".into(), 1, Point::default()),
            Outcome::Noop(NoopReason::SessionAlreadyActive)
        );
        assert_eq!(
            t.begin(ItemRef::entity("b"), "mon".into(), 1),
            Outcome::Noop(NoopReason::SessionAlreadyActive)
        );
        assert_eq!(t.session().unwrap().item, ItemRef::entity("a"));
    }

    #[test]
    fn release_with_target_commits() {
        let mut t = tracker();
        t.begin(ItemRef::entity("a"), "mon".into(), 0);
        t.hover(target("tue", Some("c")));
        match t.release() {
            Some(DragEnd::Committed(session)) => {
                assert_eq!(session.over, target("tue", Some("c")));
            }
            other => panic!("expected commit, got {:?}", other),
        }
        assert!(t.is_idle());
    }

    #[test]
    fn clearing_hover_makes_release_cancel() {
        let mut t = tracker();
        t.begin(ItemRef::entity("a"), "mon".into(), 0);
        t.hover(target("tue", None));
        t.hover(None);
        assert!(matches!(t.release(), Some(DragEnd::Cancelled(_))));
    }

    #[test]
    fn hover_and_release_without_session_are_noops() {
        let mut t = tracker();
        assert_eq!(t.hover(target("tue", None)), Outcome::Noop(NoopReason::NoActiveSession));
        assert_eq!(t.motion(Point::default()), Outcome::Noop(NoopReason::NoActiveSession));
        assert_eq!(t.release(), None);
        assert_eq!(t.cancel(), None);
    }

    #[test]
    fn cancel_returns_session() {
        let mut t = tracker();
        t.begin(ItemRef::entity("a"), "mon".into(), 0);
        t.hover(target("tue", None));
        assert!(matches!(t.cancel(), Some(DragEnd::Cancelled(s)) if s.item == ItemRef::entity("a")));
        assert!(t.is_idle());
    }
}
