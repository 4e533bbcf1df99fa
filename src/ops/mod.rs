pub mod drag;
pub mod engine;
pub mod invariants;
pub mod move_ops;
pub mod order_map;
pub mod reconcile;
pub mod replay;

use serde::Serialize;
use std::fmt;

/// Result of an engine command. Invalid commands are ignored, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Noop(NoopReason),
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        self == Outcome::Applied
    }
}

impl From<Result<(), NoopReason>> for Outcome {
    fn from(result: Result<(), NoopReason>) -> Self {
        match result {
            Ok(()) => Outcome::Applied,
            Err(reason) => Outcome::Noop(reason),
        }
    }
}

/// Why a command left all state unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    /// No drag gesture is in progress
    NoActiveSession,
    /// Another gesture already owns the pointer
    SessionAlreadyActive,
    /// The referenced item is not in the order
    ItemNotFound,
    /// The item is being edited inline and cannot be dragged
    ItemInEditMode,
    /// The pointer has not moved far enough to start a drag
    ThresholdNotReached,
    /// Released with nothing under the pointer
    NoTarget,
    /// The item would land where it already is
    UnchangedPosition,
    /// The command only applies to synthetic items
    NotSynthetic,
    /// An item with this id already exists
    DuplicateId,
    /// The surface does not accept drops into this container
    ContainerRejected,
    /// No container change is pending for this item
    NothingPending,
}

impl fmt::Display for NoopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoopReason::NoActiveSession => "no active drag",
            NoopReason::SessionAlreadyActive => "a drag is already in progress",
            NoopReason::ItemNotFound => "item not found",
            NoopReason::ItemInEditMode => "item is being edited",
            NoopReason::ThresholdNotReached => "drag threshold not reached",
            NoopReason::NoTarget => "no drop target",
            NoopReason::UnchangedPosition => "position unchanged",
            NoopReason::NotSynthetic => "not a synthetic item",
            NoopReason::DuplicateId => "duplicate item id",
            NoopReason::ContainerRejected => "container does not accept drops",
            NoopReason::NothingPending => "no pending change",
        };
        write!(f, "{}", text)
    }
}
