use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an item is backed by an authoritative row or exists only as display metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Entity,
    Synthetic,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Entity => write!(f, "entity"),
            ItemKind::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// A reference to one orderable item inside a container.
///
/// The two variants never compare equal, even when their ids match, so a
/// heading and a task can never be confused at a container boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    /// Corresponds 1:1 with a row in the authoritative collection
    Entity(String),
    /// Display-only marker (e.g. an inline heading); never created or
    /// removed by reconciliation
    Synthetic(String),
}

impl ItemRef {
    pub fn entity(id: impl Into<String>) -> Self {
        ItemRef::Entity(id.into())
    }

    pub fn synthetic(id: impl Into<String>) -> Self {
        ItemRef::Synthetic(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            ItemRef::Entity(id) | ItemRef::Synthetic(id) => id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRef::Entity(_) => ItemKind::Entity,
            ItemRef::Synthetic(_) => ItemKind::Synthetic,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, ItemRef::Entity(_))
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, ItemRef::Synthetic(_))
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Entity(id) => write!(f, "{}", id),
            ItemRef::Synthetic(id) => write!(f, "~{}", id),
        }
    }
}
