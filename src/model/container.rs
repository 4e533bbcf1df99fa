use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Anything usable as a container key: comparable, hashable, printable.
///
/// Keys are always looked up from entity fields (or a synthetic item's last
/// placement), never derived from position.
pub trait ContainerKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> ContainerKey for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// A sidebar folder: an area, or the reserved bucket for projects without one
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKey {
    Unfiled,
    Area(String),
}

impl fmt::Display for FolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderKey::Unfiled => write!(f, "unfiled"),
            FolderKey::Area(id) => write!(f, "area:{}", id),
        }
    }
}

/// One kanban cell: a status column, optionally split by swimlane
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardCell {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swimlane: Option<String>,
}

impl BoardCell {
    pub fn new(status: impl Into<String>, swimlane: Option<&str>) -> Self {
        BoardCell {
            status: status.into(),
            swimlane: swimlane.map(str::to_string),
        }
    }

    /// A cell on a board without swimlanes
    pub fn column(status: impl Into<String>) -> Self {
        BoardCell::new(status, None)
    }
}

impl fmt::Display for BoardCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.swimlane {
            Some(lane) => write!(f, "{}/{}", self.status, lane),
            None => write!(f, "{}", self.status),
        }
    }
}

/// A task list that can carry inline headings: the inbox or one project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKey {
    Inbox,
    Project(String),
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKey::Inbox => write!(f, "inbox"),
            ListKey::Project(id) => write!(f, "project:{}", id),
        }
    }
}
