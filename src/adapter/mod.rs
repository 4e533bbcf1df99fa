//! Per-surface specializations: what a container key is, and how an entity
//! maps into one.

pub mod calendar;
pub mod heading_list;
pub mod kanban;
pub mod sidebar;

pub use calendar::CalendarAdapter;
pub use heading_list::HeadingListAdapter;
pub use kanban::KanbanAdapter;
pub use sidebar::SidebarAdapter;

use crate::model::{ContainerKey, Entity};

/// Everything the engine needs to know about one presentation surface.
pub trait ContainerAdapter {
    type Entity: Entity;
    type Key: ContainerKey;

    /// The container an entity belongs to given its current fields, or
    /// `None` when this surface does not show it. Must be pure and
    /// deterministic.
    fn container_of(&self, entity: &Self::Entity) -> Option<Self::Key>;

    /// Set the container-determining field(s) so that `container_of`
    /// returns `key`. Used by the collaborator that owns the entities.
    fn assign(&self, entity: &mut Self::Entity, key: &Self::Key);

    /// Containers the surface always shows, even when empty, in display order.
    fn declared_containers(&self) -> Vec<Self::Key> {
        Vec::new()
    }

    /// Whether items may be dropped into `key`.
    fn accepts(&self, _key: &Self::Key) -> bool {
        true
    }
}
