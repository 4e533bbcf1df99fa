use serde::Serialize;

use crate::model::{ContainerKey, ItemRef};
use crate::ops::NoopReason;
use crate::ops::drag::DragSession;
use crate::ops::order_map::OrderMap;

/// Request to update an entity's container-determining field so the
/// authoritative collection agrees with an optimistic move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerChange<K> {
    pub item_id: String,
    pub container: K,
    /// Increases with every request the engine emits. A receiver may drop a
    /// request for an item once it has seen a higher revision for it.
    pub revision: u64,
}

/// Receives container-change requests. Fire-and-forget: the engine has
/// already moved the item when this is called.
pub trait ChangeSink<K> {
    fn request_container_change(&mut self, change: ContainerChange<K>);
}

impl<K> ChangeSink<K> for Vec<ContainerChange<K>> {
    fn request_container_change(&mut self, change: ContainerChange<K>) {
        self.push(change);
    }
}

/// What a committed drop did to the order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<K> {
    pub item: ItemRef,
    pub from: K,
    pub from_index: usize,
    pub to: K,
    pub to_index: usize,
}

impl<K: ContainerKey> Committed<K> {
    pub fn crossed_containers(&self) -> bool {
        self.from != self.to
    }

    /// The entity whose field must change, and its new container.
    /// Synthetic items and same-container reorders need none.
    pub fn field_change(&self) -> Option<(&str, &K)> {
        match &self.item {
            ItemRef::Entity(id) if self.crossed_containers() => Some((id.as_str(), &self.to)),
            _ => None,
        }
    }
}

/// Apply a committed drag to the order.
///
/// The item is taken from wherever it lives now (reconciliation may have
/// moved it mid-drag) and inserted before the hovered anchor, or appended
/// when there is none or the anchor has since disappeared from the target.
pub fn commit<K: ContainerKey>(
    session: &DragSession<K>,
    map: &mut OrderMap<K>,
) -> Result<Committed<K>, NoopReason> {
    let target = session.over.as_ref().ok_or(NoopReason::NoTarget)?;
    if target.anchor.as_ref() == Some(&session.item) {
        return Err(NoopReason::UnchangedPosition);
    }
    let (from, from_index) = map.remove(&session.item).ok_or(NoopReason::ItemNotFound)?;
    let anchor = target
        .anchor
        .as_ref()
        .filter(|anchor| map.items(&target.container).contains(*anchor));
    if target.anchor.is_some() && anchor.is_none() {
        tracing::debug!(
            item = %session.item,
            to = %target.container,
            "drop anchor no longer in target, appending"
        );
    }
    let to_index = map.insert_before(target.container.clone(), session.item.clone(), anchor);

    let committed = Committed {
        item: session.item.clone(),
        from,
        from_index,
        to: target.container.clone(),
        to_index,
    };
    if !committed.crossed_containers() && committed.from_index == committed.to_index {
        return Err(NoopReason::UnchangedPosition);
    }
    tracing::debug!(
        item = %committed.item,
        from = %committed.from,
        to = %committed.to,
        index = committed.to_index,
        "move committed"
    );
    Ok(committed)
}

/// Move `item` before `before` inside one container. `None` moves it to the end.
pub fn reorder_within<K: ContainerKey>(
    map: &mut OrderMap<K>,
    key: &K,
    item: &ItemRef,
    before: Option<&ItemRef>,
) -> Result<usize, NoopReason> {
    if before == Some(item) {
        return Err(NoopReason::UnchangedPosition);
    }
    let from_index = map
        .items(key)
        .iter()
        .position(|i| i == item)
        .ok_or(NoopReason::ItemNotFound)?;
    map.remove(item);
    let to_index = map.insert_before(key.clone(), item.clone(), before);
    if to_index == from_index {
        return Err(NoopReason::UnchangedPosition);
    }
    Ok(to_index)
}
