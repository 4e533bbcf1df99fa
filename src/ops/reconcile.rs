use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::model::{ContainerKey, Entity, ItemRef};
use crate::ops::order_map::OrderMap;

/// Where every entity of one snapshot belongs.
///
/// Members of each container are kept in snapshot order, which is the order
/// newly arrived items get appended in.
#[derive(Debug, Clone)]
pub struct Membership<K: ContainerKey> {
    by_container: IndexMap<K, Vec<String>>,
    placement: HashMap<String, K>,
}

impl<K: ContainerKey> Default for Membership<K> {
    fn default() -> Self {
        Membership {
            by_container: IndexMap::new(),
            placement: HashMap::new(),
        }
    }
}

impl<K: ContainerKey> Membership<K> {
    /// Build from `(entity id, container)` pairs in snapshot order.
    /// Entities with no container are not shown on the surface. A repeated
    /// id keeps its first placement.
    pub fn from_placements<I>(placements: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<K>)>,
    {
        let mut membership = Membership::default();
        let mut seen = HashSet::new();
        for (id, key) in placements {
            if !seen.insert(id.clone()) {
                tracing::warn!(item = %id, "duplicate entity id in snapshot, keeping first");
                continue;
            }
            if let Some(key) = key {
                membership
                    .by_container
                    .entry(key.clone())
                    .or_default()
                    .push(id.clone());
                membership.placement.insert(id, key);
            }
        }
        membership
    }

    pub fn from_snapshot<E, F>(snapshot: &[E], container_key_of: F) -> Self
    where
        E: Entity,
        F: Fn(&E) -> Option<K>,
    {
        Self::from_placements(
            snapshot
                .iter()
                .map(|entity| (entity.id().to_string(), container_key_of(entity))),
        )
    }

    /// The container an entity currently belongs to
    pub fn container_of(&self, id: &str) -> Option<&K> {
        self.placement.get(id)
    }

    pub fn members(&self, key: &K) -> &[String] {
        self.by_container.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_container.keys()
    }

    pub fn len(&self) -> usize {
        self.placement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placement.is_empty()
    }

    fn belongs(&self, id: &str, key: &K) -> bool {
        self.placement.get(id) == Some(key)
    }
}

/// Bring `prev` back into agreement with a fresh snapshot.
///
/// Returns `None` when nothing changed.
pub fn reconcile<E, K, F>(prev: &OrderMap<K>, snapshot: &[E], container_key_of: F) -> Option<OrderMap<K>>
where
    E: Entity,
    K: ContainerKey,
    F: Fn(&E) -> Option<K>,
{
    reconcile_membership(prev, &Membership::from_snapshot(snapshot, container_key_of))
}

/// Reconcile against an already computed membership.
///
/// Per container: survivors keep their relative order, synthetic items are
/// kept verbatim, entities that left are dropped, and entities that arrived
/// are appended in snapshot order. An entity that changed containers leaves
/// its old sequence and joins the new one in the same pass.
pub fn reconcile_membership<K: ContainerKey>(
    prev: &OrderMap<K>,
    membership: &Membership<K>,
) -> Option<OrderMap<K>> {
    let mut keys: Vec<&K> = prev.keys().collect();
    for key in membership.keys() {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut next = OrderMap::new();
    let mut dropped = 0usize;
    let mut appended = 0usize;
    for key in keys {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut seq = Vec::with_capacity(prev.items(key).len());
        for item in prev.items(key) {
            match item {
                ItemRef::Synthetic(_) => seq.push(item.clone()),
                ItemRef::Entity(id) => {
                    if membership.belongs(id, key) && placed.insert(id.as_str()) {
                        seq.push(item.clone());
                    } else {
                        dropped += 1;
                    }
                }
            }
        }
        for id in membership.members(key) {
            if !placed.contains(id.as_str()) {
                seq.push(ItemRef::Entity(id.clone()));
                appended += 1;
            }
        }
        next.set_sequence(key.clone(), seq);
    }

    if next == *prev {
        tracing::trace!(containers = prev.len(), "reconcile: no change");
        None
    } else {
        tracing::debug!(
            containers = next.len(),
            items = next.item_count(),
            dropped,
            appended,
            "reconcile: order updated"
        );
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn e(id: &str) -> ItemRef {
        ItemRef::entity(id)
    }

    fn h(id: &str) -> ItemRef {
        ItemRef::synthetic(id)
    }

    fn ids(items: &[ItemRef]) -> Vec<&str> {
        items.iter().map(ItemRef::id).collect()
    }

    /// Container is the task's status column
    fn by_status(task: &Task) -> Option<String> {
        Some(task.status.clone())
    }

    fn task(id: &str, status: &str) -> Task {
        Task::new(id, id).with_status(status)
    }

    #[test]
    fn seeds_from_empty_map_in_snapshot_order() {
        let snapshot = vec![task("a", "todo"), task("b", "doing"), task("c", "todo")];
        let map = reconcile(&OrderMap::new(), &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["a", "c"]);
        assert_eq!(ids(map.items(&"doing".into())), vec!["b"]);
    }

    #[test]
    fn manual_order_survives_unrelated_edit() {
        let prev = OrderMap::from_sequences([("todo".to_string(), vec![e("c"), e("a"), e("b")])]);
        let mut snapshot = vec![task("a", "todo"), task("b", "todo"), task("c", "todo")];
        snapshot[1].title = "renamed".into();
        assert_eq!(reconcile(&prev, &snapshot, by_status), None);
    }

    #[test]
    fn new_items_append_at_end() {
        let prev = OrderMap::from_sequences([("todo".to_string(), vec![e("b"), e("a")])]);
        let snapshot = vec![
            task("x", "todo"),
            task("a", "todo"),
            task("b", "todo"),
            task("y", "todo"),
        ];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["b", "a", "x", "y"]);
    }

    #[test]
    fn deleted_items_disappear() {
        let prev = OrderMap::from_sequences([("todo".to_string(), vec![e("b"), e("a"), e("c")])]);
        let snapshot = vec![task("a", "todo"), task("c", "todo")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["a", "c"]);
    }

    #[test]
    fn moved_item_leaves_old_container_in_same_pass() {
        let prev = OrderMap::from_sequences([
            ("todo".to_string(), vec![e("a"), e("b")]),
            ("doing".to_string(), vec![e("c")]),
        ]);
        let snapshot = vec![task("a", "doing"), task("b", "todo"), task("c", "doing")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["b"]);
        assert_eq!(ids(map.items(&"doing".into())), vec!["c", "a"]);
    }

    #[test]
    fn emptied_container_is_dropped() {
        let prev = OrderMap::from_sequences([
            ("todo".to_string(), vec![e("a")]),
            ("doing".to_string(), vec![e("b")]),
        ]);
        let snapshot = vec![task("a", "doing"), task("b", "doing")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(ids(map.items(&"doing".into())), vec!["b", "a"]);
    }

    #[test]
    fn synthetic_items_are_kept_verbatim() {
        let prev = OrderMap::from_sequences([(
            "todo".to_string(),
            vec![h("h1"), e("a"), h("h2"), e("b")],
        )]);
        // `a` is deleted, `z` arrives; neither heading moves
        let snapshot = vec![task("b", "todo"), task("z", "todo")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["h1", "h2", "b", "z"]);
    }

    #[test]
    fn container_with_only_synthetic_items_is_kept() {
        let prev = OrderMap::from_sequences([("done".to_string(), vec![h("h1"), e("a")])]);
        let snapshot = vec![task("a", "todo")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"done".into())), vec!["h1"]);
        assert_eq!(ids(map.items(&"todo".into())), vec!["a"]);
    }

    #[test]
    fn duplicate_entity_in_previous_sequence_is_healed() {
        let prev = OrderMap::from_sequences([("todo".to_string(), vec![e("a"), e("b"), e("a")])]);
        let snapshot = vec![task("a", "todo"), task("b", "todo")];
        let map = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(ids(map.items(&"todo".into())), vec!["a", "b"]);
    }

    #[test]
    fn unplaced_entities_are_not_shown() {
        let snapshot = vec![task("a", "todo"), task("b", "archived")];
        let map = reconcile(&OrderMap::new(), &snapshot, |t: &Task| {
            (t.status != "archived").then(|| t.status.clone())
        })
        .unwrap();
        assert_eq!(map.item_count(), 1);
    }

    #[test]
    fn second_pass_is_noop() {
        let prev = OrderMap::from_sequences([("todo".to_string(), vec![e("b"), e("gone")])]);
        let snapshot = vec![task("a", "todo"), task("b", "todo"), task("c", "doing")];
        let once = reconcile(&prev, &snapshot, by_status).unwrap();
        assert_eq!(reconcile(&once, &snapshot, by_status), None);
    }

    #[test]
    fn membership_keeps_first_of_duplicate_ids() {
        let membership = Membership::from_placements([
            ("a".to_string(), Some("todo".to_string())),
            ("a".to_string(), Some("doing".to_string())),
        ]);
        assert_eq!(membership.container_of("a"), Some(&"todo".to_string()));
        assert!(membership.members(&"doing".to_string()).is_empty());
        assert_eq!(membership.len(), 1);
    }
}
