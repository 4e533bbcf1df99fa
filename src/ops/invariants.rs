use std::collections::{HashMap, HashSet};

use crate::model::{ContainerKey, ItemRef};
use crate::ops::order_map::OrderMap;
use crate::ops::reconcile::Membership;

/// A broken OrderMap invariant. These indicate a defect, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation<K: ContainerKey> {
    #[error("item {item} appears more than once (in {first} and {second})")]
    DuplicateItem { item: ItemRef, first: K, second: K },
    #[error("entity {item} belongs to {expected} but is not placed there")]
    MissingEntity { item: String, expected: K },
    #[error("entity {item} is placed in {found} but does not belong there")]
    MisplacedEntity { item: String, found: K },
}

impl<K: ContainerKey> InvariantViolation<K> {
    /// Containers that must be re-derived to repair this violation
    fn affected(&self) -> Vec<&K> {
        match self {
            InvariantViolation::DuplicateItem { first, second, .. } => vec![first, second],
            InvariantViolation::MissingEntity { expected, .. } => vec![expected],
            InvariantViolation::MisplacedEntity { found, .. } => vec![found],
        }
    }
}

/// No item appears in more than one place.
pub fn verify_unique<K: ContainerKey>(map: &OrderMap<K>) -> Vec<InvariantViolation<K>> {
    let mut seen: HashMap<&ItemRef, &K> = HashMap::new();
    let mut violations = Vec::new();
    for (key, items) in map.iter() {
        for item in items {
            if let Some(first) = seen.insert(item, key) {
                violations.push(InvariantViolation::DuplicateItem {
                    item: item.clone(),
                    first: first.clone(),
                    second: key.clone(),
                });
            }
        }
    }
    violations
}

/// Every entity sits exactly in the container the membership assigns it,
/// and nowhere else.
pub fn verify_membership<K: ContainerKey>(
    map: &OrderMap<K>,
    membership: &Membership<K>,
) -> Vec<InvariantViolation<K>> {
    let mut violations = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();
    for (key, items) in map.iter() {
        for item in items {
            if let ItemRef::Entity(id) = item {
                if membership.container_of(id) == Some(key) {
                    placed.insert(id.as_str());
                } else {
                    violations.push(InvariantViolation::MisplacedEntity {
                        item: id.clone(),
                        found: key.clone(),
                    });
                }
            }
        }
    }
    for key in membership.keys() {
        for id in membership.members(key) {
            if !placed.contains(id.as_str()) {
                violations.push(InvariantViolation::MissingEntity {
                    item: id.clone(),
                    expected: key.clone(),
                });
            }
        }
    }
    violations
}

/// Run every check that applies. `membership` is only consulted right
/// after reconciliation; an optimistic move legitimately disagrees with it.
pub fn verify<K: ContainerKey>(
    map: &OrderMap<K>,
    membership: Option<&Membership<K>>,
) -> Vec<InvariantViolation<K>> {
    let mut violations = verify_unique(map);
    if let Some(membership) = membership {
        violations.extend(verify_membership(map, membership));
    }
    violations
}

/// Repair the containers named by `violations` by re-deriving them from the
/// membership. Manual entity order in those containers is lost; synthetic
/// items keep their slots.
pub fn heal<K: ContainerKey>(
    map: &mut OrderMap<K>,
    membership: &Membership<K>,
    violations: &[InvariantViolation<K>],
) {
    let mut affected: Vec<K> = Vec::new();
    for violation in violations {
        tracing::warn!(%violation, "order invariant violated, re-deriving container");
        for key in violation.affected() {
            if !affected.contains(key) {
                affected.push(key.clone());
            }
        }
    }
    for key in &affected {
        rederive_container(map, key, membership);
    }
}

/// Rebuild one container: synthetic items stay at their indices (first
/// occurrence wins), entity slots are refilled with the container's members
/// in snapshot order.
pub fn rederive_container<K: ContainerKey>(
    map: &mut OrderMap<K>,
    key: &K,
    membership: &Membership<K>,
) {
    // Synthetic items already kept by an earlier container win.
    let synthetic_elsewhere: HashSet<ItemRef> = map
        .iter()
        .filter(|(k, _)| *k != key)
        .flat_map(|(_, items)| items.iter().filter(|i| i.is_synthetic()).cloned())
        .collect();

    let mut kept: HashSet<&ItemRef> = HashSet::new();
    let mut slots: Vec<(usize, ItemRef)> = Vec::new();
    for (idx, item) in map.items(key).iter().enumerate() {
        if item.is_synthetic() && !synthetic_elsewhere.contains(item) && kept.insert(item) {
            slots.push((idx, item.clone()));
        }
    }

    let mut entities = membership
        .members(key)
        .iter()
        .map(|id| ItemRef::Entity(id.clone()));
    let total = slots.len() + membership.members(key).len();
    let mut rebuilt = Vec::with_capacity(total);
    let mut slots = slots.into_iter().peekable();
    while rebuilt.len() < total {
        match slots.peek() {
            Some((idx, _)) if *idx <= rebuilt.len() => {
                if let Some((_, item)) = slots.next() {
                    rebuilt.push(item);
                }
            }
            _ => match entities.next() {
                Some(item) => rebuilt.push(item),
                None => rebuilt.extend(slots.by_ref().map(|(_, item)| item)),
            },
        }
    }

    // Members may still sit in their old container.
    for item in &rebuilt {
        while map.remove(item).is_some() {}
    }
    map.set_sequence(key.clone(), rebuilt);
}

/// Drop every repeated occurrence of an item, keeping the first one seen.
pub fn dedupe<K: ContainerKey>(map: &mut OrderMap<K>) {
    let mut seen: HashSet<ItemRef> = HashSet::new();
    let sequences: Vec<(K, Vec<ItemRef>)> = map
        .iter()
        .map(|(key, items)| {
            let kept = items
                .iter()
                .filter(|item| seen.insert((*item).clone()))
                .cloned()
                .collect();
            (key.clone(), kept)
        })
        .collect();
    for (key, items) in sequences {
        map.set_sequence(key, items);
    }
}
