use indexmap::IndexMap;

use crate::model::{ContainerKey, ItemRef};

/// Display order for every container of one view.
///
/// Maps a container key to the ordered items it holds. An empty sequence is
/// never stored: removing the last item drops the container, and looking up
/// an unknown container yields an empty slice. Equality compares containers
/// as a map, independent of the order containers were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMap<K: ContainerKey> {
    containers: IndexMap<K, Vec<ItemRef>>,
}

impl<K: ContainerKey> Default for OrderMap<K> {
    fn default() -> Self {
        OrderMap {
            containers: IndexMap::new(),
        }
    }
}

impl<K: ContainerKey> OrderMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit sequences. Empty sequences are skipped; a key
    /// given twice keeps the last sequence.
    pub fn from_sequences<I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<ItemRef>)>,
    {
        let mut map = OrderMap::new();
        for (key, items) in sequences {
            map.set_sequence(key, items);
        }
        map
    }

    /// Items of a container in display order
    pub fn items(&self, key: &K) -> &[ItemRef] {
        self.containers.get(key).map_or(&[], Vec::as_slice)
    }

    /// Containers holding at least one item, in first-seen order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.containers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[ItemRef])> {
        self.containers.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of non-empty containers
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Total number of items across all containers
    pub fn item_count(&self) -> usize {
        self.containers.values().map(Vec::len).sum()
    }

    /// Find the container and index holding `item`.
    pub fn locate(&self, item: &ItemRef) -> Option<(&K, usize)> {
        self.containers
            .iter()
            .find_map(|(key, seq)| seq.iter().position(|i| i == item).map(|idx| (key, idx)))
    }

    pub fn contains(&self, item: &ItemRef) -> bool {
        self.locate(item).is_some()
    }

    /// Look up an item reference by its bare id, of either kind.
    pub fn resolve(&self, id: &str) -> Option<&ItemRef> {
        self.containers
            .values()
            .flat_map(|seq| seq.iter())
            .find(|item| item.id() == id)
    }

    /// Remove `item` wherever it is. Returns where it was.
    pub fn remove(&mut self, item: &ItemRef) -> Option<(K, usize)> {
        let (key, idx) = {
            let (key, idx) = self.locate(item)?;
            (key.clone(), idx)
        };
        self.remove_at(&key, idx);
        Some((key, idx))
    }

    /// Insert `item` immediately before `anchor` in `key`'s sequence.
    /// A missing `anchor` (or one that is not in this container) appends.
    /// Returns the index the item landed at.
    pub fn insert_before(&mut self, key: K, item: ItemRef, anchor: Option<&ItemRef>) -> usize {
        let seq = self.containers.entry(key).or_default();
        let idx = anchor
            .and_then(|a| seq.iter().position(|i| i == a))
            .unwrap_or(seq.len());
        seq.insert(idx, item);
        idx
    }

    /// Insert `item` immediately after `anchor`, or append when the anchor
    /// is absent from this container.
    pub fn insert_after(&mut self, key: K, item: ItemRef, anchor: Option<&ItemRef>) -> usize {
        let seq = self.containers.entry(key).or_default();
        let idx = anchor
            .and_then(|a| seq.iter().position(|i| i == a))
            .map_or(seq.len(), |i| i + 1);
        seq.insert(idx, item);
        idx
    }

    /// Insert at an index, clamped to the sequence length.
    pub fn insert_at(&mut self, key: K, index: usize, item: ItemRef) -> usize {
        let seq = self.containers.entry(key).or_default();
        let idx = index.min(seq.len());
        seq.insert(idx, item);
        idx
    }

    /// Replace a container's whole sequence. An empty sequence drops the container.
    pub(crate) fn set_sequence(&mut self, key: K, items: Vec<ItemRef>) {
        if items.is_empty() {
            self.containers.shift_remove(&key);
        } else {
            self.containers.insert(key, items);
        }
    }

    fn remove_at(&mut self, key: &K, idx: usize) {
        if let Some(seq) = self.containers.get_mut(key) {
            seq.remove(idx);
            if seq.is_empty() {
                self.containers.shift_remove(key);
            }
        }
    }
}
