use crate::adapter::ContainerAdapter;
use crate::model::Entity;
use crate::ops::move_ops::{ChangeSink, ContainerChange};

/// In-memory authoritative collection.
///
/// Plays the collaborator the engine talks to: change requests queue up
/// until [`MemoryStore::confirm`] applies them, and every mutation is
/// observable as a fresh snapshot.
#[derive(Debug, Clone)]
pub struct MemoryStore<E, K> {
    entities: Vec<E>,
    queued: Vec<ContainerChange<K>>,
    requested: Vec<ContainerChange<K>>,
}

impl<E: Entity + Clone, K: Clone> MemoryStore<E, K> {
    pub fn new(entities: Vec<E>) -> Self {
        MemoryStore {
            entities,
            queued: Vec::new(),
            requested: Vec::new(),
        }
    }

    /// Current snapshot
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Requests not yet confirmed or rejected
    pub fn queued(&self) -> &[ContainerChange<K>] {
        &self.queued
    }

    /// Every request ever received, in arrival order
    pub fn requested(&self) -> &[ContainerChange<K>] {
        &self.requested
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut E> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Apply every queued request in arrival order. Returns the applied
    /// requests; those for entities that no longer exist are dropped.
    pub fn confirm<A>(&mut self, adapter: &A) -> Vec<ContainerChange<K>>
    where
        A: ContainerAdapter<Entity = E, Key = K>,
    {
        let queued = std::mem::take(&mut self.queued);
        let mut applied = Vec::new();
        for change in queued {
            match self.get_mut(&change.item_id) {
                Some(entity) => {
                    adapter.assign(entity, &change.container);
                    applied.push(change);
                }
                None => {
                    tracing::debug!(item = %change.item_id, "change for missing entity dropped");
                }
            }
        }
        applied
    }

    /// Refuse every queued request for `id`. Returns whether any was queued.
    pub fn reject(&mut self, id: &str) -> bool {
        let before = self.queued.len();
        self.queued.retain(|change| change.item_id != id);
        self.queued.len() != before
    }

    /// Change an entity's container directly, as another client would.
    pub fn assign<A>(&mut self, adapter: &A, id: &str, key: &K) -> bool
    where
        A: ContainerAdapter<Entity = E, Key = K>,
    {
        match self.get_mut(id) {
            Some(entity) => {
                adapter.assign(entity, key);
                true
            }
            None => false,
        }
    }

    /// Add a new entity, optionally placed in `key`. Fails on a taken id.
    pub fn create<A>(&mut self, adapter: &A, id: &str, title: &str, key: Option<&K>) -> bool
    where
        A: ContainerAdapter<Entity = E, Key = K>,
    {
        if self.get(id).is_some() {
            return false;
        }
        let mut entity = E::blank(id.to_string(), title.to_string());
        if let Some(key) = key {
            adapter.assign(&mut entity, key);
        }
        self.entities.push(entity);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != id);
        self.entities.len() != before
    }

    pub fn retitle(&mut self, id: &str, title: &str) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.set_title(title.to_string());
                true
            }
            None => false,
        }
    }

    /// Swap in a whole new snapshot, e.g. one re-read from disk. Queued
    /// requests are kept.
    pub fn replace(&mut self, entities: Vec<E>) {
        self.entities = entities;
    }
}

impl<E, K: Clone> ChangeSink<K> for MemoryStore<E, K> {
    fn request_container_change(&mut self, change: ContainerChange<K>) {
        self.requested.push(change.clone());
        self.queued.push(change);
    }
}
