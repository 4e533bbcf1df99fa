use serde::{Deserialize, Serialize};

use crate::adapter::ContainerAdapter;
use crate::io::store::MemoryStore;
use crate::model::{EngineConfig, Entity, ItemRef};
use crate::ops::drag::Point;
use crate::ops::engine::OrderEngine;
use crate::ops::{NoopReason, Outcome};

/// One scripted interaction. Item references are bare ids; synthetic and
/// entity items share one id space.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "op",
    rename_all = "snake_case",
    bound(deserialize = "K: Deserialize<'de>")
)]
pub enum Step<K> {
    /// Pointer down on an item
    Press {
        item: String,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    Motion {
        x: f32,
        y: f32,
    },
    /// Pointer over a container zone and/or an item
    Hover {
        #[serde(default)]
        to: Option<K>,
        #[serde(default)]
        over: Option<String>,
    },
    Release,
    Cancel,
    /// Whole gesture: begin, hover, release
    Drag {
        item: String,
        #[serde(default)]
        to: Option<K>,
        #[serde(default)]
        before: Option<String>,
    },
    Reorder {
        item: String,
        within: K,
        #[serde(default)]
        before: Option<String>,
    },
    /// Insert a synthetic heading
    Heading {
        #[serde(default)]
        id: Option<String>,
        to: K,
        #[serde(default)]
        after: Option<String>,
    },
    DeleteHeading {
        id: String,
    },
    BeginEdit {
        item: String,
    },
    EndEdit,
    /// The collaborator applies every queued change request
    Confirm,
    /// The collaborator refuses the queued request for `item`
    Reject {
        item: String,
    },
    /// Another client changes an entity's container
    Move {
        item: String,
        to: K,
    },
    Remove {
        item: String,
    },
    Create {
        id: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        to: Option<K>,
    },
    Retitle {
        item: String,
        title: String,
    },
    /// Assert a container's order
    Expect {
        container: K,
        items: Vec<String>,
    },
}

impl<K> Step<K> {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Press { .. } => "press",
            Step::Motion { .. } => "motion",
            Step::Hover { .. } => "hover",
            Step::Release => "release",
            Step::Cancel => "cancel",
            Step::Drag { .. } => "drag",
            Step::Reorder { .. } => "reorder",
            Step::Heading { .. } => "heading",
            Step::DeleteHeading { .. } => "delete_heading",
            Step::BeginEdit { .. } => "begin_edit",
            Step::EndEdit => "end_edit",
            Step::Confirm => "confirm",
            Step::Reject { .. } => "reject",
            Step::Move { .. } => "move",
            Step::Remove { .. } => "remove",
            Step::Create { .. } => "create",
            Step::Retitle { .. } => "retitle",
            Step::Expect { .. } => "expect",
        }
    }
}

/// Result of one command step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub op: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// An `expect` step that did not hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationFailure {
    pub step: usize,
    pub container: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// An engine and its collaborator driven by a list of steps
pub struct Replay<A: ContainerAdapter> {
    engine: OrderEngine<A>,
    store: MemoryStore<A::Entity, A::Key>,
    log: Vec<StepRecord>,
    failures: Vec<ExpectationFailure>,
    steps_run: usize,
    checks_run: usize,
}

impl<A> Replay<A>
where
    A: ContainerAdapter,
    A::Entity: Clone,
{
    pub fn new(adapter: A, config: &EngineConfig, entities: Vec<A::Entity>) -> Self {
        let engine = OrderEngine::new(adapter, config, &entities);
        Replay {
            engine,
            store: MemoryStore::new(entities),
            log: Vec::new(),
            failures: Vec::new(),
            steps_run: 0,
            checks_run: 0,
        }
    }

    pub fn engine(&self) -> &OrderEngine<A> {
        &self.engine
    }

    pub fn store(&self) -> &MemoryStore<A::Entity, A::Key> {
        &self.store
    }

    pub fn log(&self) -> &[StepRecord] {
        &self.log
    }

    pub fn failures(&self) -> &[ExpectationFailure] {
        &self.failures
    }

    /// Number of `expect` steps evaluated so far
    pub fn checks_run(&self) -> usize {
        self.checks_run
    }

    pub fn run(&mut self, steps: &[Step<A::Key>]) {
        for step in steps {
            self.step(step);
        }
    }

    /// Run one step, recording its outcome.
    pub fn step(&mut self, step: &Step<A::Key>) {
        let index = self.steps_run;
        self.steps_run += 1;
        if let Step::Expect { container, items } = step {
            self.check(index, container, items);
            return;
        }
        let outcome = self.apply(step);
        tracing::debug!(step = index, op = step.name(), ?outcome, "replay step");
        self.log.push(StepRecord {
            step: index,
            op: step.name(),
            outcome,
        });
    }

    /// A new snapshot arrived from outside, e.g. the watched file changed.
    pub fn observe(&mut self, entities: Vec<A::Entity>) -> bool {
        self.store.replace(entities);
        self.publish()
    }

    fn publish(&mut self) -> bool {
        self.engine.observe_snapshot(self.store.entities())
    }

    fn resolve(&self, id: &str) -> ItemRef {
        self.engine
            .order_map()
            .resolve(id)
            .cloned()
            .unwrap_or_else(|| ItemRef::entity(id))
    }

    fn resolve_opt(&self, id: Option<&String>) -> Option<ItemRef> {
        id.map(|id| self.resolve(id))
    }

    fn apply(&mut self, step: &Step<A::Key>) -> Outcome {
        match step {
            Step::Press { item, x, y } => {
                let item = self.resolve(item);
                self.engine.press(&item, Point::new(*x, *y))
            }
            Step::Motion { x, y } => self.engine.motion(Point::new(*x, *y)),
            Step::Hover { to, over } => {
                let over = self.resolve_opt(over.as_ref());
                self.engine.update_hover(to.clone(), over.as_ref())
            }
            Step::Release => self.engine.release(&mut self.store),
            Step::Cancel => self.engine.cancel_drag(),
            Step::Drag { item, to, before } => {
                let item = self.resolve(item);
                let begun = self.engine.begin_drag(&item);
                if !begun.is_applied() {
                    return begun;
                }
                let before = self.resolve_opt(before.as_ref());
                let hover = self.engine.update_hover(to.clone(), before.as_ref());
                match self.engine.commit_drag(&mut self.store) {
                    Outcome::Noop(_) if !hover.is_applied() => hover,
                    outcome => outcome,
                }
            }
            Step::Reorder { item, within, before } => {
                let item = self.resolve(item);
                let before = self.resolve_opt(before.as_ref());
                self.engine
                    .reorder_within_container(within, &item, before.as_ref())
            }
            Step::Heading { id, to, after } => {
                let after = self.resolve_opt(after.as_ref());
                match id {
                    Some(id) => self
                        .engine
                        .insert_synthetic_item(to.clone(), id.clone(), after.as_ref()),
                    None => self
                        .engine
                        .create_synthetic_item(to.clone(), after.as_ref())
                        .map(|_| ())
                        .into(),
                }
            }
            Step::DeleteHeading { id } => self.engine.delete_synthetic_item(id),
            Step::BeginEdit { item } => {
                let item = self.resolve(item);
                self.engine.begin_edit(&item)
            }
            Step::EndEdit => self.engine.end_edit(),
            Step::Confirm => {
                let applied = self.store.confirm(self.engine.adapter());
                if applied.is_empty() {
                    return Outcome::Noop(NoopReason::NothingPending);
                }
                for change in &applied {
                    self.engine.acknowledge_change(&change.item_id, change.revision);
                }
                self.publish();
                Outcome::Applied
            }
            Step::Reject { item } => {
                self.store.reject(item);
                self.engine.reject_change(item)
            }
            Step::Move { item, to } => {
                if !self.store.assign(self.engine.adapter(), item, to) {
                    return Outcome::Noop(NoopReason::ItemNotFound);
                }
                self.publish();
                Outcome::Applied
            }
            Step::Remove { item } => {
                if !self.store.remove(item) {
                    return Outcome::Noop(NoopReason::ItemNotFound);
                }
                self.publish();
                Outcome::Applied
            }
            Step::Create { id, title, to } => {
                let title = title.as_deref().unwrap_or(id);
                if !self.store.create(self.engine.adapter(), id, title, to.as_ref()) {
                    return Outcome::Noop(NoopReason::DuplicateId);
                }
                self.publish();
                Outcome::Applied
            }
            Step::Retitle { item, title } => {
                if !self.store.retitle(item, title) {
                    return Outcome::Noop(NoopReason::ItemNotFound);
                }
                self.publish();
                Outcome::Applied
            }
            Step::Expect { .. } => Outcome::Applied,
        }
    }

    fn check(&mut self, index: usize, container: &A::Key, expected: &[String]) {
        self.checks_run += 1;
        let actual: Vec<String> = self
            .engine
            .ordered_items(container)
            .iter()
            .map(|item| item.id().to_string())
            .collect();
        if actual != expected {
            tracing::debug!(step = index, container = %container, "expectation failed");
            self.failures.push(ExpectationFailure {
                step: index,
                container: container.to_string(),
                expected: expected.to_vec(),
                actual,
            });
        }
    }
}

/// Title of an entity in the store, for rendering
pub fn title_of<'a, E: Entity + Clone, K: Clone>(store: &'a MemoryStore<E, K>, item: &ItemRef) -> Option<&'a str> {
    match item {
        ItemRef::Entity(id) => store.get(id).map(Entity::title),
        ItemRef::Synthetic(_) => None,
    }
}
