//! End-to-end scenarios across the four surfaces.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use ordo::adapter::heading_list::{HeadingGroup, group_under_headings};
use ordo::adapter::{CalendarAdapter, HeadingListAdapter, KanbanAdapter, SidebarAdapter};
use ordo::io::store::MemoryStore;
use ordo::model::{BoardCell, EngineConfig, FolderKey, ItemRef, ListKey, Project, Task, WeekStart};
use ordo::ops::engine::OrderEngine;
use ordo::ops::move_ops::ContainerChange;
use ordo::ops::{NoopReason, Outcome};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
}

fn e(id: &str) -> ItemRef {
    ItemRef::entity(id)
}

fn ids(items: &[ItemRef]) -> Vec<&str> {
    items.iter().map(ItemRef::id).collect()
}

fn config() -> EngineConfig {
    EngineConfig::default()
}

fn week() -> CalendarAdapter {
    CalendarAdapter::week_of(day(30), WeekStart::Monday)
}

fn calendar_tasks() -> Vec<Task> {
    vec![
        Task::new("a", "Write intro").scheduled_on(day(30)),
        Task::new("b", "Outline").scheduled_on(day(30)),
        Task::new("c", "Review").scheduled_on(day(30)),
    ]
}

#[test]
fn calendar_reorder_then_cross_day_move() {
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["a", "b", "c"]);

    // Drop `a` before `c` on the same day
    engine.begin_drag(&e("a"));
    engine.update_hover(Some(day(30)), Some(&e("c")));
    assert_eq!(engine.commit_drag(&mut store), Outcome::Applied);
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["b", "a", "c"]);
    assert!(store.requested().is_empty());

    // Rebuild the example's starting point, then move `b` into the empty next day
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    engine.begin_drag(&e("b"));
    engine.update_hover(Some(day(31)), None);
    assert_eq!(engine.commit_drag(&mut store), Outcome::Applied);
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["a", "c"]);
    assert_eq!(ids(engine.ordered_items(&day(31))), vec!["b"]);
    assert_eq!(
        store.requested(),
        &[ContainerChange {
            item_id: "b".into(),
            container: day(31),
            revision: 1,
        }]
    );

    // The collaborator applies the change; nothing moves
    let before = engine.order_map().clone();
    store.confirm(engine.adapter());
    assert!(!engine.observe_snapshot(store.entities()));
    assert_eq!(engine.order_map(), &before);
    assert_eq!(store.get("b").unwrap().scheduled, Some(day(31)));
}

#[test]
fn calendar_keeps_manual_order_through_unrelated_edits() {
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    engine.reorder_within_container(&day(30), &e("c"), Some(&e("a")));
    store.retitle("b", "Outline v2");
    store.create(engine.adapter(), "d", "New", Some(&day(30)));
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["c", "a", "b", "d"]);
}

#[test]
fn calendar_rejects_drops_outside_the_window() {
    let store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    engine.begin_drag(&e("a"));
    let next_week = week().days()[6].succ_opt().unwrap();
    assert_eq!(
        engine.update_hover(Some(next_week), None),
        Outcome::Noop(NoopReason::ContainerRejected)
    );
    assert!(!engine.is_dragging().unwrap().is_hovering());
}

#[test]
fn calendar_repeated_moves_before_confirmation() {
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());

    engine.begin_drag(&e("a"));
    engine.update_hover(Some(day(31)), None);
    engine.commit_drag(&mut store);
    engine.begin_drag(&e("a"));
    engine.update_hover(Some(day(29)), None);
    engine.commit_drag(&mut store);

    // An unrelated edit lands before either move is applied
    store.retitle("c", "Review again");
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&day(29))), vec!["a"]);

    // Both requests are applied in order; the later one wins
    store.confirm(engine.adapter());
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&day(29))), vec!["a"]);
    assert!(engine.ordered_items(&day(31)).is_empty());
    assert_eq!(engine.pending_changes().count(), 0);
    let revisions: Vec<u64> = store.requested().iter().map(|c| c.revision).collect();
    assert_eq!(revisions, vec![1, 2]);
}

#[test]
fn calendar_move_overtaken_by_another_client() {
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    engine.begin_drag(&e("b"));
    engine.update_hover(Some(day(31)), None);
    engine.commit_drag(&mut store);

    // The request lands and someone else reschedules `b` before we look
    let jan_2 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
    store.confirm(engine.adapter());
    store.assign(engine.adapter(), "b", &jan_2);
    for _ in 0..3 {
        engine.observe_snapshot(store.entities());
    }
    assert!(engine.ordered_items(&day(31)).is_empty());
    assert_eq!(ids(engine.ordered_items(&jan_2)), vec!["b"]);
    assert_eq!(engine.pending_changes().count(), 0);
}

#[test]
fn calendar_move_and_move_back_does_not_jump() {
    let mut store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut engine = OrderEngine::new(week(), &config(), store.entities());
    for to in [day(31), day(30)] {
        engine.begin_drag(&e("b"));
        engine.update_hover(Some(to), None);
        engine.commit_drag(&mut store);
    }
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["a", "c", "b"]);

    store.retitle("a", "Write intro v2");
    engine.observe_snapshot(store.entities());
    assert_eq!(engine.pending_changes().count(), 1);

    // Only the first request has been applied so far
    store.assign(engine.adapter(), "b", &day(31));
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["a", "c", "b"]);
    assert!(engine.ordered_items(&day(31)).is_empty());

    store.confirm(engine.adapter());
    assert!(!engine.observe_snapshot(store.entities()));
    assert_eq!(engine.pending_changes().count(), 0);
    assert_eq!(store.get("b").unwrap().scheduled, Some(day(30)));
}

#[test]
fn kanban_status_and_lane_change_is_one_move() {
    let board = KanbanAdapter::new(["todo", "doing", "done"], ["ux", "api"]);
    let tasks = vec![
        Task::new("a", "Login form").in_swimlane("ux"),
        Task::new("b", "Token refresh").with_status("doing").in_swimlane("api"),
        Task::new("c", "Rate limit").with_status("doing").in_swimlane("api"),
    ];
    let mut store = MemoryStore::new(tasks);
    let mut engine = OrderEngine::new(board, &config(), store.entities());
    let target = BoardCell::new("doing", Some("api"));

    engine.begin_drag(&e("a"));
    engine.update_hover(Some(target.clone()), Some(&e("c")));
    engine.commit_drag(&mut store);

    assert_eq!(ids(engine.ordered_items(&target)), vec!["b", "a", "c"]);
    assert_eq!(store.requested().len(), 1);
    assert_eq!(store.requested()[0].container, target);

    store.confirm(engine.adapter());
    assert!(!engine.observe_snapshot(store.entities()));
    let a = store.get("a").unwrap();
    assert_eq!((a.status.as_str(), a.swimlane.as_deref()), ("doing", Some("api")));
}

#[test]
fn kanban_task_leaving_the_board_disappears() {
    let board = KanbanAdapter::new(["todo", "done"], Vec::<String>::new());
    let mut store = MemoryStore::new(vec![Task::new("a", "A"), Task::new("b", "B")]);
    let mut engine = OrderEngine::new(board, &config(), store.entities());
    // Another client archives `a`: the board does not show that status
    let archived = BoardCell::column("archived");
    store.assign(engine.adapter(), "a", &archived);
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&BoardCell::column("todo"))), vec!["b"]);
    assert!(!engine.order_map().contains(&e("a")));
}

#[test]
fn sidebar_move_to_unfiled() {
    let sidebar = SidebarAdapter::new(["work", "home"]);
    let projects = vec![
        Project::new("p1", "Launch", Some("work")),
        Project::new("p2", "Garden", Some("home")),
        Project::new("p3", "Taxes", None),
    ];
    let mut store = MemoryStore::new(projects);
    let mut engine = OrderEngine::new(sidebar, &config(), store.entities());
    assert_eq!(
        engine.containers(),
        vec![
            FolderKey::Area("work".into()),
            FolderKey::Area("home".into()),
            FolderKey::Unfiled
        ]
    );

    engine.begin_drag(&e("p1"));
    engine.update_hover(None, Some(&e("p3")));
    engine.commit_drag(&mut store);
    assert_eq!(ids(engine.ordered_items(&FolderKey::Unfiled)), vec!["p1", "p3"]);
    assert!(engine.ordered_items(&FolderKey::Area("work".into())).is_empty());

    store.confirm(engine.adapter());
    assert!(!engine.observe_snapshot(store.entities()));
    assert_eq!(store.get("p1").unwrap().area, None);
}

#[test]
fn heading_list_groups_follow_drags() {
    let key = ListKey::Project("p1".into());
    let list = HeadingListAdapter::for_list(key.clone());
    let tasks = vec![
        Task::new("a", "Buy soil").in_project("p1"),
        Task::new("b", "Plant seeds").in_project("p1"),
        Task::new("c", "Water").in_project("p1"),
        Task::new("x", "Elsewhere"),
    ];
    let mut store = MemoryStore::new(tasks);
    let mut engine = OrderEngine::new(list, &config(), store.entities());
    assert!(engine.ordered_items(&ListKey::Inbox).is_empty());

    engine.insert_synthetic_item(key.clone(), "prep", None);
    engine.reorder_within_container(&key, &ItemRef::synthetic("prep"), Some(&e("a")));
    engine.insert_synthetic_item(key.clone(), "later", Some(&e("b")));
    assert_eq!(ids(engine.ordered_items(&key)), vec!["prep", "a", "b", "later", "c"]);

    // Move `a` under the second heading
    engine.begin_drag(&e("a"));
    engine.update_hover(Some(key.clone()), Some(&e("c")));
    engine.commit_drag(&mut store);

    assert_eq!(
        group_under_headings(engine.order_map(), &key),
        vec![
            HeadingGroup {
                heading: Some(ItemRef::synthetic("prep")),
                items: vec![e("b")],
            },
            HeadingGroup {
                heading: Some(ItemRef::synthetic("later")),
                items: vec![e("a"), e("c")],
            },
        ]
    );

    // Deleting a task leaves both headings in place
    store.remove("b");
    engine.observe_snapshot(store.entities());
    assert_eq!(ids(engine.ordered_items(&key)), vec!["prep", "later", "a", "c"]);
    assert!(store.requested().is_empty());
}

#[test]
fn click_below_threshold_never_moves() {
    use ordo::ops::drag::Point;
    let store: MemoryStore<Task, NaiveDate> = MemoryStore::new(calendar_tasks());
    let mut config = config();
    config.drag.activation_distance = 10.0;
    let mut engine = OrderEngine::new(week(), &config, store.entities());
    let mut sink = Vec::new();

    engine.press(&e("a"), Point::new(100.0, 100.0));
    engine.motion(Point::new(104.0, 105.0));
    engine.update_hover(Some(day(31)), None);
    assert_eq!(engine.release(&mut sink), Outcome::Noop(NoopReason::ThresholdNotReached));
    assert_eq!(ids(engine.ordered_items(&day(30))), vec!["a", "b", "c"]);
    assert!(sink.is_empty());
}
