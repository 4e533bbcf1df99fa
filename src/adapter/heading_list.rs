use crate::adapter::ContainerAdapter;
use crate::model::{ItemRef, ListKey, Task};
use crate::ops::order_map::OrderMap;

/// Task lists with inline headings: the inbox, and one list per project.
///
/// Headings are synthetic items; the engine keeps them where the user put
/// them and every entity after a heading reads as grouped under it.
#[derive(Debug, Clone, Default)]
pub struct HeadingListAdapter {
    only: Option<ListKey>,
}

/// Entities of one list grouped under the heading that precedes them.
/// Entities before the first heading have `heading: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingGroup {
    pub heading: Option<ItemRef>,
    pub items: Vec<ItemRef>,
}

impl HeadingListAdapter {
    /// Every list at once: the inbox plus each project
    pub fn all() -> Self {
        HeadingListAdapter { only: None }
    }

    /// A single list; tasks of other lists are not shown
    pub fn for_list(key: ListKey) -> Self {
        HeadingListAdapter { only: Some(key) }
    }

    pub fn list_of(task: &Task) -> ListKey {
        match &task.project {
            Some(project) => ListKey::Project(project.clone()),
            None => ListKey::Inbox,
        }
    }
}

impl ContainerAdapter for HeadingListAdapter {
    type Entity = Task;
    type Key = ListKey;

    fn container_of(&self, task: &Task) -> Option<ListKey> {
        let key = HeadingListAdapter::list_of(task);
        match &self.only {
            Some(only) if *only != key => None,
            _ => Some(key),
        }
    }

    fn assign(&self, task: &mut Task, key: &ListKey) {
        task.project = match key {
            ListKey::Inbox => None,
            ListKey::Project(id) => Some(id.clone()),
        };
    }

    fn declared_containers(&self) -> Vec<ListKey> {
        match &self.only {
            Some(key) => vec![key.clone()],
            None => vec![ListKey::Inbox],
        }
    }

    fn accepts(&self, key: &ListKey) -> bool {
        self.only.as_ref().is_none_or(|only| only == key)
    }
}

/// Split one list into heading groups. Empty headings still get a group.
pub fn group_under_headings(map: &OrderMap<ListKey>, key: &ListKey) -> Vec<HeadingGroup> {
    let mut groups: Vec<HeadingGroup> = Vec::new();
    for item in map.items(key) {
        match item {
            ItemRef::Synthetic(_) => groups.push(HeadingGroup {
                heading: Some(item.clone()),
                items: Vec::new(),
            }),
            ItemRef::Entity(_) => match groups.last_mut() {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(HeadingGroup {
                    heading: None,
                    items: vec![item.clone()],
                }),
            },
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: &str) -> ItemRef {
        ItemRef::entity(id)
    }

    fn h(id: &str) -> ItemRef {
        ItemRef::synthetic(id)
    }

    #[test]
    fn places_by_project_or_inbox() {
        let all = HeadingListAdapter::all();
        assert_eq!(all.container_of(&Task::new("a", "A")), Some(ListKey::Inbox));
        assert_eq!(
            all.container_of(&Task::new("b", "B").in_project("p1")),
            Some(ListKey::Project("p1".into()))
        );
    }

    #[test]
    fn single_list_hides_other_tasks() {
        let list = HeadingListAdapter::for_list(ListKey::Project("p1".into()));
        assert_eq!(list.container_of(&Task::new("a", "A")), None);
        assert!(list.accepts(&ListKey::Project("p1".into())));
        assert!(!list.accepts(&ListKey::Inbox));
    }

    #[test]
    fn assign_inbox_clears_project() {
        let mut task = Task::new("a", "A").in_project("p1");
        HeadingListAdapter::all().assign(&mut task, &ListKey::Inbox);
        assert_eq!(task.project, None);
    }

    #[test]
    fn groups_follow_headings() {
        let key = ListKey::Project("p1".into());
        let map = OrderMap::from_sequences([(
            key.clone(),
            vec![e("a"), h("h1"), e("b"), e("c"), h("h2"), h("h3"), e("d")],
        )]);
        let groups = group_under_headings(&map, &key);
        assert_eq!(
            groups,
            vec![
                HeadingGroup { heading: None, items: vec![e("a")] },
                HeadingGroup { heading: Some(h("h1")), items: vec![e("b"), e("c")] },
                HeadingGroup { heading: Some(h("h2")), items: vec![] },
                HeadingGroup { heading: Some(h("h3")), items: vec![e("d")] },
            ]
        );
        assert!(group_under_headings(&map, &ListKey::Inbox).is_empty());
    }
}
