use crate::adapter::ContainerAdapter;
use crate::model::{BoardCell, KanbanConfig, Task};

/// Kanban board: one cell per status column, times swimlane when the board
/// has any.
///
/// Tasks whose status is not a declared column are not placed. On a board
/// with swimlanes, tasks without a known lane sit in the column's
/// lane-less cell, shown after the declared lanes.
#[derive(Debug, Clone)]
pub struct KanbanAdapter {
    columns: Vec<String>,
    swimlanes: Vec<String>,
}

impl KanbanAdapter {
    pub fn new<C, L>(columns: C, swimlanes: L) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        KanbanAdapter {
            columns: columns.into_iter().map(Into::into).collect(),
            swimlanes: swimlanes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &KanbanConfig) -> Self {
        KanbanAdapter::new(config.columns.clone(), config.swimlanes.clone())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn swimlanes(&self) -> &[String] {
        &self.swimlanes
    }

    fn has_column(&self, status: &str) -> bool {
        self.columns.iter().any(|c| c == status)
    }

    fn has_lane(&self, lane: &str) -> bool {
        self.swimlanes.iter().any(|l| l == lane)
    }
}

impl ContainerAdapter for KanbanAdapter {
    type Entity = Task;
    type Key = BoardCell;

    fn container_of(&self, task: &Task) -> Option<BoardCell> {
        if !self.has_column(&task.status) {
            return None;
        }
        let lane = task.swimlane.as_deref().filter(|lane| self.has_lane(lane));
        Some(BoardCell::new(task.status.clone(), lane))
    }

    fn assign(&self, task: &mut Task, cell: &BoardCell) {
        task.status = cell.status.clone();
        // A board without lanes leaves the task's lane alone
        if !self.swimlanes.is_empty() {
            task.swimlane = cell.swimlane.clone();
        }
    }

    fn declared_containers(&self) -> Vec<BoardCell> {
        let lanes: Vec<Option<&str>> = if self.swimlanes.is_empty() {
            vec![None]
        } else {
            self.swimlanes.iter().map(|l| Some(l.as_str())).chain([None]).collect()
        };
        lanes
            .iter()
            .flat_map(|lane| {
                self.columns
                    .iter()
                    .map(move |column| BoardCell::new(column.clone(), *lane))
            })
            .collect()
    }

    fn accepts(&self, cell: &BoardCell) -> bool {
        if !self.has_column(&cell.status) {
            return false;
        }
        match &cell.swimlane {
            Some(lane) => self.has_lane(lane),
            None => true,
        }
    }
}
