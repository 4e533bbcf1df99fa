use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the authoritative collection, as seen by the ordering engine
pub trait Entity {
    /// Stable id, unique within one snapshot
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn set_title(&mut self, title: String);
    /// A fresh row with no container-determining fields set
    fn blank(id: String, title: String) -> Self
    where
        Self: Sized;
}

/// Top-level grouping shown as a sidebar folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// A project, optionally filed under an area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Area id; `None` means unfiled
    #[serde(default)]
    pub area: Option<String>,
}

/// A task with every field any surface uses to place it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Kanban column id
    #[serde(default = "default_status")]
    pub status: String,
    /// Kanban swimlane id
    #[serde(default)]
    pub swimlane: Option<String>,
    /// Calendar day
    #[serde(default)]
    pub scheduled: Option<NaiveDate>,
    /// Owning project; `None` means the inbox
    #[serde(default)]
    pub project: Option<String>,
}

fn default_status() -> String {
    "todo".to_string()
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            status: default_status(),
            swimlane: None,
            scheduled: None,
            project: None,
        }
    }

    pub fn scheduled_on(mut self, day: NaiveDate) -> Self {
        self.scheduled = Some(day);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn in_swimlane(mut self, lane: impl Into<String>) -> Self {
        self.swimlane = Some(lane.into());
        self
    }

    pub fn in_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>, area: Option<&str>) -> Self {
        Project {
            id: id.into(),
            title: title.into(),
            area: area.map(str::to_string),
        }
    }
}

impl Entity for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn blank(id: String, title: String) -> Self {
        Task::new(id, title)
    }
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn blank(id: String, title: String) -> Self {
        Project::new(id, title, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_from_minimal_toml() {
        let task: Task = toml::from_str(r#"id = "a""#).unwrap();
        assert_eq!(task.status, "todo");
        assert!(task.scheduled.is_none());
        assert!(task.project.is_none());
        assert_eq!(task.title, "");
    }

    #[test]
    fn task_scheduled_parses_date_string() {
        let task: Task = toml::from_str(
            r#"
id = "a"
title = "Write intro"
scheduled = "2025-12-30"
"#,
        )
        .unwrap();
        assert_eq!(task.scheduled, NaiveDate::from_ymd_opt(2025, 12, 30));
    }

    #[test]
    fn builders_set_container_fields() {
        let task = Task::new("a", "Alpha")
            .with_status("doing")
            .in_swimlane("ux")
            .in_project("p1");
        assert_eq!(task.status, "doing");
        assert_eq!(task.swimlane.as_deref(), Some("ux"));
        assert_eq!(task.project.as_deref(), Some("p1"));
    }
}
