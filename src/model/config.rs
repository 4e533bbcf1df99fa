use serde::{Deserialize, Serialize};

/// Engine configuration, read from `ordo.toml` or a replay script's `[config]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub drag: DragConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub kanban: KanbanConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Pointer travel (in pixels) before a press turns into a drag.
    /// Anything shorter is a click.
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        DragConfig {
            activation_distance: default_activation_distance(),
        }
    }
}

fn default_activation_distance() -> f32 {
    5.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Panic on an invariant violation instead of logging and re-deriving
    /// the container. Defaults to on in debug builds.
    #[serde(default = "default_strict")]
    pub strict_invariants: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            strict_invariants: default_strict(),
        }
    }
}

fn default_strict() -> bool {
    cfg!(debug_assertions)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub week_starts_on: WeekStart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanbanConfig {
    /// Status columns, left to right
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Swimlanes, top to bottom. Empty means the board has none.
    #[serde(default)]
    pub swimlanes: Vec<String>,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        KanbanConfig {
            columns: default_columns(),
            swimlanes: Vec::new(),
        }
    }
}

fn default_columns() -> Vec<String> {
    vec!["todo".into(), "doing".into(), "done".into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.drag.activation_distance, 5.0);
        assert_eq!(config.kanban.columns, vec!["todo", "doing", "done"]);
        assert_eq!(config.calendar.week_starts_on, WeekStart::Monday);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
[drag]
activation_distance = 8.0

[kanban]
swimlanes = ["ux", "backend"]

[calendar]
week_starts_on = "sunday"
"#,
        )
        .unwrap();
        assert_eq!(config.drag.activation_distance, 8.0);
        assert_eq!(config.kanban.columns, vec!["todo", "doing", "done"]);
        assert_eq!(config.kanban.swimlanes, vec!["ux", "backend"]);
        assert_eq!(config.calendar.week_starts_on, WeekStart::Sunday);
        assert_eq!(config.reconcile, ReconcileConfig::default());
    }

    #[test]
    fn strict_invariants_can_be_disabled() {
        let config: EngineConfig =
            toml::from_str("[reconcile]\nstrict_invariants = false\n").unwrap();
        assert!(!config.reconcile.strict_invariants);
    }
}
