use serde::Serialize;

use crate::adapter::ContainerAdapter;
use crate::model::{ItemKind, ItemRef};
use crate::ops::Outcome;
use crate::ops::move_ops::ContainerChange;
use crate::ops::replay::{ExpectationFailure, Replay, StepRecord, title_of};
use crate::util::unicode::{display_width, fit_to_width, truncate_to_width};

const MAX_ID_WIDTH: usize = 14;
const MAX_TITLE_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ItemJson {
    pub id: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerJson {
    pub container: String,
    pub items: Vec<ItemJson>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeJson {
    pub item: String,
    pub to: String,
    pub revision: u64,
}

/// Everything a replay prints
#[derive(Debug, Clone, Serialize)]
pub struct ReportJson {
    pub containers: Vec<ContainerJson>,
    pub requested: Vec<ChangeJson>,
    pub pending: Vec<ChangeJson>,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExpectationFailure>,
}

impl ReportJson {
    pub fn from_replay<A>(replay: &Replay<A>) -> Self
    where
        A: ContainerAdapter,
        A::Entity: Clone,
    {
        let engine = replay.engine();
        let containers = engine
            .containers()
            .iter()
            .map(|key| ContainerJson {
                container: key.to_string(),
                items: engine
                    .ordered_items(key)
                    .iter()
                    .map(|item| item_json(item, title_of(replay.store(), item)))
                    .collect(),
            })
            .collect();
        let change = |c: &ContainerChange<A::Key>| ChangeJson {
            item: c.item_id.clone(),
            to: c.container.to_string(),
            revision: c.revision,
        };
        ReportJson {
            containers,
            requested: replay.store().requested().iter().map(change).collect(),
            pending: engine.pending_changes().map(change).collect(),
            steps: replay.log().to_vec(),
            failures: replay.failures().to_vec(),
        }
    }
}

fn item_json(item: &ItemRef, title: Option<&str>) -> ItemJson {
    ItemJson {
        id: item.id().to_string(),
        kind: item.kind(),
        title: title.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Containers in display order, one item per line. Headings print as `~id`.
pub fn format_containers(containers: &[ContainerJson]) -> String {
    let id_width = containers
        .iter()
        .flat_map(|c| c.items.iter())
        .map(|item| display_width(&item_label(item)))
        .max()
        .unwrap_or(0)
        .min(MAX_ID_WIDTH);

    let mut lines = Vec::new();
    for container in containers {
        lines.push(container.container.clone());
        if container.items.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for (i, item) in container.items.iter().enumerate() {
            let label = fit_to_width(&item_label(item), id_width);
            let title = item
                .title
                .as_deref()
                .map(|t| truncate_to_width(t, MAX_TITLE_WIDTH))
                .unwrap_or_default();
            let line = format!("  {:>2}. {}  {}", i + 1, label, title);
            lines.push(line.trim_end().to_string());
        }
    }
    lines.join("\n")
}

fn item_label(item: &ItemJson) -> String {
    match item.kind {
        ItemKind::Entity => item.id.clone(),
        ItemKind::Synthetic => format!("~{}", item.id),
    }
}

pub fn format_changes(title: &str, changes: &[ChangeJson]) -> String {
    let mut lines = vec![format!("{}:", title)];
    if changes.is_empty() {
        lines.push("  (none)".to_string());
    }
    for change in changes {
        lines.push(format!("  {} -> {} (rev {})", change.item, change.to, change.revision));
    }
    lines.join("\n")
}

pub fn format_failures(failures: &[ExpectationFailure]) -> String {
    failures
        .iter()
        .map(|f| {
            format!(
                "step {}: {} expected [{}], got [{}]",
                f.step,
                f.container,
                f.expected.join(", "),
                f.actual.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ignored steps, which usually explain a surprising order
pub fn format_noops(steps: &[StepRecord]) -> String {
    steps
        .iter()
        .filter_map(|record| match record.outcome {
            Outcome::Noop(reason) => {
                Some(format!("step {} ({}): ignored, {}", record.step, record.op, reason))
            }
            Outcome::Applied => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_report(report: &ReportJson) -> String {
    let mut sections = vec![format_containers(&report.containers)];
    sections.push(format_changes("requested", &report.requested));
    if !report.pending.is_empty() {
        sections.push(format_changes("pending", &report.pending));
    }
    let noops = format_noops(&report.steps);
    if !noops.is_empty() {
        sections.push(noops);
    }
    sections.join("\n\n")
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
