use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::{Area, EngineConfig, ListKey};
use crate::ops::replay::Step;

/// Which presentation surface a script drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Calendar,
    Kanban,
    Sidebar,
    HeadingList,
}

/// How many days a calendar script shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Span {
    #[default]
    Week,
    Month,
}

/// Calendar window: the week or month containing `date`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Window {
    pub date: NaiveDate,
    #[serde(default)]
    pub span: Span,
}

/// The surface-independent part of a replay script
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptHeader {
    pub surface: Surface,
    /// Overrides the config file when present
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// JSON snapshot file, relative to the script. Seeds the entities when
    /// the script lists none inline, and is what `watch` follows.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Calendar surfaces only
    #[serde(default)]
    pub window: Option<Window>,
    /// Sidebar surfaces only
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Heading-list surfaces only; all lists when absent
    #[serde(default)]
    pub list: Option<ListKey>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "E: Deserialize<'de>, K: Deserialize<'de>"))]
struct ScriptBody<E, K> {
    #[serde(default = "Vec::new")]
    entities: Vec<E>,
    #[serde(default = "Vec::new")]
    steps: Vec<Step<K>>,
}

/// A fully typed script for one surface
#[derive(Debug, Clone)]
pub struct Script<E, K> {
    pub header: ScriptHeader,
    pub entities: Vec<E>,
    pub steps: Vec<Step<K>>,
}

/// A script whose surface is known but whose body is not parsed yet
#[derive(Debug, Clone)]
pub struct ScriptSource {
    pub path: PathBuf,
    pub header: ScriptHeader,
    text: String,
}

/// Error type for script loading
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid script {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid snapshot {path}: {source}")]
    SnapshotError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("calendar script {0} needs a [window] table")]
    MissingWindow(PathBuf),
    #[error("script {0} names no snapshot file")]
    NoSnapshotFile(PathBuf),
}

impl ScriptSource {
    /// Read a script and parse its header.
    pub fn open(path: &Path) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let header: ScriptHeader = toml::from_str(&text).map_err(|e| ScriptError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ScriptSource {
            path: path.to_path_buf(),
            header,
            text,
        })
    }

    /// The snapshot file, resolved against the script's directory
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let snapshot = self.header.snapshot.as_ref()?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(snapshot))
    }

    pub fn window(&self) -> Result<&Window, ScriptError> {
        self.header
            .window
            .as_ref()
            .ok_or_else(|| ScriptError::MissingWindow(self.path.clone()))
    }

    /// Parse the body for a concrete entity and key type.
    pub fn parse<E, K>(&self) -> Result<Script<E, K>, ScriptError>
    where
        E: DeserializeOwned,
        K: DeserializeOwned,
    {
        let body: ScriptBody<E, K> =
            toml::from_str(&self.text).map_err(|e| ScriptError::ParseError {
                path: self.path.clone(),
                source: e,
            })?;
        let entities = match self.snapshot_path() {
            Some(path) if body.entities.is_empty() => read_snapshot(&path)?,
            _ => body.entities,
        };
        tracing::debug!(
            script = %self.path.display(),
            entities = entities.len(),
            steps = body.steps.len(),
            "script loaded"
        );
        Ok(Script {
            header: self.header.clone(),
            entities,
            steps: body.steps,
        })
    }
}

/// Read a JSON array of entities.
pub fn read_snapshot<E: DeserializeOwned>(path: &Path) -> Result<Vec<E>, ScriptError> {
    let text = fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ScriptError::SnapshotError {
        path: path.to_path_buf(),
        source: e,
    })
}
