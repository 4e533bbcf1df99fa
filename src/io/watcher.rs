use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// The snapshot file was written, replaced or removed.
    Changed(PathBuf),
}

/// Watches one snapshot file for changes.
///
/// The parent directory is watched rather than the file itself so editors
/// that save by rename are still seen.
pub struct SnapshotWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<SnapshotEvent>,
}

impl SnapshotWatcher {
    pub fn start(snapshot: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir = match snapshot.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = snapshot.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                let hit = event
                    .paths
                    .into_iter()
                    .find(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if let Some(path) = hit {
                    let _ = tx.send(SnapshotEvent::Changed(path));
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching snapshot");
        Ok(SnapshotWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events. Returns all queued events.
    pub fn poll(&self) -> Vec<SnapshotEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block until at least one event arrives or `timeout` passes, then
    /// drain the rest. Editors often emit several events per save.
    pub fn wait(&self, timeout: Duration) -> Vec<SnapshotEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll());
                events
            }
            Err(_) => Vec::new(),
        }
    }
}
