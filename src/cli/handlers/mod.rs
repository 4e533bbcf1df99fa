use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::adapter::{
    CalendarAdapter, ContainerAdapter, HeadingListAdapter, KanbanAdapter, SidebarAdapter,
};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::script::{self, Script, ScriptError, ScriptSource, Span, Surface};
use crate::io::watcher::SnapshotWatcher;
use crate::model::EngineConfig;
use crate::ops::replay::Replay;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

const WATCH_POLL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Replay(args) => with_session(&args.script, config, ReplayCmd { json }),
        Commands::Check(args) => with_session(&args.script, config, CheckCmd { json }),
        Commands::Watch(args) => with_session(
            &args.script,
            config,
            WatchCmd {
                json,
                max_reloads: args.max_reloads,
            },
        ),
    }
}

/// Something to do with a replayed session, whatever its surface
trait SessionCmd {
    fn run<A>(self, replay: Replay<A>, source: &ScriptSource) -> CmdResult
    where
        A: ContainerAdapter,
        A::Entity: Clone + DeserializeOwned;
}

/// Open a script, build the adapter its surface needs, and replay its steps.
fn with_session(path: &Path, config_path: Option<&Path>, cmd: impl SessionCmd) -> CmdResult {
    let source = ScriptSource::open(path)?;
    let config = match &source.header.config {
        Some(config) => config.clone(),
        None => config_io::load_config(config_path, &std::env::current_dir()?)?,
    };

    match source.header.surface {
        Surface::Calendar => {
            let window = source.window()?;
            let adapter = match window.span {
                Span::Week => CalendarAdapter::week_of(window.date, config.calendar.week_starts_on),
                Span::Month => CalendarAdapter::month_of(window.date),
            };
            start(adapter, &config, &source, cmd)
        }
        Surface::Kanban => start(KanbanAdapter::from_config(&config.kanban), &config, &source, cmd),
        Surface::Sidebar => start(
            SidebarAdapter::from_areas(&source.header.areas),
            &config,
            &source,
            cmd,
        ),
        Surface::HeadingList => {
            let adapter = match &source.header.list {
                Some(key) => HeadingListAdapter::for_list(key.clone()),
                None => HeadingListAdapter::all(),
            };
            start(adapter, &config, &source, cmd)
        }
    }
}

fn start<A>(adapter: A, config: &EngineConfig, source: &ScriptSource, cmd: impl SessionCmd) -> CmdResult
where
    A: ContainerAdapter,
    A::Entity: Clone + DeserializeOwned,
    A::Key: DeserializeOwned,
{
    let script: Script<A::Entity, A::Key> = source.parse()?;
    let mut replay = Replay::new(adapter, config, script.entities);
    replay.run(&script.steps);
    cmd.run(replay, source)
}

fn print_report(report: &ReportJson, json: bool) -> CmdResult {
    if json {
        println!("{}", to_json(report)?);
    } else {
        println!("{}", format_report(report));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

struct ReplayCmd {
    json: bool,
}

impl SessionCmd for ReplayCmd {
    fn run<A>(self, replay: Replay<A>, _source: &ScriptSource) -> CmdResult
    where
        A: ContainerAdapter,
        A::Entity: Clone + DeserializeOwned,
    {
        print_report(&ReportJson::from_replay(&replay), self.json)
    }
}

struct CheckCmd {
    json: bool,
}

impl SessionCmd for CheckCmd {
    fn run<A>(self, replay: Replay<A>, _source: &ScriptSource) -> CmdResult
    where
        A: ContainerAdapter,
        A::Entity: Clone + DeserializeOwned,
    {
        let failures = replay.failures();
        if self.json {
            print_report(&ReportJson::from_replay(&replay), true)?;
        } else if failures.is_empty() {
            println!("ok: {} expectations held", replay.checks_run());
        } else {
            println!("{}", format_failures(failures));
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "{} of {} expectations failed",
                failures.len(),
                replay.checks_run()
            )
            .into())
        }
    }
}

struct WatchCmd {
    json: bool,
    max_reloads: Option<usize>,
}

impl SessionCmd for WatchCmd {
    fn run<A>(self, mut replay: Replay<A>, source: &ScriptSource) -> CmdResult
    where
        A: ContainerAdapter,
        A::Entity: Clone + DeserializeOwned,
    {
        let path = source
            .snapshot_path()
            .ok_or_else(|| ScriptError::NoSnapshotFile(source.path.clone()))?;
        print_report(&ReportJson::from_replay(&replay), self.json)?;

        let watcher = SnapshotWatcher::start(&path)?;
        let mut reloads = 0;
        while self.max_reloads.is_none_or(|max| reloads < max) {
            if watcher.wait(WATCH_POLL).is_empty() {
                continue;
            }
            match script::read_snapshot::<A::Entity>(&path) {
                Ok(entities) => {
                    reloads += 1;
                    if replay.observe(entities) {
                        if !self.json {
                            println!();
                        }
                        print_report(&ReportJson::from_replay(&replay), self.json)?;
                    } else {
                        tracing::debug!(snapshot = %path.display(), "snapshot changed, order unchanged");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "snapshot unreadable, keeping current order"),
            }
        }
        Ok(())
    }
}
