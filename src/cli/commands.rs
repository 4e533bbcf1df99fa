use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ordo", about = concat!("ordo v", env!("CARGO_PKG_VERSION"), " - display order that survives the data underneath it"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Engine config file (default: ./ordo.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted session and print the resulting order
    Replay(ScriptArgs),
    /// Run a script and verify its expect steps
    Check(ScriptArgs),
    /// Replay a script, then reconcile every time its snapshot file changes
    Watch(WatchArgs),
}

#[derive(Args)]
pub struct ScriptArgs {
    /// Script file (TOML)
    pub script: PathBuf,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Script file (TOML) naming a snapshot file
    pub script: PathBuf,

    /// Exit after this many snapshot reloads
    #[arg(long)]
    pub max_reloads: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ordo", "replay", "s.toml", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Replay(args) => assert_eq!(args.script, PathBuf::from("s.toml")),
            _ => panic!("expected replay"),
        }
    }

    #[test]
    fn watch_takes_reload_limit() {
        let cli = Cli::try_parse_from(["ordo", "--config", "o.toml", "watch", "s.toml", "--max-reloads", "3"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("o.toml")));
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.max_reloads, Some(3)),
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["ordo"]).is_err());
    }
}
