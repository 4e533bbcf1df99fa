use clap::Parser;
use ordo::cli::commands::Cli;
use ordo::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `ORDO_LOG=ordo=trace`
const LOG_ENV: &str = "ORDO_LOG";

fn configure_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "ordo=debug",
        _ => "ordo=trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
