//! rvdiff CLI - differential trace verifier

mod cli;
mod commands;
mod terminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.silent {
        "rvdiff=warn,rvdiff_trace=warn"
    } else if cli.verbose > 0 {
        "rvdiff=debug,rvdiff_trace=debug"
    } else {
        "rvdiff=info,rvdiff_trace=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = commands::run_command(&cli);
    std::process::exit(exit_code);
}
