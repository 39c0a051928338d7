//! Command implementations.
//!
//! The oracle source selects the mode: a recorded trace runs the offline
//! comparator, a program runs a live Spike session.

mod live;
mod offline;

use std::path::Path;

use crate::cli::{Cli, EXIT_FAILURE};
use crate::terminal;

/// Dispatch to the mode selected by the oracle arguments.
pub fn run_command(cli: &Cli) -> i32 {
    match (&cli.oracle_trace, &cli.oracle_exe) {
        (Some(oracle_trace), None) => offline::cmd_offline(cli, oracle_trace),
        (None, Some(program)) => live::cmd_live(cli, program),
        _ => unreachable!("clap enforces exactly one oracle source"),
    }
}

/// Open a trace, reporting failures on the terminal.
fn open_or_report(path: &Path, role: &str) -> Result<Box<dyn std::io::BufRead>, i32> {
    rvdiff::open_trace(path).map_err(|err| {
        terminal::error(&format!("cannot open {role} trace {}: {err}", path.display()));
        EXIT_FAILURE
    })
}
