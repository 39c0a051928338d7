use std::path::Path;

use rvdiff::{CompareConfig, CompareStats, DoneReason, LockstepComparator, Step, Verdict};
use tracing::info;

use super::open_or_report;
use crate::cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Spinner};

/// Compare the SUT trace against a recorded Spike trace.
pub fn cmd_offline(cli: &Cli, oracle_trace: &Path) -> i32 {
    let sut = match open_or_report(&cli.sut_trace, "SUT") {
        Ok(reader) => reader,
        Err(code) => return code,
    };
    let oracle = match open_or_report(oracle_trace, "oracle") {
        Ok(reader) => reader,
        Err(code) => return code,
    };

    let config = CompareConfig {
        instruction_width: cli.instruction_width,
        max_steps: cli.max_steps,
    };
    let spinner = if cli.verbose == 0 && !cli.silent {
        Spinner::new("Comparing traces...")
    } else {
        Spinner::hidden()
    };

    let mut comparator = LockstepComparator::new(sut, oracle, config);
    let verdict = loop {
        match comparator.step() {
            Ok(Step::Synced { step, .. }) => spinner.set_step(step),
            Ok(Step::Finished(verdict)) => break verdict,
            Err(err) => {
                spinner.finish_with_failure(&format!("Comparison failed: {err}"));
                return EXIT_FAILURE;
            }
        }
    };
    let stats = comparator.stats();

    let code = exit_code(&verdict, cli.allow_divergence);
    match verdict {
        Verdict::Done(reason @ (DoneReason::EmptySut | DoneReason::NoOverlap)) => {
            spinner.finish_with_success("Nothing to compare");
            terminal::warning(&reason.to_string());
        }
        Verdict::Done(reason) => {
            spinner.finish_with_success(&format!("{} steps match ({reason})", stats.steps));
        }
        Verdict::Diverged(report) => {
            spinner.suspend(|| println!("{report}"));
            spinner.finish_with_failure(&format!("Traces diverge at step {}", report.step));
            if cli.allow_divergence {
                terminal::warning("Divergence allowed, exiting with success");
            }
        }
    }
    log_stats(&stats);
    code
}

/// Process exit code for a finished comparison.
const fn exit_code(verdict: &Verdict, allow_divergence: bool) -> i32 {
    match verdict {
        Verdict::Done(_) => EXIT_SUCCESS,
        Verdict::Diverged(_) if allow_divergence => EXIT_SUCCESS,
        Verdict::Diverged(_) => EXIT_FAILURE,
    }
}

fn log_stats(stats: &CompareStats) {
    info!(
        "sut: {} lines, {} records, {} stalls coalesced",
        stats.sut.lines, stats.sut.records, stats.sut_stalls
    );
    info!(
        "oracle: {} lines, {} records, {} traps resynchronized ({} handler records skipped)",
        stats.oracle.lines, stats.oracle.records, stats.oracle.traps, stats.oracle.resync_skipped
    );
}
