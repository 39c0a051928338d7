use std::path::Path;

use rvdiff::live::find_spike;
use rvdiff::{Error, FloatPolicy, LiveConfig, SpikeLaunch, Verbosity, run_live};
use rvdiff_trace::{TraceFormat, TraceReader};

use super::open_or_report;
use crate::cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Check the SUT trace against Spike running `program` in debug mode.
pub fn cmd_live(cli: &Cli, program: &Path) -> i32 {
    let Some(spike) = cli.spike.clone().or_else(find_spike) else {
        terminal::error("Spike not found in PATH");
        terminal::dim("Install from https://github.com/riscv-software-src/riscv-isa-sim");
        return EXIT_FAILURE;
    };

    let sut = match open_or_report(&cli.sut_trace, "SUT") {
        Ok(reader) => reader,
        Err(code) => return code,
    };
    let mut sut = TraceReader::new(sut, TraceFormat::Sut);

    let launch = SpikeLaunch {
        spike,
        isa: cli.isa.clone(),
        pk: (!cli.bare_metal).then(|| cli.pk.clone()),
        program: program.to_path_buf(),
    };
    let config = LiveConfig {
        core: cli.core,
        verbosity: Verbosity::from_count(cli.verbose),
        float_policy: cli
            .float_tolerance
            .map_or(FloatPolicy::Exact, FloatPolicy::Tolerance),
        ..LiveConfig::default()
    };

    if !cli.silent {
        terminal::info(&format!(
            "Running {} on {}",
            program.display(),
            launch.spike.display()
        ));
    }

    match run_live(&mut sut, &launch, config) {
        Ok(summary) => {
            terminal::success(&format!(
                "{} records checked, {} register values match",
                summary.records, summary.registers
            ));
            EXIT_SUCCESS
        }
        Err(Error::RegisterMismatch(mismatch)) => {
            terminal::error(&mismatch.to_string());
            println!("{}", mismatch.dumps());
            EXIT_FAILURE
        }
        Err(err @ Error::ProtocolEof { .. }) => {
            terminal::error(&format!("spike: {err}"));
            EXIT_FAILURE
        }
        Err(err) => {
            terminal::error(&err.to_string());
            EXIT_FAILURE
        }
    }
}
