//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "rvdiff")]
#[command(about = "Differential trace verifier - compares a RISC-V simulator trace against Spike")]
#[command(version)]
#[command(group(ArgGroup::new("oracle").required(true).args(["oracle_trace", "oracle_exe"])))]
pub struct Cli {
    /// SUT instruction trace ('-' for stdin, '.zst' is decompressed)
    #[arg(value_name = "SUT_TRACE")]
    pub sut_trace: PathBuf,

    /// Recorded Spike trace (spike -l)
    #[arg(short = 't', long, value_name = "FILE")]
    pub oracle_trace: Option<PathBuf>,

    /// Program to run under Spike in debug mode
    #[arg(short = 'e', long, value_name = "PROGRAM")]
    pub oracle_exe: Option<PathBuf>,

    /// Spike executable (default: spike found in PATH)
    #[arg(long, value_name = "PATH")]
    pub spike: Option<PathBuf>,

    /// ISA string passed to Spike (e.g., rv64gc)
    #[arg(long)]
    pub isa: Option<String>,

    /// Proxy kernel run by Spike
    #[arg(long, default_value = "pk", conflicts_with = "bare_metal")]
    pub pk: PathBuf,

    /// Run the program on Spike without a proxy kernel
    #[arg(long)]
    pub bare_metal: bool,

    /// Hart addressed by Spike debug commands
    #[arg(long, default_value = "0")]
    pub core: u32,

    /// Instruction width used to find where execution resumes after a trap
    #[arg(long, default_value = "4")]
    pub instruction_width: u64,

    /// Stop after this many logical steps
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Accept floating-point values within this relative tolerance
    #[arg(long, value_name = "EPSILON")]
    pub float_tolerance: Option<f64>,

    /// Exit with success even if the traces diverge
    #[arg(long)]
    pub allow_divergence: bool,

    /// Increase verbosity (-v: per-step lines, -vv: register dumps)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output (only show errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,
}
