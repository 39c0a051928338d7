//! rvdiff - differential execution-trace verifier for RISC-V
//!
//! Compares the instruction trace of a system under test (SUT), such as a CPU
//! model or simulator, against the Spike reference simulator. The oracle is
//! either a recorded Spike trace (offline) or a Spike process driven through its
//! interactive debug prompt (live).
//!
//! # Example
//!
//! ```
//! use rvdiff::{CompareConfig, DoneReason, Verdict, compare_traces};
//!
//! let sut = "1: global: 0x80000000 (0x00000013): nop\n";
//! let oracle = "core   0: 0x80000000 (0x00000013) nop\n";
//!
//! let result = compare_traces(sut.as_bytes(), oracle.as_bytes(), CompareConfig::default())?;
//! assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
//! # Ok::<(), rvdiff::Error>(())
//! ```

pub mod compare;
pub mod config;
mod error;
pub mod live;
pub mod report;
pub mod source;

pub use compare::{
    CompareResult, CompareStats, ComparisonState, DoneReason, LockstepComparator, Phase, Step,
    Verdict, compare_files, compare_traces,
};
pub use config::{CompareConfig, FloatPolicy, LiveConfig, Verbosity};
pub use error::{Error, Result};
pub use live::{LiveSummary, OracleChannel, OracleSession, SpikeLaunch, run_live};
pub use report::{DivergenceReport, RecordPair, RegValue, RegisterMismatch};
pub use source::open_trace;
