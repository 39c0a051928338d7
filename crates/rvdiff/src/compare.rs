//! Lockstep comparison of a SUT trace against a recorded oracle trace.
//!
//! Both streams are advanced one logical instruction at a time. A logical step
//! ends at the next record whose pc differs from the previous one on the same
//! side, so stall cycles (one record per clock with an unchanged pc) collapse
//! into a single step. The run stops at the first pc mismatch or when either
//! stream ends.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use rvdiff_trace::{InstructionRecord, ScanStats, TraceFormat, TraceReader};
use tracing::{debug, info, warn};

use crate::config::CompareConfig;
use crate::error::Result;
use crate::report::{DivergenceReport, RecordPair};
use crate::source::open_trace;

/// Why a comparison finished without divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// The SUT trace has no instruction records.
    EmptySut,
    /// The oracle trace never reaches the SUT's first pc.
    NoOverlap,
    /// The SUT trace ended while synchronized.
    SutExhausted,
    /// The oracle trace ended while synchronized.
    OracleExhausted,
    /// The configured step limit was reached.
    StepLimit,
}

impl fmt::Display for DoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySut => write!(f, "sut: no instructions in trace"),
            Self::NoOverlap => write!(f, "oracle: reached end of trace before the sut start pc"),
            Self::SutExhausted => write!(f, "sut: reached end of trace"),
            Self::OracleExhausted => write!(f, "oracle: reached end of trace"),
            Self::StepLimit => write!(f, "step limit reached"),
        }
    }
}

/// Terminal outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Done(DoneReason),
    Diverged(Box<DivergenceReport>),
}

/// Comparator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Synced,
    Done,
    Diverged,
}

/// Positions and last program counters of both streams.
///
/// While the comparator is synchronized `last_sut_pc == last_oracle_pc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonState {
    pub sut_position: usize,
    pub oracle_position: usize,
    pub last_sut_pc: Option<u64>,
    pub last_oracle_pc: Option<u64>,
}

/// Counters for one comparison run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareStats {
    /// Logical steps compared (1 = initial synchronization point).
    pub steps: u64,
    pub sut: ScanStats,
    pub oracle: ScanStats,
    /// SUT records coalesced because their pc repeated.
    pub sut_stalls: usize,
    /// Oracle records coalesced because their pc repeated.
    pub oracle_repeats: usize,
}

/// Result of comparing two traces.
#[derive(Debug, Clone)]
pub struct CompareResult {
    pub verdict: Verdict,
    pub stats: CompareStats,
}

impl CompareResult {
    #[must_use]
    pub fn divergence(&self) -> Option<&DivergenceReport> {
        match &self.verdict {
            Verdict::Diverged(report) => Some(report.as_ref()),
            Verdict::Done(_) => None,
        }
    }

    #[must_use]
    pub const fn is_divergent(&self) -> bool {
        matches!(self.verdict, Verdict::Diverged(_))
    }
}

/// Outcome of a single [`LockstepComparator::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Both sides agree at `pc` after `step` logical steps.
    Synced { step: u64, pc: u64 },
    Finished(Verdict),
}

/// Current record of each side; both at the same pc while synchronized.
#[derive(Debug, Clone)]
struct Sides {
    sut: InstructionRecord,
    oracle: InstructionRecord,
}

/// Lockstep comparator over a SUT trace and a recorded oracle trace.
pub struct LockstepComparator<S, O> {
    sut: TraceReader<S>,
    oracle: TraceReader<O>,
    config: CompareConfig,
    sides: Option<Sides>,
    finished: Option<Verdict>,
    steps: u64,
    sut_stalls: usize,
    oracle_repeats: usize,
}

impl<S: BufRead, O: BufRead> LockstepComparator<S, O> {
    /// Create a comparator over a SUT stream and an oracle stream.
    pub fn new(sut: S, oracle: O, config: CompareConfig) -> Self {
        Self {
            sut: TraceReader::new(sut, TraceFormat::Sut),
            oracle: TraceReader::new(oracle, TraceFormat::Oracle)
                .with_instruction_width(config.instruction_width),
            config,
            sides: None,
            finished: None,
            steps: 0,
            sut_stalls: 0,
            oracle_repeats: 0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        match (&self.finished, &self.sides) {
            (Some(Verdict::Diverged(_)), _) => Phase::Diverged,
            (Some(Verdict::Done(_)), _) => Phase::Done,
            (None, Some(_)) => Phase::Synced,
            (None, None) => Phase::Init,
        }
    }

    #[must_use]
    pub fn state(&self) -> ComparisonState {
        ComparisonState {
            sut_position: self.sut.position(),
            oracle_position: self.oracle.position(),
            last_sut_pc: self.sides.as_ref().map(|s| s.sut.pc),
            last_oracle_pc: self.sides.as_ref().map(|s| s.oracle.pc),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> CompareStats {
        CompareStats {
            steps: self.steps,
            sut: self.sut.stats(),
            oracle: self.oracle.stats(),
            sut_stalls: self.sut_stalls,
            oracle_repeats: self.oracle_repeats,
        }
    }

    /// Advance by one logical step.
    ///
    /// The first call establishes the initial synchronization point. Once
    /// finished, every further call returns the same verdict.
    ///
    /// # Errors
    ///
    /// Returns errors from reading either trace.
    pub fn step(&mut self) -> Result<Step> {
        if let Some(verdict) = &self.finished {
            return Ok(Step::Finished(verdict.clone()));
        }
        match self.sides.take() {
            None => self.synchronize(),
            Some(sides) => self.advance(sides),
        }
    }

    /// Step until finished.
    ///
    /// # Errors
    ///
    /// Returns errors from reading either trace.
    pub fn run(mut self) -> Result<CompareResult> {
        loop {
            if let Step::Finished(verdict) = self.step()? {
                return Ok(CompareResult {
                    verdict,
                    stats: self.stats(),
                });
            }
        }
    }

    fn synchronize(&mut self) -> Result<Step> {
        let Some(sut) = self.sut.next_record()? else {
            return Ok(self.finish(Verdict::Done(DoneReason::EmptySut)));
        };
        info!("sut: starting trace at line {}", sut.source_line);

        let oracle = loop {
            match self.oracle.next_record()? {
                None => return Ok(self.finish(Verdict::Done(DoneReason::NoOverlap))),
                Some(record) if record.pc == sut.pc => break record,
                Some(_) => {}
            }
        };
        info!("oracle: starting trace at line {}", oracle.source_line);

        let pc = sut.pc;
        self.steps = 1;
        self.sides = Some(Sides { sut, oracle });
        Ok(Step::Synced { step: 1, pc })
    }

    fn advance(&mut self, sides: Sides) -> Result<Step> {
        debug_assert_eq!(sides.sut.pc, sides.oracle.pc);

        if self
            .config
            .max_steps
            .is_some_and(|max_steps| self.steps >= max_steps)
        {
            self.sides = Some(sides);
            return Ok(self.finish(Verdict::Done(DoneReason::StepLimit)));
        }

        let Some(sut) = self.next_distinct_sut(sides.sut.pc)? else {
            self.sides = Some(sides);
            return Ok(self.finish(Verdict::Done(DoneReason::SutExhausted)));
        };
        let Some(oracle) = self.next_distinct_oracle(sides.oracle.pc)? else {
            self.sides = Some(sides);
            return Ok(self.finish(Verdict::Done(DoneReason::OracleExhausted)));
        };

        self.steps += 1;
        let step = self.steps;
        if sut.pc == oracle.pc {
            let pc = oracle.pc;
            debug!(step, "{}", oracle);
            self.sides = Some(Sides { sut, oracle });
            return Ok(Step::Synced { step, pc });
        }

        let report = DivergenceReport {
            step,
            sut: RecordPair {
                previous: sides.sut,
                current: sut.clone(),
            },
            oracle: RecordPair {
                previous: sides.oracle,
                current: oracle.clone(),
            },
        };
        self.sides = Some(Sides { sut, oracle });
        Ok(self.finish(Verdict::Diverged(Box::new(report))))
    }

    /// Next SUT record with a pc different from `last_pc`.
    fn next_distinct_sut(&mut self, last_pc: u64) -> Result<Option<InstructionRecord>> {
        while let Some(record) = self.sut.next_record()? {
            if record.pc != last_pc {
                return Ok(Some(record));
            }
            self.sut_stalls += 1;
            if self.sut_stalls == 1 {
                warn!(
                    "sut: found repeated instruction at line {}, coalescing stalls",
                    record.source_line
                );
            } else {
                debug!("sut: found repeated instruction at line {}", record.source_line);
            }
        }
        Ok(None)
    }

    /// Next oracle record with a pc different from `last_pc`.
    fn next_distinct_oracle(&mut self, last_pc: u64) -> Result<Option<InstructionRecord>> {
        while let Some(record) = self.oracle.next_record()? {
            if record.pc != last_pc {
                return Ok(Some(record));
            }
            self.oracle_repeats += 1;
        }
        Ok(None)
    }

    fn finish(&mut self, verdict: Verdict) -> Step {
        if let Verdict::Done(reason) = &verdict {
            info!("{reason}");
        }
        self.finished = Some(verdict.clone());
        Step::Finished(verdict)
    }
}

/// Compare a SUT trace against a recorded oracle trace.
///
/// # Errors
///
/// Returns errors from reading either trace.
pub fn compare_traces<S: BufRead, O: BufRead>(
    sut: S,
    oracle: O,
    config: CompareConfig,
) -> Result<CompareResult> {
    LockstepComparator::new(sut, oracle, config).run()
}

/// Compare two trace files.
///
/// # Errors
///
/// Returns errors from opening or reading either trace.
pub fn compare_files(sut: &Path, oracle: &Path, config: CompareConfig) -> Result<CompareResult> {
    compare_traces(open_trace(sut)?, open_trace(oracle)?, config)
}

#[cfg(test)]
mod tests;
