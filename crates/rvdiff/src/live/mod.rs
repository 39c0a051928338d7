//! Live comparison against a steppable oracle.
//!
//! For every SUT record the oracle is run until the record's pc, its register
//! file is dumped, and every register annotated on the SUT record is checked
//! against it. Annotations carry source-operand values, which are only valid
//! before the instruction executes, so the comparison happens with the oracle
//! stopped at that pc.

mod channel;
mod dialect;
mod process;

use std::io::BufRead;

use regex::Regex;
use rvdiff_trace::{InstructionRecord, RegisterFile, RegisterMapping, TraceReader};
use tracing::{debug, info, warn};

pub use channel::{ExpectChannel, OracleChannel};
pub use process::{SpikeLaunch, SpikeProcess, find_spike};

use crate::config::{LiveConfig, Verbosity};
use crate::error::{Error, Result};
use crate::report::{RegValue, RegisterMismatch};

/// Counters for one live session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveSummary {
    /// SUT records checked against the oracle.
    pub records: usize,
    /// Individual register values compared.
    pub registers: usize,
}

/// Live session driving an oracle through an [`OracleChannel`].
pub struct OracleSession<C> {
    channel: C,
    config: LiveConfig,
    prompt: Regex,
    summary: LiveSummary,
}

impl<C: OracleChannel> OracleSession<C> {
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if the configured prompt cannot be matched.
    pub fn new(channel: C, config: LiveConfig) -> Result<Self> {
        let prompt = dialect::prompt_pattern(&config.prompt)?;
        Ok(Self {
            channel,
            config,
            prompt,
            summary: LiveSummary::default(),
        })
    }

    #[must_use]
    pub const fn summary(&self) -> LiveSummary {
        self.summary
    }

    #[must_use]
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Check every record of `sut`, then terminate the oracle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegisterMismatch`] at the first disagreeing register,
    /// after terminating the oracle. Trace and protocol errors are returned
    /// as they occur.
    pub fn run<R: BufRead>(&mut self, sut: &mut TraceReader<R>) -> Result<LiveSummary> {
        while let Some(record) = sut.next_record()? {
            self.check_record(&record)?;
        }
        info!("sut: reached end of trace");
        self.quit()?;
        Ok(self.summary)
    }

    /// Advance the oracle to `record.pc` and compare annotated registers.
    ///
    /// # Errors
    ///
    /// See [`OracleSession::run`].
    pub fn check_record(&mut self, record: &InstructionRecord) -> Result<()> {
        let decoded = record.decode()?;
        let core = self.config.core;
        debug!(
            "sut ({}): advanced to pc 0x{:016x} ({})",
            record.source_line, record.pc, decoded.display
        );

        self.command(&dialect::run_until(core, record.pc))?;
        if self.config.verbosity >= Verbosity::Summary {
            self.command(&dialect::pc_query(core))?;
            let pc = self.channel.expect(dialect::pc_reply(), "pc")?;
            debug!("oracle: advanced to pc {}", pc.trim());
        }

        let oracle = self.oracle_registers(&decoded.registers)?;
        if self.config.verbosity >= Verbosity::Full {
            info!(
                "oracle registers:\n{oracle}\n\nsut registers:\n{}",
                decoded.registers
            );
        }

        if let Some(mismatch) = self.find_mismatch(record, &decoded.registers, &oracle) {
            if let Err(err) = self.quit() {
                warn!("failed to terminate oracle: {err}");
            }
            return Err(Error::RegisterMismatch(Box::new(mismatch)));
        }
        self.summary.records += 1;
        Ok(())
    }

    /// Send the terminate command.
    ///
    /// # Errors
    ///
    /// Returns protocol errors if the oracle is no longer prompting.
    pub fn quit(&mut self) -> Result<()> {
        self.command(dialect::QUIT)
    }

    /// Wait for the prompt, then send `command`.
    fn command(&mut self, command: &str) -> Result<()> {
        self.channel.expect(&self.prompt, "prompt")?;
        self.channel.send(command)
    }

    /// Dump the integer file and every floating-point register in `wanted`.
    fn oracle_registers(&mut self, wanted: &RegisterMapping) -> Result<RegisterMapping> {
        let core = self.config.core;
        self.command(&dialect::reg_dump(core))?;
        let dump = self
            .channel
            .expect(dialect::reg_dump_reply(), "register dump")?;
        let mut registers = dialect::parse_reg_dump(&dump)?;

        for (reg, _) in wanted.floats() {
            self.command(&dialect::freg_query(core, reg))?;
            let reply = self
                .channel
                .expect(dialect::freg_reply(), "floating-point register")?;
            registers.set_float(reg, dialect::parse_freg(&reply)?);
        }
        Ok(registers)
    }

    fn find_mismatch(
        &mut self,
        record: &InstructionRecord,
        sut: &RegisterMapping,
        oracle: &RegisterMapping,
    ) -> Option<RegisterMismatch> {
        let mismatch = |file, reg, sut_value, oracle_value| RegisterMismatch {
            record: record.clone(),
            file,
            reg,
            sut: sut_value,
            oracle: oracle_value,
            sut_registers: sut.clone(),
            oracle_registers: oracle.clone(),
        };

        for (reg, value) in sut.ints() {
            self.summary.registers += 1;
            let expected = oracle.int(reg).unwrap_or_default();
            if value != expected {
                return Some(mismatch(
                    RegisterFile::Int,
                    reg,
                    RegValue::Int(value),
                    RegValue::Int(expected),
                ));
            }
        }

        for (reg, value) in sut.floats() {
            self.summary.registers += 1;
            let expected = oracle.float(reg).unwrap_or(f64::NAN);
            if !self.config.float_policy.matches(value, expected) {
                return Some(mismatch(
                    RegisterFile::Float,
                    reg,
                    RegValue::Float(value),
                    RegValue::Float(expected),
                ));
            }
        }
        None
    }
}

/// Spawn Spike and check `sut` against it.
///
/// # Errors
///
/// See [`OracleSession::run`]; also returns [`Error::Spawn`] if Spike cannot
/// be started.
pub fn run_live<R: BufRead>(
    sut: &mut TraceReader<R>,
    launch: &SpikeLaunch,
    config: LiveConfig,
) -> Result<LiveSummary> {
    let process = SpikeProcess::spawn(launch)?;
    info!("oracle: spawned {} (pid {})", launch.spike.display(), process.id());
    OracleSession::new(process, config)?.run(sut)
}
