//! Line scanning for SUT and Spike traces.

use std::io::BufRead;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::Result;
use crate::record::{InstructionRecord, TrapEvent};

/// Width of a non-compressed RISC-V instruction.
pub const DEFAULT_INSTRUCTION_WIDTH: u64 = 4;

/// Producer of a trace, selecting the line shapes to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Simulator under test:
    /// `<SEQ>: global: 0x<PC> (0x<BITS>): <TEXT>`
    Sut,
    /// Spike:
    /// `core <ID>: [<PRIV>] 0x<PC> (0x<BITS>) <TEXT>` and
    /// `core <ID>: exception trap_<CAUSE>, epc 0x<PC>`
    Oracle,
}

/// Counters collected while scanning one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Lines read.
    pub lines: usize,
    /// Instruction records returned to the caller.
    pub records: usize,
    /// Trap records seen.
    pub traps: usize,
    /// Records skipped while waiting for a trap to resume.
    pub resync_skipped: usize,
}

/// One classified line.
pub(crate) enum Line {
    Record(InstructionRecord),
    Trap(TrapEvent),
    Other,
}

/// Forward-only reader returning instruction records from a trace stream.
pub struct TraceReader<R> {
    reader: R,
    format: TraceFormat,
    instruction_width: u64,
    line: usize,
    buf: Vec<u8>,
    pub(crate) stats: ScanStats,
}

impl<R: BufRead> TraceReader<R> {
    /// Create a reader for the given producer format.
    pub fn new(reader: R, format: TraceFormat) -> Self {
        Self {
            reader,
            format,
            instruction_width: DEFAULT_INSTRUCTION_WIDTH,
            line: 0,
            buf: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    /// Set the sequential offset accepted as a trap resumption point.
    #[must_use]
    pub fn with_instruction_width(mut self, width: u64) -> Self {
        self.instruction_width = width;
        self
    }

    /// Number of the last line read (1-based, 0 before the first read).
    pub const fn position(&self) -> usize {
        self.line
    }

    pub const fn stats(&self) -> ScanStats {
        self.stats
    }

    pub(crate) const fn instruction_width(&self) -> u64 {
        self.instruction_width
    }

    /// Return the next instruction record, or `None` at end of stream.
    ///
    /// Unrecognized lines are skipped. On an oracle trap the stream is scanned
    /// forward to the resumption record, which is returned in its place.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`](crate::TraceError::Io) if the underlying reader fails.
    pub fn next_record(&mut self) -> Result<Option<InstructionRecord>> {
        loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(Line::Record(record)) => {
                    self.stats.records += 1;
                    return Ok(Some(record));
                }
                Some(Line::Trap(trap)) => {
                    self.stats.traps += 1;
                    let resumed = self.resync(&trap)?;
                    if resumed.is_some() {
                        self.stats.records += 1;
                    }
                    return Ok(resumed);
                }
                Some(Line::Other) => {}
            }
        }
    }

    /// Read and classify one line; `None` at end of stream.
    pub(crate) fn next_line(&mut self) -> Result<Option<Line>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        self.stats.lines += 1;

        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        Ok(Some(classify(self.format, text, self.line)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<InstructionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn classify(format: TraceFormat, text: &str, line: usize) -> Line {
    match format {
        TraceFormat::Sut => {
            let pattern = SUT_PATTERN.get_or_init(|| {
                Regex::new(
                    r"^\s*\d+:\s*global:\s*0x([0-9a-fA-F]{1,16})\s+\(0x([0-9a-fA-F]{1,8})\):\s*(.*)$",
                )
                .unwrap()
            });
            pattern
                .captures(text)
                .and_then(|caps| record_from(&caps, line))
                .map_or(Line::Other, Line::Record)
        }
        TraceFormat::Oracle => {
            if let Some(record) = match_oracle_record(text, line) {
                return Line::Record(record);
            }
            let pattern = TRAP_PATTERN.get_or_init(|| {
                Regex::new(r"^core\s+\d+:\s*exception trap_(\w+), epc 0x([0-9a-fA-F]{1,16})$")
                    .unwrap()
            });
            let Some(caps) = pattern.captures(text) else {
                return Line::Other;
            };
            match u64::from_str_radix(&caps[2], 16) {
                Ok(continuation) => Line::Trap(TrapEvent {
                    line,
                    cause: caps[1].to_string(),
                    continuation,
                }),
                Err(_) => {
                    debug!(line, "ignoring trap line with unreadable epc");
                    Line::Other
                }
            }
        }
    }
}

/// Match the Spike instruction shape.
fn match_oracle_record(text: &str, line: usize) -> Option<InstructionRecord> {
    let pattern = ORACLE_PATTERN.get_or_init(|| {
        Regex::new(
            r"^core\s+\d+:\s*(?:\d\s+)?0x([0-9a-fA-F]{1,16})\s+\(0x([0-9a-fA-F]{1,8})\)\s*(.*)$",
        )
        .unwrap()
    });
    pattern
        .captures(text)
        .and_then(|caps| record_from(&caps, line))
}

fn record_from(caps: &Captures<'_>, line: usize) -> Option<InstructionRecord> {
    let pc = u64::from_str_radix(caps.get(1)?.as_str(), 16).ok()?;
    let bits = u32::from_str_radix(caps.get(2)?.as_str(), 16).ok()?;
    Some(InstructionRecord {
        source_line: line,
        pc,
        bits,
        text: caps.get(3).map_or("", |m| m.as_str()).to_string(),
    })
}

static SUT_PATTERN: OnceLock<Regex> = OnceLock::new();
static ORACLE_PATTERN: OnceLock<Regex> = OnceLock::new();
static TRAP_PATTERN: OnceLock<Regex> = OnceLock::new();
