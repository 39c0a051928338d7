//! Realignment of the oracle stream after a trap.
//!
//! Spike reports a trap with the exception pc, then continues with the trap
//! handler's instructions. The resumption point is the first record whose pc is
//! either the exception pc (the instruction is retried) or the next sequential
//! instruction (it is skipped). Anything in between, including further trap
//! lines, is consumed.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::{InstructionRecord, TrapEvent};
use crate::scan::{Line, TraceReader};

impl<R: BufRead> TraceReader<R> {
    /// Scan forward to the record resuming execution after `trap`.
    ///
    /// Returns `None` if the stream ends first. Handlers resuming anywhere other
    /// than `continuation` or `continuation + width` are not recognized and
    /// consume the rest of the stream.
    pub(crate) fn resync(&mut self, trap: &TrapEvent) -> Result<Option<InstructionRecord>> {
        let retry = trap.continuation;
        let skip = trap.continuation.wrapping_add(self.instruction_width());
        debug!(
            line = trap.line,
            cause = %trap.cause,
            "trap at 0x{retry:016x}, resuming at 0x{retry:x} or 0x{skip:x}"
        );

        loop {
            match self.next_line()? {
                None => {
                    warn!(
                        line = trap.line,
                        cause = %trap.cause,
                        skipped = self.stats.resync_skipped,
                        "trap at 0x{retry:016x} never resumed before end of trace"
                    );
                    return Ok(None);
                }
                Some(Line::Record(record)) if record.pc == retry || record.pc == skip => {
                    debug!(line = record.source_line, "resynchronized at 0x{:016x}", record.pc);
                    return Ok(Some(record));
                }
                Some(Line::Record(record)) => {
                    self.stats.resync_skipped += 1;
                    debug!(line = record.source_line, "skipping handler record 0x{:016x}", record.pc);
                }
                Some(Line::Trap(nested)) => {
                    debug!(line = nested.line, cause = %nested.cause, "ignoring trap inside handler");
                }
                Some(Line::Other) => {}
            }
        }
    }
}
