use std::fmt;

use crate::error::Result;
use crate::extract::{DecodedText, decode};

/// A single instruction record taken from a trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    /// 1-based line number in the source stream.
    pub source_line: usize,
    /// Program counter.
    pub pc: u64,
    /// Raw instruction bits.
    pub bits: u32,
    /// Free-form text following the bits (disassembly, operand values).
    pub text: String,
}

impl InstructionRecord {
    /// Decode the trailing text into display text and register annotations.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::MalformedRecord`](crate::TraceError::MalformedRecord) if an
    /// annotation names an unknown register or carries an unparsable value.
    pub fn decode(&self) -> Result<DecodedText<'_>> {
        decode(&self.text, self.source_line)
    }
}

impl fmt::Display for InstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x} (0x{:08x}): {}", self.pc, self.bits, self.text)
    }
}

/// Oracle trap notification.
///
/// Only seen inside the scanner; the oracle resumes at `continuation` or the
/// next sequential instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapEvent {
    /// Line the trap was reported on.
    pub line: usize,
    /// Trap cause as printed by the oracle (`illegal_instruction`, `user_ecall`, ...).
    pub cause: String,
    /// Reported exception pc.
    pub continuation: u64,
}
