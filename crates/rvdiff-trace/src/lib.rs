//! Instruction-trace scanning for RISC-V simulators.
//!
//! Reads line-oriented execution traces produced by a simulator under test and by
//! Spike, and turns them into [`InstructionRecord`]s:
//!
//! - [`TraceReader`] classifies lines and skips everything that is not an instruction
//!   record. Oracle traps are resolved by scanning forward to the resumption point.
//! - [`decode`] pulls register annotations out of a record's trailing text.
//!
//! # Example
//!
//! ```
//! use rvdiff_trace::{TraceFormat, TraceReader};
//!
//! let trace = "core 0: 0x80000000 (0x00000013) nop\n";
//! let mut reader = TraceReader::new(trace.as_bytes(), TraceFormat::Oracle);
//! let record = reader.next_record()?.unwrap();
//! assert_eq!(record.pc, 0x8000_0000);
//! # Ok::<(), rvdiff_trace::TraceError>(())
//! ```

mod error;
mod extract;
mod record;
mod regs;
mod resync;
mod scan;

pub use error::{Result, TraceError};
pub use extract::{DecodedText, decode};
pub use record::{InstructionRecord, TrapEvent};
pub use regs::{NUM_REGS, RegisterFile, RegisterMapping, reg_index, reg_name};
pub use scan::{DEFAULT_INSTRUCTION_WIDTH, ScanStats, TraceFormat, TraceReader};
