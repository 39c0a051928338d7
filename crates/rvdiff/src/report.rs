//! Divergence and register-mismatch reports.

use std::fmt;

use rvdiff_trace::{InstructionRecord, RegisterFile, RegisterMapping, reg_name};

/// The last two records of one side at the point of divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    /// Record of the last agreeing step.
    pub previous: InstructionRecord,
    /// Record of the diverging step.
    pub current: InstructionRecord,
}

/// First point where the two program-counter sequences disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceReport {
    /// Logical step (1 = initial synchronization point).
    pub step: u64,
    pub sut: RecordPair,
    pub oracle: RecordPair,
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diverging execution at step {}:", self.step)?;
        let (sut, oracle) = (&self.sut.previous, &self.oracle.previous);
        writeln!(f, "  last agreement:")?;
        writeln!(f, "    sut    ({:>8}): {sut}", sut.source_line)?;
        writeln!(f, "    oracle ({:>8}): {oracle}", oracle.source_line)?;
        writeln!(f, "  first disagreement:")?;
        writeln!(
            f,
            "    sut    ({:>8}): {}",
            self.sut.current.source_line, self.sut.current
        )?;
        write!(
            f,
            "    oracle ({:>8}): {}",
            self.oracle.current.source_line, self.oracle.current
        )
    }
}

/// A register value in either file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegValue {
    Int(u64),
    Float(f64),
}

impl fmt::Display for RegValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "0x{value:016x}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Live-mode register value disagreement.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterMismatch {
    /// The SUT record whose annotation disagreed.
    pub record: InstructionRecord,
    pub file: RegisterFile,
    pub reg: u8,
    /// Value annotated in the SUT trace.
    pub sut: RegValue,
    /// Value dumped from the oracle.
    pub oracle: RegValue,
    /// Every register annotated on the SUT record.
    pub sut_registers: RegisterMapping,
    /// Every register dumped from the oracle at this point.
    pub oracle_registers: RegisterMapping,
}

impl RegisterMismatch {
    /// Register name as used in the report.
    #[must_use]
    pub fn reg_label(&self) -> String {
        match self.file {
            RegisterFile::Int => reg_name(self.reg).to_string(),
            RegisterFile::Float => format!("f{}", self.reg),
        }
    }

    /// Full dump of both register files.
    #[must_use]
    pub fn dumps(&self) -> String {
        format!(
            "oracle registers:\n{}\n\nsut registers:\n{}",
            self.oracle_registers, self.sut_registers
        )
    }
}

impl fmt::Display for RegisterMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sut ({}): unexpected value in {} register {}: {} (oracle has {}) at 0x{:016x}",
            self.record.source_line,
            self.file,
            self.reg_label(),
            self.sut,
            self.oracle,
            self.record.pc
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, pc: u64, text: &str) -> InstructionRecord {
        InstructionRecord {
            source_line: line,
            pc,
            bits: 0x13,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_divergence_display() {
        let report = DivergenceReport {
            step: 2,
            sut: RecordPair {
                previous: record(1, 0x8000_0000, "nop"),
                current: record(2, 0x8000_0004, "li a0, 5"),
            },
            oracle: RecordPair {
                previous: record(1, 0x8000_0000, "nop"),
                current: record(2, 0x8000_0008, "nop"),
            },
        };
        let text = report.to_string();

        assert!(text.starts_with("Diverging execution at step 2:"));
        assert!(text.contains("sut    (       2): 0x0000000080000004"));
        assert!(text.contains("oracle (       2): 0x0000000080000008"));
        assert!(text.contains("last agreement"));
    }

    #[test]
    fn test_register_mismatch_display() {
        let mismatch = RegisterMismatch {
            record: record(9, 0x8000_0010, "add a0, a0 (0x0000000000000005)"),
            file: RegisterFile::Int,
            reg: 10,
            sut: RegValue::Int(5),
            oracle: RegValue::Int(6),
            sut_registers: RegisterMapping::new(),
            oracle_registers: RegisterMapping::new(),
        };
        let text = mismatch.to_string();

        assert!(text.contains("integer register a0"));
        assert!(text.contains("0x0000000000000005"));
        assert!(text.contains("oracle has 0x0000000000000006"));
    }

    #[test]
    fn test_register_mismatch_float_label() {
        let mismatch = RegisterMismatch {
            record: record(3, 0x8000_0020, "fadd.d f1 (1.5)"),
            file: RegisterFile::Float,
            reg: 1,
            sut: RegValue::Float(1.5),
            oracle: RegValue::Float(2.0),
            sut_registers: RegisterMapping::new(),
            oracle_registers: RegisterMapping::new(),
        };
        assert_eq!(mismatch.reg_label(), "f1");
        assert!(mismatch.to_string().contains("1.5 (oracle has 2)"));
    }
}
