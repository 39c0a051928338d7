//! Register naming and register-value mappings.

use std::collections::BTreeMap;
use std::fmt;

/// Number of registers in each register file.
pub const NUM_REGS: u8 = 32;

/// Get register ABI name.
pub const fn reg_name(reg: u8) -> &'static str {
    match reg {
        0 => "zero",
        1 => "ra",
        2 => "sp",
        3 => "gp",
        4 => "tp",
        5 => "t0",
        6 => "t1",
        7 => "t2",
        8 => "s0",
        9 => "s1",
        10 => "a0",
        11 => "a1",
        12 => "a2",
        13 => "a3",
        14 => "a4",
        15 => "a5",
        16 => "a6",
        17 => "a7",
        18 => "s2",
        19 => "s3",
        20 => "s4",
        21 => "s5",
        22 => "s6",
        23 => "s7",
        24 => "s8",
        25 => "s9",
        26 => "s10",
        27 => "s11",
        28 => "t3",
        29 => "t4",
        30 => "t5",
        31 => "t6",
        _ => "??",
    }
}

/// Resolve an integer register name to its index.
///
/// Accepts numeric names (`x0`..`x31`), ABI names and the `fp` alias for `s0`.
pub fn reg_index(name: &str) -> Option<u8> {
    if let Some(num) = name.strip_prefix('x') {
        return num.parse::<u8>().ok().filter(|&idx| idx < NUM_REGS);
    }
    if name == "fp" {
        return Some(8);
    }
    (0..NUM_REGS).find(|&idx| reg_name(idx) == name)
}

/// Which register file a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFile {
    Int,
    Float,
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "integer"),
            Self::Float => write!(f, "floating-point"),
        }
    }
}

/// Register index to value, for both register files.
///
/// Built fresh for each comparison point; later inserts for the same index win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterMapping {
    int: BTreeMap<u8, u64>,
    float: BTreeMap<u8, f64>,
}

impl RegisterMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_int(&mut self, reg: u8, value: u64) {
        self.int.insert(reg, value);
    }

    pub fn set_float(&mut self, reg: u8, value: f64) {
        self.float.insert(reg, value);
    }

    #[must_use]
    pub fn int(&self, reg: u8) -> Option<u64> {
        self.int.get(&reg).copied()
    }

    #[must_use]
    pub fn float(&self, reg: u8) -> Option<f64> {
        self.float.get(&reg).copied()
    }

    /// Integer registers in index order.
    pub fn ints(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.int.iter().map(|(&reg, &value)| (reg, value))
    }

    /// Floating registers in index order.
    pub fn floats(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.float.iter().map(|(&reg, &value)| (reg, value))
    }

    #[must_use]
    pub fn has_ints(&self) -> bool {
        !self.int.is_empty()
    }

    #[must_use]
    pub fn has_floats(&self) -> bool {
        !self.float.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.int.is_empty() && self.float.is_empty()
    }
}

impl fmt::Display for RegisterMapping {
    /// Four registers per row, ABI names for the integer file.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (reg, value)) in self.ints().enumerate() {
            if i > 0 && i % 4 == 0 {
                writeln!(f)?;
            }
            write!(f, "{:<4}: 0x{value:016x}  ", reg_name(reg))?;
        }
        if self.has_ints() && self.has_floats() {
            writeln!(f)?;
        }
        for (i, (reg, value)) in self.floats().enumerate() {
            if i > 0 && i % 4 == 0 {
                writeln!(f)?;
            }
            write!(f, "{:<4}: {value:<18}  ", format!("f{reg}"))?;
        }
        Ok(())
    }
}
