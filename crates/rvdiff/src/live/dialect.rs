//! Spike interactive debug commands and reply parsing.

use std::sync::OnceLock;

use regex::Regex;
use rvdiff_trace::{NUM_REGS, RegisterMapping, reg_index};

use crate::error::{Error, Result};

pub const QUIT: &str = "q";

pub fn run_until(core: u32, pc: u64) -> String {
    format!("until pc {core} 0x{pc:x}")
}

pub fn pc_query(core: u32) -> String {
    format!("pc {core}")
}

pub fn reg_dump(core: u32) -> String {
    format!("reg {core}")
}

pub fn freg_query(core: u32, reg: u8) -> String {
    format!("freg {core} {reg}")
}

/// Pattern for the oracle's ready prompt.
///
/// Over a pipe nothing echoes the command, so consecutive prompts run together
/// on one line. The prompt must start a line or follow whitespace.
///
/// # Errors
///
/// Returns an error if the escaped prompt does not compile.
pub fn prompt_pattern(prompt: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"(?m)(?:^|\s){}", regex::escape(prompt)))?)
}

pub fn pc_reply() -> &'static Regex {
    PC_REPLY.get_or_init(|| Regex::new(r"0x[0-9a-fA-F]{1,16}\r?\n").unwrap())
}

/// Full integer register dump, 32 `name: 0x<value>` entries.
pub fn reg_dump_reply() -> &'static Regex {
    REG_DUMP_REPLY.get_or_init(|| {
        Regex::new(r"(?:[a-z][a-z0-9]{1,3}\s*:\s*0x[0-9a-fA-F]{1,16}\s+){32}").unwrap()
    })
}

pub fn freg_reply() -> &'static Regex {
    FREG_REPLY.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:0x[0-9a-fA-F]{1,16}|[-+]?(?:inf|nan|\d+(?:\.\d*)?(?:[eE][-+]?\d+)?))\r?\n",
        )
        .unwrap()
    })
}

/// Parse a register dump matched by [`reg_dump_reply`].
///
/// # Errors
///
/// Returns [`Error::Protocol`] on unknown register names or a dump without
/// every register.
pub fn parse_reg_dump(dump: &str) -> Result<RegisterMapping> {
    let entry = REG_ENTRY.get_or_init(|| {
        Regex::new(r"([a-z][a-z0-9]{1,3})\s*:\s*0x([0-9a-fA-F]{1,16})").unwrap()
    });

    let mut registers = RegisterMapping::new();
    for caps in entry.captures_iter(dump) {
        let name = &caps[1];
        let reg = reg_index(name)
            .ok_or_else(|| Error::Protocol(format!("unknown register '{name}' in dump")))?;
        let value = u64::from_str_radix(&caps[2], 16)
            .map_err(|err| Error::Protocol(format!("register {name}: {err}")))?;
        registers.set_int(reg, value);
    }

    let count = registers.ints().count();
    if count != usize::from(NUM_REGS) {
        return Err(Error::Protocol(format!(
            "register dump has {count} of {NUM_REGS} registers"
        )));
    }
    Ok(registers)
}

/// Parse a reply matched by [`freg_reply`].
///
/// Hex replies are raw IEEE-754 double bits.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the value does not parse.
pub fn parse_freg(reply: &str) -> Result<f64> {
    let text = reply.trim();
    let value = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).map(f64::from_bits).ok(),
        None => text.parse::<f64>().ok(),
    };
    value.ok_or_else(|| Error::Protocol(format!("invalid floating-point reply '{text}'")))
}

static PC_REPLY: OnceLock<Regex> = OnceLock::new();
static REG_DUMP_REPLY: OnceLock<Regex> = OnceLock::new();
static REG_ENTRY: OnceLock<Regex> = OnceLock::new();
static FREG_REPLY: OnceLock<Regex> = OnceLock::new();

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use super::*;

    /// Dump in Spike's layout: right-aligned names, four per row.
    fn spike_dump(values: &[u64; 32]) -> String {
        let mut out = String::new();
        for (reg, value) in values.iter().enumerate() {
            let name = rvdiff_trace::reg_name(u8::try_from(reg).unwrap());
            write!(out, "{name:>4}: 0x{value:016x}").unwrap();
            out.push_str(if reg % 4 == 3 { "\n" } else { "  " });
        }
        out
    }

    #[test]
    fn test_commands() {
        assert_eq!(run_until(0, 0x8000_0004), "until pc 0 0x80000004");
        assert_eq!(pc_query(1), "pc 1");
        assert_eq!(reg_dump(0), "reg 0");
        assert_eq!(freg_query(0, 3), "freg 0 3");
    }

    #[test]
    fn test_parse_reg_dump() {
        let mut values = [0u64; 32];
        values[10] = 5;
        values[2] = 0x7fff_fff0;
        let text = spike_dump(&values);

        let dump = reg_dump_reply().find(&text).unwrap().as_str();
        let registers = parse_reg_dump(dump).unwrap();
        assert_eq!(registers.int(10), Some(5));
        assert_eq!(registers.int(2), Some(0x7fff_fff0));
        assert_eq!(registers.int(31), Some(0));
    }

    #[test]
    fn test_partial_dump_not_matched() {
        let text = spike_dump(&[0; 32]);
        let partial = &text[..text.len() - 10];
        assert!(reg_dump_reply().find(partial).is_none());
    }

    #[test]
    fn test_parse_reg_dump_unknown_name() {
        let text = spike_dump(&[0; 32]).replace("  ra", "  qq");
        assert!(matches!(parse_reg_dump(&text), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_prompt_pattern() {
        let prompt = prompt_pattern(": ").unwrap();
        assert!(prompt.is_match("bbl loader\r\n: "));
        assert_eq!(prompt.find(": : ").unwrap().range(), 0..2);
        assert!(!prompt.is_match("  ra: 0x0000000000000000"));
        assert!(!prompt.is_match("warning: tohost and fromhost symbols not in ELF"));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_parse_freg() {
        assert_eq!(parse_freg("1.5\n").unwrap(), 1.5);
        assert_eq!(parse_freg("0x3ff8000000000000\n").unwrap(), 1.5);
        assert!(parse_freg("nan\n").unwrap().is_nan());
        assert!(parse_freg("bogus").is_err());
    }

    #[test]
    fn test_freg_reply_requires_newline() {
        assert!(freg_reply().find("1.2").is_none());
        assert_eq!(freg_reply().find("1.25\n").unwrap().as_str(), "1.25\n");
    }
}
