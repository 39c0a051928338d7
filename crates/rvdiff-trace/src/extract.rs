//! Register annotation extraction from record text.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, TraceError};
use crate::regs::{NUM_REGS, RegisterMapping, reg_index};

/// Decoded trailing text of an instruction record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText<'a> {
    /// Text for diagnostics, trimmed.
    pub display: &'a str,
    /// Register values annotated in the text.
    pub registers: RegisterMapping,
}

/// Decode a record's trailing text.
///
/// Collects every register annotation found anywhere in the text:
/// - `x<N> (0x<VALUE>)` or `<abi> (0x<VALUE>)` for integer registers
/// - `f<N> (<DECIMAL>)` for floating registers; a `0x` value is taken as raw bits
///
/// Text without annotations decodes to an empty mapping. `line` is only used for
/// error reporting.
///
/// # Errors
///
/// Returns [`TraceError::MalformedRecord`] when an annotation has the right shape but
/// names a register outside the file or carries a value that does not parse.
pub fn decode(text: &str, line: usize) -> Result<DecodedText<'_>> {
    let mut registers = RegisterMapping::new();

    let int_pattern = INT_PATTERN.get_or_init(|| {
        Regex::new(r"\b(x\d+|zero|ra|sp|gp|tp|fp|t\d+|s\d+|a\d+)\s*\(0x([0-9a-fA-F]+)\)").unwrap()
    });
    for caps in int_pattern.captures_iter(text) {
        let name = &caps[1];
        let reg = reg_index(name)
            .ok_or_else(|| TraceError::malformed(line, format!("unknown register '{name}'")))?;
        let value = u64::from_str_radix(&caps[2], 16).map_err(|e| {
            TraceError::malformed(line, format!("bad value for {name}: 0x{}: {e}", &caps[2]))
        })?;
        registers.set_int(reg, value);
    }

    let float_pattern =
        FLOAT_PATTERN.get_or_init(|| Regex::new(r"\bf(\d+)\s*\(([^()]*)\)").unwrap());
    for caps in float_pattern.captures_iter(text) {
        let reg = caps[1]
            .parse::<u8>()
            .ok()
            .filter(|&reg| reg < NUM_REGS)
            .ok_or_else(|| {
                TraceError::malformed(line, format!("unknown register 'f{}'", &caps[1]))
            })?;
        let value = parse_float(caps[2].trim()).ok_or_else(|| {
            TraceError::malformed(line, format!("bad value for f{reg}: '{}'", &caps[2]))
        })?;
        registers.set_float(reg, value);
    }

    Ok(DecodedText {
        display: text.trim(),
        registers,
    })
}

fn parse_float(text: &str) -> Option<f64> {
    if let Some(hex) = text.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16).ok().map(f64::from_bits);
    }
    text.parse::<f64>().ok()
}

static INT_PATTERN: OnceLock<Regex> = OnceLock::new();
static FLOAT_PATTERN: OnceLock<Regex> = OnceLock::new();
