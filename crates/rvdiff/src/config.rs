//! Comparison and live-session configuration.

use rvdiff_trace::DEFAULT_INSTRUCTION_WIDTH;

/// How much diagnostic output a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Final verdict only.
    #[default]
    Quiet,
    /// Per-step progress lines.
    Summary,
    /// Per-step lines plus full register dumps.
    Full,
}

impl Verbosity {
    /// Map a repeated `-v` flag count.
    #[must_use]
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Quiet,
            1 => Self::Summary,
            _ => Self::Full,
        }
    }
}

/// Floating-point register comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FloatPolicy {
    /// Values must compare equal. Two NaNs are equal.
    #[default]
    Exact,
    /// Values may differ by `epsilon`, scaled by magnitude above 1.0.
    Tolerance(f64),
}

impl FloatPolicy {
    #[must_use]
    pub fn matches(self, sut: f64, oracle: f64) -> bool {
        if sut.is_nan() || oracle.is_nan() {
            return sut.is_nan() && oracle.is_nan();
        }
        match self {
            Self::Exact => sut == oracle,
            Self::Tolerance(epsilon) => {
                if sut == oracle {
                    return true;
                }
                if sut.is_infinite() || oracle.is_infinite() {
                    return false;
                }
                let scale = sut.abs().max(oracle.abs()).max(1.0);
                (sut - oracle).abs() <= epsilon * scale
            }
        }
    }
}

/// Configuration for the lockstep comparator.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Offset of the sequential resumption point after an oracle trap.
    pub instruction_width: u64,
    /// Stop after this many logical steps.
    pub max_steps: Option<u64>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            instruction_width: DEFAULT_INSTRUCTION_WIDTH,
            max_steps: None,
        }
    }
}

/// Configuration for a live oracle session.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Hart addressed by oracle commands.
    pub core: u32,
    pub verbosity: Verbosity,
    pub float_policy: FloatPolicy,
    /// Text the oracle prints at the start of a line when ready for a command.
    pub prompt: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            core: 0,
            verbosity: Verbosity::Quiet,
            float_policy: FloatPolicy::Exact,
            prompt: ": ".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_count() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Quiet);
        assert_eq!(Verbosity::from_count(1), Verbosity::Summary);
        assert_eq!(Verbosity::from_count(5), Verbosity::Full);
    }

    #[test]
    fn test_float_exact() {
        assert!(FloatPolicy::Exact.matches(1.5, 1.5));
        assert!(!FloatPolicy::Exact.matches(1.5, 1.500_000_1));
        assert!(FloatPolicy::Exact.matches(f64::NAN, f64::NAN));
        assert!(!FloatPolicy::Exact.matches(f64::NAN, 0.0));
    }

    #[test]
    fn test_float_tolerance() {
        let policy = FloatPolicy::Tolerance(1e-6);
        assert!(policy.matches(1.0, 1.000_000_5));
        assert!(!policy.matches(1.0, 1.01));
        // Relative above 1.0
        assert!(policy.matches(1e9, 1e9 + 100.0));
        assert!(policy.matches(f64::INFINITY, f64::INFINITY));
        assert!(!policy.matches(f64::INFINITY, f64::NEG_INFINITY));
    }
}
