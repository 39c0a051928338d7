use thiserror::Error;

use crate::report::RegisterMismatch;

/// Verifier errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("trace error: {0}")]
    Trace(#[from] rvdiff_trace::TraceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn oracle '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("oracle exited unexpectedly while waiting for {waiting_for}")]
    ProtocolEof { waiting_for: &'static str },
    #[error("invalid oracle prompt pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("unexpected oracle reply: {0}")]
    Protocol(String),
    #[error("{0}")]
    RegisterMismatch(Box<RegisterMismatch>),
}

pub type Result<T> = std::result::Result<T, Error>;
