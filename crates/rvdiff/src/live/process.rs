//! Spike running in interactive debug mode.

use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use os_pipe::PipeReader;
use regex::Regex;
use tracing::debug;

use super::channel::{ExpectChannel, OracleChannel};
use crate::error::{Error, Result};

/// How to launch Spike for a live session.
#[derive(Debug, Clone)]
pub struct SpikeLaunch {
    pub spike: PathBuf,
    /// `--isa` string; Spike's default when absent.
    pub isa: Option<String>,
    /// Proxy kernel; the program runs bare-metal when absent.
    pub pk: Option<PathBuf>,
    pub program: PathBuf,
}

impl SpikeLaunch {
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(isa) = &self.isa {
            args.push(format!("--isa={isa}"));
        }
        args.push("-d".to_string());
        if let Some(pk) = &self.pk {
            args.push(pk.display().to_string());
        }
        args.push(self.program.display().to_string());
        args
    }
}

/// A running Spike process with its stdout and stderr merged into one channel.
///
/// The process is killed when dropped.
pub struct SpikeProcess {
    child: Child,
    channel: ExpectChannel<PipeReader, ChildStdin>,
}

impl SpikeProcess {
    /// Spawn Spike in debug mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the process cannot be started.
    pub fn spawn(launch: &SpikeLaunch) -> Result<Self> {
        let spawn_error = |source| Error::Spawn {
            program: launch.spike.display().to_string(),
            source,
        };

        let (reader, writer) = os_pipe::pipe().map_err(spawn_error)?;
        let writer_err = writer.try_clone().map_err(spawn_error)?;

        let args = launch.args();
        debug!("spawning {} {}", launch.spike.display(), args.join(" "));

        // The command owns the write ends; it must be dropped before reading
        // so that EOF is seen once Spike exits.
        let mut child = {
            let mut cmd = Command::new(&launch.spike);
            cmd.args(&args)
                .stdin(Stdio::piped())
                .stdout(writer)
                .stderr(writer_err);
            cmd.spawn().map_err(spawn_error)?
        };

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(std::io::Error::other("no stdin")));
        };

        Ok(Self {
            child,
            channel: ExpectChannel::new(reader, stdin),
        })
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl OracleChannel for SpikeProcess {
    fn send(&mut self, command: &str) -> Result<()> {
        self.channel.send(command)
    }

    fn expect(&mut self, pattern: &Regex, waiting_for: &'static str) -> Result<String> {
        self.channel.expect(pattern, waiting_for)
    }
}

impl Drop for SpikeProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Find Spike executable in PATH.
#[must_use]
pub fn find_spike() -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join("spike");
            full_path.is_file().then_some(full_path)
        })
    })
}
