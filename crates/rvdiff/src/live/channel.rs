//! Expect-style command channel to an interactive oracle.

use std::io::{Read, Write};

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

const READ_CHUNK: usize = 4096;

/// Bidirectional text channel to a steppable oracle.
pub trait OracleChannel {
    /// Send one command line.
    ///
    /// # Errors
    ///
    /// Returns errors from writing to the oracle.
    fn send(&mut self, command: &str) -> Result<()>;

    /// Block until `pattern` appears in the oracle's output.
    ///
    /// Returns the matched text. Output before the match is discarded and
    /// output after it is kept for the next call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolEof`] if the oracle's output ends first.
    fn expect(&mut self, pattern: &Regex, waiting_for: &'static str) -> Result<String>;
}

/// [`OracleChannel`] over a reader and a writer, buffering unread output.
pub struct ExpectChannel<R, W> {
    reader: R,
    writer: W,
    buffer: String,
}

impl<R: Read, W: Write> ExpectChannel<R, W> {
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buffer: String::new(),
        }
    }

    #[must_use]
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Append the next chunk of output; `false` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK];
        let read = loop {
            match self.reader.read(&mut chunk) {
                Ok(read) => break read,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err.into()),
            }
        };
        if read == 0 {
            return Ok(false);
        }
        self.buffer
            .push_str(&String::from_utf8_lossy(&chunk[..read]));
        Ok(true)
    }
}

impl<R: Read, W: Write> OracleChannel for ExpectChannel<R, W> {
    fn send(&mut self, command: &str) -> Result<()> {
        debug!("oracle <- {command}");
        writeln!(self.writer, "{command}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn expect(&mut self, pattern: &Regex, waiting_for: &'static str) -> Result<String> {
        loop {
            if let Some(found) = pattern.find(&self.buffer) {
                let matched = found.as_str().to_string();
                let end = found.end();
                self.buffer.drain(..end);
                return Ok(matched);
            }
            if !self.fill()? {
                debug!(pending = %self.buffer, "oracle output ended");
                return Err(Error::ProtocolEof { waiting_for });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn channel(output: &str) -> ExpectChannel<Cursor<Vec<u8>>, Vec<u8>> {
        ExpectChannel::new(Cursor::new(output.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_expect_keeps_remainder() {
        let number = Regex::new(r"\d+").unwrap();
        let mut channel = channel("abc 12 def 34");

        assert_eq!(channel.expect(&number, "first").unwrap(), "12");
        assert_eq!(channel.expect(&number, "second").unwrap(), "34");
    }

    #[test]
    fn test_expect_eof() {
        let number = Regex::new(r"\d+").unwrap();
        let mut channel = channel("no digits here");

        let err = channel.expect(&number, "number").unwrap_err();
        assert!(matches!(err, Error::ProtocolEof { waiting_for: "number" }));
    }

    #[test]
    fn test_send_appends_newline() {
        let mut channel = channel("");
        channel.send("reg 0").unwrap();
        channel.send("q").unwrap();

        let (_, written) = channel.into_inner();
        assert_eq!(written, b"reg 0\nq\n");
    }

    #[test]
    fn test_expect_across_reads() {
        // A reader that hands out one byte at a time
        struct Trickle(Vec<u8>, usize);
        impl Read for Trickle {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.1 >= self.0.len() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[self.1];
                self.1 += 1;
                Ok(1)
            }
        }

        let pattern = Regex::new(r"0x[0-9a-f]{4}\n").unwrap();
        let mut channel = ExpectChannel::new(Trickle(b": 0x12ab\n".to_vec(), 0), Vec::new());
        assert_eq!(channel.expect(&pattern, "value").unwrap(), "0x12ab\n");
    }
}
