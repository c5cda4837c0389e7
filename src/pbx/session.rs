//! Child session spawning and the expect primitive
//!
//! The connection command (ssh, telnet, openssl s_client) runs on an 80x24
//! PTY so the SAT renders its vt220 screens at the size the emulator
//! expects. A reader thread pumps the merged output into a channel; `expect`
//! drains the channel into a persistent buffer and scans it for the caller's
//! patterns.

use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};
use regex::Regex;
use std::{
    io::{Read, Write},
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use super::errors::PbxError;
use crate::{log_debug, log_error, log_wire};

const PTY_ROWS: u16 = 24;
const PTY_COLS: u16 = 80;
const READ_CHUNK: usize = 8192;

/// Outcome of a single `expect` call.
///
/// `Timeout` and `Eof` carry the unconsumed buffer so callers can log or
/// extract the last output line; `Match` consumes the buffer through the end
/// of the match and leaves the remainder for the next call.
#[derive(Debug)]
pub(crate) enum Expected {
    Timeout { before: String },
    Eof { before: String },
    Match { index: usize, before: String, matched: String },
}

pub(crate) struct ChildSession {
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
    chunks: Receiver<Vec<u8>>,
    buffer: String,
    saw_eof: bool,
    default_timeout: Duration,
    // Dropping the master tears the PTY down under the child.
    _master: Option<Box<dyn MasterPty + Send>>,
}

impl ChildSession {
    /// Spawn `command` on a fresh PTY.
    ///
    /// `default_timeout` is used by every expect that has no explicit
    /// timeout of its own (mode prompts, logoff, housekeeping).
    pub(crate) fn spawn(command: &str, default_timeout: Duration) -> Result<Self, PbxError> {
        let argv = shell_words::split(command).map_err(|err| PbxError::Spawn(format!("{}: {}", command, err)))?;
        let Some((program, args)) = argv.split_first() else {
            return Err(PbxError::Spawn("connection command is empty".to_string()));
        };
        let program = resolve_program(program)?;
        log_debug!("Spawning {:?} {:?}", program, args);

        let pty_pair = native_pty_system()
            .openpty(PtySize {
                rows: PTY_ROWS,
                cols: PTY_COLS,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|err| PbxError::Spawn(err.to_string()))?;

        let mut cmd = CommandBuilder::new(program);
        cmd.args(args);
        let child = pty_pair.slave.spawn_command(cmd).map_err(|err| PbxError::Spawn(err.to_string()))?;
        // The slave side lives on inside the child.
        drop(pty_pair.slave);

        let mut reader = pty_pair
            .master
            .try_clone_reader()
            .map_err(|err| PbxError::Spawn(err.to_string()))?;
        let writer = pty_pair.master.take_writer().map_err(|err| PbxError::Spawn(err.to_string()))?;

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut buf = [0u8; READ_CHUNK];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break, // EOF, the child hung up
                    Ok(bytes_read) => {
                        log_wire!("{}", String::from_utf8_lossy(&buf[..bytes_read]));
                        if tx.send(buf[..bytes_read].to_vec()).is_err() {
                            break; // session was closed
                        }
                    }
                    Err(err) => {
                        log_error!("Error reading from PTY: {}", err);
                        break;
                    }
                }
            }
            log_debug!("PTY reader thread exiting");
        });

        Ok(Self {
            child,
            writer,
            chunks: rx,
            buffer: String::new(),
            saw_eof: false,
            default_timeout,
            _master: Some(pty_pair.master),
        })
    }

    pub(crate) fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Write `text` followed by a newline.
    pub(crate) fn send_line(&mut self, text: &str) -> Result<(), PbxError> {
        self.send_bytes(text.as_bytes())?;
        self.send_bytes(b"\n")
    }

    /// Write raw bytes (function keys).
    pub(crate) fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), PbxError> {
        self.writer.write_all(bytes).map_err(PbxError::Write)?;
        self.writer.flush().map_err(PbxError::Write)
    }

    /// Scan the output stream for the earliest match among `patterns`.
    ///
    /// Ties between patterns matching at the same offset go to the lowest
    /// index. Non-UTF-8 bytes are replaced during decode; the SAT only emits
    /// ASCII and escape sequences.
    pub(crate) fn expect(&mut self, patterns: &[&Regex], timeout: Duration) -> Expected {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some((index, start, end)) = self.earliest_match(patterns) {
                let matched = self.buffer[start..end].to_string();
                let before = self.buffer[..start].to_string();
                self.buffer.drain(..end);
                return Expected::Match { index, before, matched };
            }
            if self.saw_eof {
                return Expected::Eof {
                    before: self.buffer.clone(),
                };
            }
            let now = Instant::now();
            if now >= deadline {
                return Expected::Timeout {
                    before: self.buffer.clone(),
                };
            }
            match self.chunks.recv_timeout(deadline - now) {
                Ok(chunk) => self.buffer.push_str(&String::from_utf8_lossy(&chunk)),
                Err(RecvTimeoutError::Timeout) => {
                    return Expected::Timeout {
                        before: self.buffer.clone(),
                    };
                }
                // Reader thread is gone; scan whatever is buffered once more.
                Err(RecvTimeoutError::Disconnected) => self.saw_eof = true,
            }
        }
    }

    fn earliest_match(&self, patterns: &[&Regex]) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some(found) = pattern.find(&self.buffer) {
                let replace = match best {
                    Some((_, best_start, _)) => found.start() < best_start,
                    None => true,
                };
                if replace {
                    best = Some((index, found.start(), found.end()));
                }
            }
        }
        best
    }

    /// True while the child process has not exited.
    pub(crate) fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Terminate the child and reap it.
    pub(crate) fn close(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for ChildSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolve the program half of the connection command. Paths are taken as
/// given; bare names must exist on PATH so spawn failures surface before the
/// child does.
fn resolve_program(program: &str) -> Result<PathBuf, PbxError> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(program));
    }
    which::which(program).map_err(|err| PbxError::Spawn(format!("{} not found in PATH: {}", program, err)))
}


#[cfg(test)]
#[path = "../test/pbx/session.rs"]
mod tests;
