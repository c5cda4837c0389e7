//! Stderr logging implementation
//!
//! The worker runs under a process supervisor that collects stderr, so log
//! lines go there with timestamps and levels.

use super::{LogError, LogLevel, formatter::LogFormatter};
use std::io::Write;

/// Logger that writes formatted log messages to stderr
#[derive(Clone)]
pub struct StderrLogger {
    /// Formatter for log messages (includes timestamp and level)
    formatter: LogFormatter,
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StderrLogger {
    pub fn new() -> Self {
        Self {
            formatter: LogFormatter::new(true, true),
        }
    }

    // Write a log message; the stderr lock keeps lines whole across threads.
    pub fn log(&self, level: LogLevel, message: &str) -> Result<(), LogError> {
        let formatted = self.formatter.format(Some(level), message);
        let mut handle = std::io::stderr().lock();
        writeln!(handle, "{}", formatted)?;
        Ok(())
    }
}
